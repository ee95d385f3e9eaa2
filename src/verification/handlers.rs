use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::shared::{AppError, AppState};

#[derive(Debug, Serialize)]
pub struct VerifyEmailResponse {
    pub verified: bool,
}

/// HTTP handler for email verification links
///
/// GET /verify/:token
#[instrument(name = "verify_email", skip(state, token))]
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<VerifyEmailResponse>, AppError> {
    let user_id = state.user_service.verify_email(&token).await?;
    info!(user_id = %user_id, "Email verified");

    Ok(Json(VerifyEmailResponse { verified: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{AppStateBuilder, RecordingMailer};
    use crate::session::SessionContext;
    use crate::user::types::CreateUserInput;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    #[tokio::test]
    async fn test_verify_email_handler() {
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppStateBuilder::new().with_mailer(mailer.clone()).build();

        let user = state
            .user_service
            .register(
                &SessionContext::anonymous(),
                CreateUserInput {
                    name: None,
                    email: "dee@example.com".to_string(),
                    password: "password123".to_string(),
                    username: "dee".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(!user.email_verified);

        let html = mailer.sent.lock().await[0].html.clone();
        let token = html
            .split("code=")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap()
            .to_string();

        let app = Router::new()
            .route("/verify/:token", get(verify_email))
            .with_state(state.clone());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/verify/{}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let stored = state.user_repository.get_user(user.id).await.unwrap().unwrap();
        assert!(stored.email_verified);

        // Links are single use
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/verify/{}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_verify_email_rejects_garbage() {
        let app = Router::new()
            .route("/verify/:token", get(verify_email))
            .with_state(AppStateBuilder::new().build());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/verify/not-a-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
