use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use super::cookies::{apply_cookies, read_session_cookies};
use crate::shared::{AppError, AppState};

/// Session middleware - resolves the access/refresh cookies into a SessionContext.
/// Usage: .layer(middleware::from_fn_with_state(app_state.clone(), session::session_context))
/// Handlers can then extract Extension(session): Extension<SessionContext>.
/// Anonymous requests pass through; only store failures abort the request.
#[instrument(skip(state, req, next))]
pub async fn session_context(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (access, refresh) = read_session_cookies(req.headers());

    let resolution = state
        .session_service
        .resolve(access.as_deref(), refresh.as_deref())
        .await
        .map_err(|e| {
            warn!("Session resolution failed: {}", e);
            e
        })?;

    debug!(
        uri = %req.uri(),
        user_id = ?resolution.context.session_user_id,
        resolved_by = ?resolution.resolved_by,
        "Session resolved"
    );

    req.extensions_mut().insert(resolution.context);

    let mut response = next.run(req).await;

    // Cookies set by the handler (login, logout) take precedence
    apply_cookies(response.headers_mut(), &resolution.cookies);

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::types::{SessionContext, ACCESS_COOKIE_NAME};
    use crate::shared::test_utils::AppStateBuilder;
    use crate::user::models::UserModel;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        middleware,
        routing::get,
        Extension, Router,
    };
    use tower::ServiceExt; // for `oneshot`

    async fn whoami(Extension(session): Extension<SessionContext>) -> String {
        session
            .session_user_id
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(state.clone(), session_context))
            .with_state(state)
    }

    async fn body_string(response: Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_request() {
        let state = AppStateBuilder::new().build();

        let request = Request::builder()
            .uri("/whoami")
            .body(Body::empty())
            .unwrap();
        let response = app(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn test_access_cookie_resolves_user() {
        let state = AppStateBuilder::new().build();
        let user = UserModel::new(
            "hiluw".to_string(),
            "lu@developer.lu".to_string(),
            None,
            "hash".to_string(),
        );
        state.user_repository.create_user(&user).await.unwrap();
        let cookies = state.session_service.issue_session(user.id, false).await.unwrap();
        let access = cookies
            .iter()
            .find(|c| c.name() == ACCESS_COOKIE_NAME)
            .unwrap()
            .value()
            .to_string();

        let request = Request::builder()
            .uri("/whoami")
            .header(header::COOKIE, format!("{}={}", ACCESS_COOKIE_NAME, access))
            .body(Body::empty())
            .unwrap();
        let response = app(state).oneshot(request).await.unwrap();

        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(body_string(response).await, user.id.to_string());
    }

    #[tokio::test]
    async fn test_bogus_cookie_is_cleared() {
        let state = AppStateBuilder::new().build();

        let request = Request::builder()
            .uri("/whoami")
            .header(header::COOKIE, "accessToken=nope")
            .body(Body::empty())
            .unwrap();
        let response = app(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get_all(header::SET_COOKIE).iter().count(), 2);
    }
}
