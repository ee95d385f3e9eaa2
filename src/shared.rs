use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::graphql::{build_schema, AppSchema, Services};
use crate::recipe::{repository::RecipeRepository, service::RecipeService};
use crate::session::SessionService;
use crate::user::{repository::UserRepository, service::UserService};
use crate::verification::{mailer::Mailer, repository::VerificationRepository};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub recipe_repository: Arc<dyn RecipeRepository + Send + Sync>,
    pub session_service: Arc<SessionService>,
    pub user_service: Arc<UserService>,
    pub recipe_service: Arc<RecipeService>,
    pub schema: AppSchema,
}

impl AppState {
    /// Wires services and the GraphQL schema around the given stores.
    /// Everything is built once at startup and shared by every request.
    pub fn new(
        config: AppConfig,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        recipe_repository: Arc<dyn RecipeRepository + Send + Sync>,
        verification_repository: Arc<dyn VerificationRepository + Send + Sync>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let session_service = Arc::new(SessionService::new(user_repository.clone(), &config));
        Self::with_session_service(
            config,
            user_repository,
            recipe_repository,
            verification_repository,
            mailer,
            session_service,
        )
    }

    pub fn with_session_service(
        config: AppConfig,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        recipe_repository: Arc<dyn RecipeRepository + Send + Sync>,
        verification_repository: Arc<dyn VerificationRepository + Send + Sync>,
        mailer: Arc<dyn Mailer>,
        session_service: Arc<SessionService>,
    ) -> Self {
        let user_service = Arc::new(UserService::new(
            user_repository.clone(),
            recipe_repository.clone(),
            verification_repository,
            mailer,
            &config,
        ));
        let recipe_service = Arc::new(RecipeService::new(
            recipe_repository.clone(),
            user_repository.clone(),
        ));

        let schema = build_schema(
            Services {
                users: user_service.clone(),
                recipes: recipe_service.clone(),
                sessions: session_service.clone(),
            },
            &config,
        );

        Self {
            config: Arc::new(config),
            user_repository,
            recipe_repository,
            session_service,
            user_service,
            recipe_service,
            schema,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Token error: {0}")]
    Token(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Token(_)
            | AppError::DatabaseError(_)
            | AppError::Config(_)
            | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Errors the caller can act on. Everything else is an infrastructure
    /// failure and is reported without detail.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::Unauthorized(_)
                | AppError::Forbidden(_)
                | AppError::Validation(_)
                | AppError::NotFound(_)
        )
    }

    /// The shared "action requires login" denial.
    pub fn not_logged_in() -> Self {
        AppError::Unauthorized("Not logged in.".to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        AppError::DatabaseError(error.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = if self.is_user_facing() {
            self.to_string()
        } else {
            tracing::error!(error = %self, "Request failed");
            "Internal server error".to_string()
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
