use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::shared::AppError;

/// One-time email verification tokens
#[async_trait]
pub trait VerificationRepository {
    async fn store_token(&self, token: Uuid, user_id: Uuid) -> Result<(), AppError>;

    /// Removes the token and returns the user it belonged to
    async fn consume_token(&self, token: Uuid) -> Result<Option<Uuid>, AppError>;
}

#[derive(Default)]
pub struct InMemoryVerificationRepository {
    tokens: Mutex<HashMap<Uuid, Uuid>>,
}

impl InMemoryVerificationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VerificationRepository for InMemoryVerificationRepository {
    async fn store_token(&self, token: Uuid, user_id: Uuid) -> Result<(), AppError> {
        self.tokens.lock().await.insert(token, user_id);
        Ok(())
    }

    async fn consume_token(&self, token: Uuid) -> Result<Option<Uuid>, AppError> {
        Ok(self.tokens.lock().await.remove(&token))
    }
}

pub struct PostgresVerificationRepository {
    pool: PgPool,
}

impl PostgresVerificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerificationRepository for PostgresVerificationRepository {
    #[instrument(skip(self, token))]
    async fn store_token(&self, token: Uuid, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("INSERT INTO email_verifications (token, user_id) VALUES ($1, $2)")
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        debug!(user_id = %user_id, "Stored email verification token");
        Ok(())
    }

    async fn consume_token(&self, token: Uuid) -> Result<Option<Uuid>, AppError> {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM email_verifications WHERE token = $1 RETURNING user_id",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user_id)
    }
}
