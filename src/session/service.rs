use axum_extra::extract::cookie::Cookie;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    cookies::SessionCookies,
    policy::InvalidationPolicy,
    resolver::SessionResolver,
    token::TokenIssuer,
    types::{Resolution, SessionContext, TokenKind},
};
use crate::config::AppConfig;
use crate::shared::AppError;
use crate::user::repository::UserRepository;

/// Issues sessions, resolves them per request and invalidates them on logout
pub struct SessionService {
    tokens: TokenIssuer,
    cookies: SessionCookies,
    policy: InvalidationPolicy,
    repository: Arc<dyn UserRepository + Send + Sync>,
    resolver: SessionResolver,
}

impl SessionService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>, config: &AppConfig) -> Self {
        Self::with_parts(
            repository,
            TokenIssuer::from_config(config),
            SessionCookies::new(config.environment),
            config.invalidation_policy,
        )
    }

    pub fn with_parts(
        repository: Arc<dyn UserRepository + Send + Sync>,
        tokens: TokenIssuer,
        cookies: SessionCookies,
        policy: InvalidationPolicy,
    ) -> Self {
        let resolver = SessionResolver::new(
            tokens.clone(),
            cookies.clone(),
            policy,
            repository.clone(),
        );

        Self {
            tokens,
            cookies,
            policy,
            repository,
            resolver,
        }
    }

    pub fn policy(&self) -> InvalidationPolicy {
        self.policy
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Mints the access/refresh cookie pair for a user whose live marker is
    /// already known.
    #[instrument(skip(self))]
    pub fn issue_tokens(
        &self,
        user_id: Uuid,
        live_marker: i64,
        remember: bool,
    ) -> Result<Vec<Cookie<'static>>, AppError> {
        let snapshot = self
            .policy
            .snapshot(live_marker, Utc::now().timestamp_millis());

        let access = self
            .tokens
            .create_token(TokenKind::Access, user_id, snapshot, remember)?;
        let refresh = self
            .tokens
            .create_token(TokenKind::Refresh, user_id, snapshot, remember)?;

        Ok(vec![
            self.cookies
                .access(access, remember.then_some(self.tokens.access_ttl)),
            self.cookies.refresh(
                refresh,
                remember.then_some(self.tokens.remember_refresh_ttl),
            ),
        ])
    }

    /// Reads the user's live marker and issues a fresh session
    #[instrument(skip(self))]
    pub async fn issue_session(
        &self,
        user_id: Uuid,
        remember: bool,
    ) -> Result<Vec<Cookie<'static>>, AppError> {
        let live_marker = self
            .repository
            .read_marker(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let cookies = self.issue_tokens(user_id, live_marker, remember)?;
        info!(user_id = %user_id, remember, "Session issued");
        Ok(cookies)
    }

    pub async fn resolve(
        &self,
        access: Option<&str>,
        refresh: Option<&str>,
    ) -> Result<Resolution, AppError> {
        self.resolver.resolve(access, refresh).await
    }

    /// Advances the user's marker so every earlier token goes stale, and
    /// returns the cookie removals.
    #[instrument(skip(self))]
    pub async fn logout(&self, session: &SessionContext) -> Result<Vec<Cookie<'static>>, AppError> {
        let user_id = session.require_user()?;

        let marker = self
            .repository
            .advance_marker(user_id, self.policy.marker_kind())
            .await?;

        match marker {
            Some(marker) => info!(user_id = %user_id, marker, "User logged out"),
            None => warn!(user_id = %user_id, "Logout for a user that no longer exists"),
        }

        Ok(self.cookies.clear_all())
    }

    pub fn clear_cookies(&self) -> Vec<Cookie<'static>> {
        self.cookies.clear_all()
    }
}
