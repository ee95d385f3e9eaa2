use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    cookies::SessionCookies,
    policy::InvalidationPolicy,
    token::{TokenIssuer, TokenRejection},
    types::{Resolution, ResolvedBy, TokenKind, Verification},
};
use crate::shared::AppError;
use crate::user::repository::UserRepository;

/// Per-request session state machine: access token, then refresh token,
/// each checked against the user's live invalidation marker.
pub struct SessionResolver {
    tokens: TokenIssuer,
    cookies: SessionCookies,
    policy: InvalidationPolicy,
    users: Arc<dyn UserRepository + Send + Sync>,
}

impl SessionResolver {
    pub fn new(
        tokens: TokenIssuer,
        cookies: SessionCookies,
        policy: InvalidationPolicy,
        users: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            tokens,
            cookies,
            policy,
            users,
        }
    }

    /// Checks one credential. Only store failures are errors.
    #[instrument(skip(self, token))]
    pub async fn verify(
        &self,
        kind: TokenKind,
        token: Option<&str>,
    ) -> Result<Verification, AppError> {
        let Some(token) = token else {
            return Ok(Verification::Invalid);
        };

        let claims = match self.tokens.decode_token(kind, token) {
            Ok(claims) => claims,
            Err(TokenRejection::Expired) => return Ok(Verification::Expired),
            Err(TokenRejection::Invalid) => return Ok(Verification::Invalid),
        };

        match self.users.read_marker(claims.id).await? {
            Some(live) if self.policy.accepts(claims.marker, live) => {
                Ok(Verification::Valid(claims))
            }
            Some(live) => {
                debug!(
                    user_id = %claims.id,
                    snapshot = claims.marker,
                    live,
                    "Token marker is stale"
                );
                Ok(Verification::Stale)
            }
            None => {
                debug!(user_id = %claims.id, "Token refers to a deleted user");
                Ok(Verification::Stale)
            }
        }
    }

    #[instrument(skip(self, access, refresh))]
    pub async fn resolve(
        &self,
        access: Option<&str>,
        refresh: Option<&str>,
    ) -> Result<Resolution, AppError> {
        match self.verify(TokenKind::Access, access).await? {
            Verification::Valid(claims) => {
                return Ok(Resolution::authenticated(
                    claims.id,
                    ResolvedBy::AccessToken,
                    Vec::new(),
                ));
            }
            outcome => debug!(?outcome, "Access token rejected, trying refresh token"),
        }

        match self.verify(TokenKind::Refresh, refresh).await? {
            Verification::Valid(claims) => {
                let token = self.tokens.create_token(
                    TokenKind::Access,
                    claims.id,
                    claims.marker,
                    claims.remember,
                )?;
                let max_age = claims.remember.then_some(self.tokens.access_ttl);
                info!(user_id = %claims.id, "Reissued access token from refresh token");

                Ok(Resolution::authenticated(
                    claims.id,
                    ResolvedBy::RefreshToken,
                    vec![self.cookies.access(token, max_age)],
                ))
            }
            outcome => {
                debug!(?outcome, "Refresh token rejected, request is anonymous");
                // Nothing to clear on a cookie-less request
                let cookies = if access.is_some() || refresh.is_some() {
                    self.cookies.clear_all()
                } else {
                    Vec::new()
                };
                Ok(Resolution::anonymous(cookies))
            }
        }
    }
}
