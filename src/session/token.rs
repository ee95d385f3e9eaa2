use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::types::{SessionClaims, TokenKind};
use crate::config::AppConfig;
use crate::shared::AppError;

/// Why a token failed signature/expiry checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    Expired,
    Invalid,
}

/// Signs and decodes access and refresh tokens
#[derive(Clone)]
pub struct TokenIssuer {
    access_secret: String,
    refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub remember_refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl: Duration::hours(1),
            refresh_ttl: Duration::days(1),
            remember_refresh_ttl: Duration::days(30),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.access_token_secret.clone(),
            config.refresh_token_secret.clone(),
        )
    }

    /// Overrides token lifetimes; negative values mint already-expired tokens
    pub fn with_ttls(mut self, access: Duration, refresh: Duration, remember_refresh: Duration) -> Self {
        self.access_ttl = access;
        self.refresh_ttl = refresh;
        self.remember_refresh_ttl = remember_refresh;
        self
    }

    pub fn ttl(&self, kind: TokenKind, remember: bool) -> Duration {
        match (kind, remember) {
            (TokenKind::Access, _) => self.access_ttl,
            (TokenKind::Refresh, false) => self.refresh_ttl,
            (TokenKind::Refresh, true) => self.remember_refresh_ttl,
        }
    }

    fn secret(&self, kind: TokenKind) -> &[u8] {
        match kind {
            TokenKind::Access => self.access_secret.as_bytes(),
            TokenKind::Refresh => self.refresh_secret.as_bytes(),
        }
    }

    /// Creates a signed token for the user carrying the marker snapshot
    #[instrument(skip(self))]
    pub fn create_token(
        &self,
        kind: TokenKind,
        user_id: Uuid,
        marker: i64,
        remember: bool,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = (now + self.ttl(kind, remember)).timestamp().max(0) as usize;

        debug!(exp_timestamp = exp, "Creating JWT token with expiration");

        let claims = SessionClaims {
            id: user_id,
            marker,
            remember,
            exp,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret(kind)),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::Token(e.to_string())
        })
    }

    /// Checks signature and expiry and returns the claims
    #[instrument(skip(self, token))]
    pub fn decode_token(&self, kind: TokenKind, token: &str) -> Result<SessionClaims, TokenRejection> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret(kind)),
            &validation,
        )
        .map(|data| {
            debug!(user_id = %data.claims.id, exp = data.claims.exp, "JWT token decoded successfully");
            data.claims
        })
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => {
                debug!("JWT token has expired");
                TokenRejection::Expired
            }
            _ => {
                debug!(error = %e, "Failed to decode JWT token");
                TokenRejection::Invalid
            }
        })
    }
}
