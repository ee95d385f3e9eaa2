use axum_extra::extract::cookie::Cookie;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::AppError;

pub const ACCESS_COOKIE_NAME: &str = "accessToken";
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Which of the two credentials a token is; each kind has its own secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims shared by access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub id: Uuid,
    pub marker: i64, // Invalidation marker snapshot at issue time
    #[serde(default)]
    pub remember: bool,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// Per-request identity handed to every resolver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub session_user_id: Option<Uuid>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user_id: Uuid) -> Self {
        Self {
            session_user_id: Some(user_id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session_user_id.is_some()
    }

    pub fn require_user(&self) -> Result<Uuid, AppError> {
        self.session_user_id.ok_or_else(AppError::not_logged_in)
    }
}

/// Outcome of checking one credential
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    Valid(SessionClaims),
    Expired,
    Invalid,
    /// Signature fine, but the user logged out since issue (or no longer exists)
    Stale,
}

/// Which credential produced the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedBy {
    AccessToken,
    RefreshToken,
    Nothing,
}

/// Result of running the per-request session state machine
#[derive(Debug, Clone)]
pub struct Resolution {
    pub context: SessionContext,
    pub resolved_by: ResolvedBy,
    /// Cookies to attach to the response (reissued access token or removals)
    pub cookies: Vec<Cookie<'static>>,
}

impl Resolution {
    pub fn authenticated(
        user_id: Uuid,
        resolved_by: ResolvedBy,
        cookies: Vec<Cookie<'static>>,
    ) -> Self {
        Self {
            context: SessionContext::authenticated(user_id),
            resolved_by,
            cookies,
        }
    }

    pub fn anonymous(cookies: Vec<Cookie<'static>>) -> Self {
        Self {
            context: SessionContext::anonymous(),
            resolved_by: ResolvedBy::Nothing,
            cookies,
        }
    }
}
