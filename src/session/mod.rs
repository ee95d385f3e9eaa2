// Public API - what other modules can use
pub use cookies::{apply_cookies, read_session_cookies, SessionCookies};
pub use middleware::session_context;
pub use policy::{InvalidationPolicy, MarkerKind};
pub use resolver::SessionResolver;
pub use service::SessionService;
pub use token::{TokenIssuer, TokenRejection};
pub use types::{
    Resolution, ResolvedBy, SessionClaims, SessionContext, TokenKind, Verification,
    ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME,
};

// Internal modules
mod cookies;
mod middleware;
mod policy;
mod resolver;
mod service;
mod token;
mod types;
