// Library crate for the Appetized recipe API
// This file exposes the public API for integration tests

pub mod config;
pub mod graphql;
pub mod pagination;
pub mod recipe;
pub mod router;
pub mod session;
pub mod shared;
pub mod user;
pub mod verification;

// Re-export commonly used types for easier access in tests
pub use config::{AppConfig, Environment};
pub use router::build_router;
pub use session::{InvalidationPolicy, SessionContext, SessionService};
pub use shared::{AppError, AppState};
