// Public API - what other modules can use
pub use repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository};
pub use service::UserService;

pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod types;
mod validation;
