pub mod models;
pub mod repository;
pub mod service;
pub mod types;

pub use repository::{InMemoryRecipeRepository, PostgresRecipeRepository, RecipeRepository};
pub use service::RecipeService;
