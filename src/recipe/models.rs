use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::types::{CreateRecipeInput, IngredientInput, StepInput};

/// Database model for recipes table
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct RecipeModel {
    pub id: Uuid,
    pub author_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub cuisine: Option<String>,
    pub cook_time: Option<i32>,
    pub prep_time: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecipeModel {
    pub fn new(author_id: Uuid, input: CreateRecipeInput) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            author_id,
            name: input.name,
            description: input.description,
            category: input.category,
            cuisine: input.cuisine,
            cook_time: input.cook_time,
            prep_time: input.prep_time,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A recipe step. `position` is 1-based and unique within its recipe.
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct StepModel {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub position: i32,
    pub name: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl StepModel {
    /// New step for `recipe_id`; the store assigns the position on insert
    pub fn new(recipe_id: Uuid, input: StepInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipe_id,
            position: 0,
            name: input.name,
            content: input.content,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct IngredientModel {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub name: String,
    pub quantity: String,
    pub created_at: DateTime<Utc>,
}

impl IngredientModel {
    pub fn new(recipe_id: Uuid, input: IngredientInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipe_id,
            name: input.name,
            quantity: input.quantity,
            created_at: Utc::now(),
        }
    }
}
