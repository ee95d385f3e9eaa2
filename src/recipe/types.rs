use async_graphql::{Enum, InputObject};
use std::cmp::Ordering;

use super::models::{IngredientModel, RecipeModel, StepModel};
use crate::pagination::Direction;

#[derive(Debug, Clone, Default, InputObject)]
pub struct CreateRecipeInput {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub cuisine: Option<String>,
    pub cook_time: Option<i32>,
    pub prep_time: Option<i32>,
}

/// Recipe changes; missing fields stay as they are
#[derive(Debug, Clone, Default, InputObject)]
pub struct EditRecipeInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub cuisine: Option<String>,
    pub cook_time: Option<i32>,
    pub prep_time: Option<i32>,
}

#[derive(Debug, Clone, InputObject)]
pub struct StepInput {
    pub name: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, InputObject)]
pub struct IngredientInput {
    pub name: String,
    pub quantity: String,
}

#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecipeSortField {
    #[default]
    CreatedAt,
    Name,
    Category,
    Cuisine,
    CookTime,
    PrepTime,
}

impl RecipeSortField {
    pub fn column(&self) -> &'static str {
        match self {
            RecipeSortField::CreatedAt => "created_at",
            RecipeSortField::Name => "name",
            RecipeSortField::Category => "category",
            RecipeSortField::Cuisine => "cuisine",
            RecipeSortField::CookTime => "cook_time",
            RecipeSortField::PrepTime => "prep_time",
        }
    }

    pub fn compare(&self, a: &RecipeModel, b: &RecipeModel) -> Ordering {
        match self {
            RecipeSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            RecipeSortField::Name => a.name.cmp(&b.name),
            RecipeSortField::Category => a.category.cmp(&b.category),
            RecipeSortField::Cuisine => a.cuisine.cmp(&b.cuisine),
            RecipeSortField::CookTime => a.cook_time.cmp(&b.cook_time),
            RecipeSortField::PrepTime => a.prep_time.cmp(&b.prep_time),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, InputObject)]
pub struct RecipeSort {
    pub field: RecipeSortField,
    #[graphql(default)]
    pub direction: Direction,
}

#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepSortField {
    #[default]
    Position,
    Name,
    CreatedAt,
}

impl StepSortField {
    pub fn column(&self) -> &'static str {
        match self {
            StepSortField::Position => "position",
            StepSortField::Name => "name",
            StepSortField::CreatedAt => "created_at",
        }
    }

    pub fn compare(&self, a: &StepModel, b: &StepModel) -> Ordering {
        match self {
            StepSortField::Position => a.position.cmp(&b.position),
            StepSortField::Name => a.name.cmp(&b.name),
            StepSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, InputObject)]
pub struct StepSort {
    pub field: StepSortField,
    #[graphql(default)]
    pub direction: Direction,
}

#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngredientSortField {
    #[default]
    CreatedAt,
    Name,
    Quantity,
}

impl IngredientSortField {
    pub fn column(&self) -> &'static str {
        match self {
            IngredientSortField::CreatedAt => "created_at",
            IngredientSortField::Name => "name",
            IngredientSortField::Quantity => "quantity",
        }
    }

    pub fn compare(&self, a: &IngredientModel, b: &IngredientModel) -> Ordering {
        match self {
            IngredientSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            IngredientSortField::Name => a.name.cmp(&b.name),
            IngredientSortField::Quantity => a.quantity.cmp(&b.quantity),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, InputObject)]
pub struct IngredientSort {
    pub field: IngredientSortField,
    #[graphql(default)]
    pub direction: Direction,
}
