use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    models::{IngredientModel, RecipeModel, StepModel},
    repository::RecipeRepository,
    types::{
        CreateRecipeInput, EditRecipeInput, IngredientInput, IngredientSortField, RecipeSortField,
        StepInput, StepSortField,
    },
};
use crate::pagination::{Direction, PageRequest};
use crate::session::SessionContext;
use crate::shared::AppError;
use crate::user::{models::UserModel, repository::UserRepository, types::UserSortField};

fn login_required() -> AppError {
    AppError::Unauthorized("You must be logged in to perform this action".to_string())
}

fn recipe_not_found() -> AppError {
    AppError::NotFound("Recipe not found".to_string())
}

/// Recipe, step and ingredient operations with their ownership rules
pub struct RecipeService {
    recipes: Arc<dyn RecipeRepository + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
}

impl RecipeService {
    pub fn new(
        recipes: Arc<dyn RecipeRepository + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self { recipes, users }
    }

    fn caller(session: &SessionContext) -> Result<Uuid, AppError> {
        session.session_user_id.ok_or_else(login_required)
    }

    /// Loads a recipe the caller is allowed to modify
    async fn owned_recipe(&self, session: &SessionContext, recipe_id: Uuid) -> Result<RecipeModel, AppError> {
        let user_id = Self::caller(session)?;
        let recipe = self
            .recipes
            .get_recipe(recipe_id)
            .await?
            .ok_or_else(recipe_not_found)?;

        if recipe.author_id != user_id {
            return Err(AppError::Forbidden(
                "You are not authorized to edit this recipe".to_string(),
            ));
        }
        Ok(recipe)
    }

    /// Like `owned_recipe`, but a recipe owned by someone else is reported
    /// as missing. Used when adding children to a recipe.
    async fn recipe_for_children(&self, session: &SessionContext, recipe_id: Uuid) -> Result<RecipeModel, AppError> {
        let user_id = Self::caller(session)?;
        match self.recipes.get_recipe(recipe_id).await? {
            Some(recipe) if recipe.author_id == user_id => Ok(recipe),
            _ => Err(recipe_not_found()),
        }
    }

    async fn owned_step(&self, session: &SessionContext, step_id: Uuid) -> Result<StepModel, AppError> {
        let user_id = Self::caller(session)?;
        let step = self
            .recipes
            .get_step(step_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Step not found".to_string()))?;

        let owner = self.recipes.get_recipe(step.recipe_id).await?.map(|r| r.author_id);
        if owner != Some(user_id) {
            return Err(AppError::Forbidden(
                "You are not authorized to edit this step".to_string(),
            ));
        }
        Ok(step)
    }

    async fn owned_ingredient(
        &self,
        session: &SessionContext,
        ingredient_id: Uuid,
    ) -> Result<IngredientModel, AppError> {
        let user_id = Self::caller(session)?;
        let ingredient = self
            .recipes
            .get_ingredient(ingredient_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ingredient not found".to_string()))?;

        let owner = self
            .recipes
            .get_recipe(ingredient.recipe_id)
            .await?
            .map(|r| r.author_id);
        if owner != Some(user_id) {
            return Err(AppError::Forbidden(
                "You are not authorized to edit this ingredient".to_string(),
            ));
        }
        Ok(ingredient)
    }

    #[instrument(skip(self, input))]
    pub async fn create_recipe(
        &self,
        session: &SessionContext,
        input: CreateRecipeInput,
    ) -> Result<RecipeModel, AppError> {
        let user_id = Self::caller(session)?;
        if input.name.trim().is_empty() {
            return Err(AppError::Validation("Recipe name is required".to_string()));
        }

        let recipe = RecipeModel::new(user_id, input);
        self.recipes.create_recipe(&recipe).await?;

        info!(recipe_id = %recipe.id, author_id = %user_id, "Recipe created");
        Ok(recipe)
    }

    #[instrument(skip(self, input))]
    pub async fn edit_recipe(
        &self,
        session: &SessionContext,
        recipe_id: Uuid,
        input: EditRecipeInput,
    ) -> Result<RecipeModel, AppError> {
        self.owned_recipe(session, recipe_id).await?;
        if input.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(AppError::Validation("Recipe name is required".to_string()));
        }

        self.recipes
            .update_recipe(recipe_id, &input)
            .await?
            .ok_or_else(recipe_not_found)
    }

    #[instrument(skip(self))]
    pub async fn delete_recipe(&self, session: &SessionContext, recipe_id: Uuid) -> Result<bool, AppError> {
        self.owned_recipe(session, recipe_id).await?;
        let deleted = self.recipes.delete_recipe(recipe_id).await?;

        info!(recipe_id = %recipe_id, "Recipe deleted");
        Ok(deleted)
    }

    pub async fn save_recipe(&self, session: &SessionContext, recipe_id: Uuid) -> Result<RecipeModel, AppError> {
        let user_id = Self::caller(session)?;
        let recipe = self.get_recipe(recipe_id).await?;
        self.recipes.save_recipe(user_id, recipe_id).await?;
        Ok(recipe)
    }

    pub async fn unsave_recipe(&self, session: &SessionContext, recipe_id: Uuid) -> Result<RecipeModel, AppError> {
        let user_id = Self::caller(session)?;
        let recipe = self.get_recipe(recipe_id).await?;
        self.recipes.unsave_recipe(user_id, recipe_id).await?;
        Ok(recipe)
    }

    #[instrument(skip(self, input))]
    pub async fn create_step(
        &self,
        session: &SessionContext,
        recipe_id: Uuid,
        input: StepInput,
    ) -> Result<StepModel, AppError> {
        self.recipe_for_children(session, recipe_id).await?;
        self.recipes
            .append_step(&StepModel::new(recipe_id, input))
            .await
    }

    pub async fn edit_step(
        &self,
        session: &SessionContext,
        step_id: Uuid,
        input: StepInput,
    ) -> Result<StepModel, AppError> {
        self.owned_step(session, step_id).await?;
        self.recipes
            .update_step(step_id, &input)
            .await?
            .ok_or_else(|| AppError::NotFound("Step not found".to_string()))
    }

    pub async fn delete_step(&self, session: &SessionContext, step_id: Uuid) -> Result<bool, AppError> {
        self.owned_step(session, step_id).await?;
        self.recipes.delete_step(step_id).await
    }

    /// Exchanges the positions of two steps of the same recipe.
    ///
    /// The store performs the exchange as one unit, so a concurrent
    /// delete can make it fail but never leaves a step half moved.
    #[instrument(skip(self))]
    pub async fn swap_steps(
        &self,
        session: &SessionContext,
        first_id: Uuid,
        second_id: Uuid,
    ) -> Result<Vec<StepModel>, AppError> {
        let first = self.owned_step(session, first_id).await?;
        let second = self.owned_step(session, second_id).await?;

        if first.recipe_id != second.recipe_id {
            return Err(AppError::Validation(
                "Steps must belong to the same recipe".to_string(),
            ));
        }
        if first.id == second.id {
            return Ok(vec![first]);
        }

        let (moved_first, moved_second) = self
            .recipes
            .swap_step_positions(first.id, second.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Step not found".to_string()))?;

        info!(recipe_id = %first.recipe_id, first = %first.id, second = %second.id, "Steps swapped");
        Ok(vec![moved_first, moved_second])
    }

    pub async fn create_ingredient(
        &self,
        session: &SessionContext,
        recipe_id: Uuid,
        input: IngredientInput,
    ) -> Result<IngredientModel, AppError> {
        self.recipe_for_children(session, recipe_id).await?;
        let ingredient = IngredientModel::new(recipe_id, input);
        self.recipes.create_ingredient(&ingredient).await?;
        Ok(ingredient)
    }

    pub async fn edit_ingredient(
        &self,
        session: &SessionContext,
        ingredient_id: Uuid,
        input: IngredientInput,
    ) -> Result<IngredientModel, AppError> {
        self.owned_ingredient(session, ingredient_id).await?;
        self.recipes
            .update_ingredient(ingredient_id, &input)
            .await?
            .ok_or_else(|| AppError::NotFound("Ingredient not found".to_string()))
    }

    pub async fn delete_ingredient(&self, session: &SessionContext, ingredient_id: Uuid) -> Result<bool, AppError> {
        self.owned_ingredient(session, ingredient_id).await?;
        self.recipes.delete_ingredient(ingredient_id).await
    }

    pub async fn get_recipe(&self, recipe_id: Uuid) -> Result<RecipeModel, AppError> {
        self.recipes
            .get_recipe(recipe_id)
            .await?
            .ok_or_else(recipe_not_found)
    }

    pub async fn get_step(&self, step_id: Uuid) -> Result<StepModel, AppError> {
        self.recipes
            .get_step(step_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Step not found".to_string()))
    }

    pub async fn get_ingredient(&self, ingredient_id: Uuid) -> Result<IngredientModel, AppError> {
        self.recipes
            .get_ingredient(ingredient_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ingredient not found".to_string()))
    }

    pub async fn search(
        &self,
        query: Option<&str>,
        page: &PageRequest<RecipeSortField>,
    ) -> Result<Vec<RecipeModel>, AppError> {
        self.recipes.search_recipes(query, page).await
    }

    /// Recipes by the people the caller follows, newest first
    pub async fn feed(
        &self,
        session: &SessionContext,
        take: Option<i32>,
        from: Option<Uuid>,
    ) -> Result<Vec<RecipeModel>, AppError> {
        let user_id = session.require_user()?;
        let following = self.users.following_ids(user_id).await?;
        if following.is_empty() {
            return Ok(Vec::new());
        }

        let page = PageRequest::new(take, from, RecipeSortField::CreatedAt, Direction::Desc);
        self.recipes.list_recipes_by_authors(&following, &page).await
    }

    pub async fn recipes_by_author(
        &self,
        author_id: Uuid,
        page: &PageRequest<RecipeSortField>,
    ) -> Result<Vec<RecipeModel>, AppError> {
        self.recipes.list_recipes_by_authors(&[author_id], page).await
    }

    pub async fn recipe_count(&self, author_id: Uuid) -> Result<i64, AppError> {
        self.recipes.count_recipes_by_author(author_id).await
    }

    pub async fn saved_recipes(
        &self,
        user_id: Uuid,
        page: &PageRequest<RecipeSortField>,
    ) -> Result<Vec<RecipeModel>, AppError> {
        self.recipes.list_saved_recipes(user_id, page).await
    }

    pub async fn saved_by(
        &self,
        recipe_id: Uuid,
        page: &PageRequest<UserSortField>,
    ) -> Result<Vec<UserModel>, AppError> {
        let ids = self.recipes.list_saver_ids(recipe_id).await?;
        self.users.list_users_by_ids(&ids, page).await
    }

    pub async fn saved_count(&self, recipe_id: Uuid) -> Result<i64, AppError> {
        self.recipes.count_saves(recipe_id).await
    }

    pub async fn steps(
        &self,
        recipe_id: Uuid,
        page: &PageRequest<StepSortField>,
    ) -> Result<Vec<StepModel>, AppError> {
        self.recipes.list_steps(recipe_id, page).await
    }

    pub async fn ingredients(
        &self,
        recipe_id: Uuid,
        page: &PageRequest<IngredientSortField>,
    ) -> Result<Vec<IngredientModel>, AppError> {
        self.recipes.list_ingredients(recipe_id, page).await
    }

    /// Steps across every recipe, matched on name and content
    pub async fn search_steps(
        &self,
        query: Option<&str>,
        page: &PageRequest<StepSortField>,
    ) -> Result<Vec<StepModel>, AppError> {
        self.recipes.search_steps(query, page).await
    }

    pub async fn search_ingredients(
        &self,
        query: Option<&str>,
        page: &PageRequest<IngredientSortField>,
    ) -> Result<Vec<IngredientModel>, AppError> {
        self.recipes.search_ingredients(query, page).await
    }
}
