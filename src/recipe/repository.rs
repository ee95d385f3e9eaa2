use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{
    models::{IngredientModel, RecipeModel, StepModel},
    types::{EditRecipeInput, IngredientInput, IngredientSortField, RecipeSortField, StepInput, StepSortField},
};
use crate::pagination::{like_pattern, matches_query, paged_sql, paginate, PageRequest};
use crate::shared::AppError;

/// Parking spot used while two steps trade positions
const SWAP_PARKING_POSITION: i32 = -1;

/// Storage for recipes together with their steps, ingredients and saves
#[async_trait]
pub trait RecipeRepository {
    async fn create_recipe(&self, recipe: &RecipeModel) -> Result<(), AppError>;
    async fn get_recipe(&self, recipe_id: Uuid) -> Result<Option<RecipeModel>, AppError>;
    async fn update_recipe(
        &self,
        recipe_id: Uuid,
        changes: &EditRecipeInput,
    ) -> Result<Option<RecipeModel>, AppError>;
    /// Deletes the recipe with its steps, ingredients and saves
    async fn delete_recipe(&self, recipe_id: Uuid) -> Result<bool, AppError>;
    async fn list_recipes_by_authors(
        &self,
        author_ids: &[Uuid],
        page: &PageRequest<RecipeSortField>,
    ) -> Result<Vec<RecipeModel>, AppError>;
    async fn count_recipes_by_author(&self, author_id: Uuid) -> Result<i64, AppError>;
    async fn search_recipes(
        &self,
        query: Option<&str>,
        page: &PageRequest<RecipeSortField>,
    ) -> Result<Vec<RecipeModel>, AppError>;

    async fn save_recipe(&self, user_id: Uuid, recipe_id: Uuid) -> Result<(), AppError>;
    async fn unsave_recipe(&self, user_id: Uuid, recipe_id: Uuid) -> Result<(), AppError>;
    async fn list_saved_recipes(
        &self,
        user_id: Uuid,
        page: &PageRequest<RecipeSortField>,
    ) -> Result<Vec<RecipeModel>, AppError>;
    async fn list_saver_ids(&self, recipe_id: Uuid) -> Result<Vec<Uuid>, AppError>;
    async fn count_saves(&self, recipe_id: Uuid) -> Result<i64, AppError>;

    /// Removes everything a user authored or saved, ahead of deleting the user
    async fn delete_user_content(&self, user_id: Uuid) -> Result<(), AppError>;

    /// Inserts the step after the recipe's last one and returns it with its position
    async fn append_step(&self, step: &StepModel) -> Result<StepModel, AppError>;
    async fn get_step(&self, step_id: Uuid) -> Result<Option<StepModel>, AppError>;
    async fn update_step(&self, step_id: Uuid, changes: &StepInput) -> Result<Option<StepModel>, AppError>;
    /// Exchanges the positions of two steps of one recipe as a single unit.
    ///
    /// Three moves (park the first step, move the second into its place,
    /// put the first where the second was) keep `(recipe, position)` unique
    /// at every point. A failed move leaves both steps where they were.
    /// `None` when either step does not exist.
    async fn swap_step_positions(
        &self,
        first_id: Uuid,
        second_id: Uuid,
    ) -> Result<Option<(StepModel, StepModel)>, AppError>;
    /// Deletes the step and shifts the later steps down by one
    async fn delete_step(&self, step_id: Uuid) -> Result<bool, AppError>;
    async fn list_steps(
        &self,
        recipe_id: Uuid,
        page: &PageRequest<StepSortField>,
    ) -> Result<Vec<StepModel>, AppError>;
    /// Steps of any recipe whose name or content contains `query`
    async fn search_steps(
        &self,
        query: Option<&str>,
        page: &PageRequest<StepSortField>,
    ) -> Result<Vec<StepModel>, AppError>;

    async fn create_ingredient(&self, ingredient: &IngredientModel) -> Result<(), AppError>;
    async fn get_ingredient(&self, ingredient_id: Uuid) -> Result<Option<IngredientModel>, AppError>;
    async fn update_ingredient(
        &self,
        ingredient_id: Uuid,
        changes: &IngredientInput,
    ) -> Result<Option<IngredientModel>, AppError>;
    async fn delete_ingredient(&self, ingredient_id: Uuid) -> Result<bool, AppError>;
    async fn list_ingredients(
        &self,
        recipe_id: Uuid,
        page: &PageRequest<IngredientSortField>,
    ) -> Result<Vec<IngredientModel>, AppError>;
    /// Ingredients of any recipe whose name contains `query`
    async fn search_ingredients(
        &self,
        query: Option<&str>,
        page: &PageRequest<IngredientSortField>,
    ) -> Result<Vec<IngredientModel>, AppError>;
}

#[derive(Default)]
struct RecipeTables {
    recipes: HashMap<Uuid, RecipeModel>,
    steps: HashMap<Uuid, StepModel>,
    ingredients: HashMap<Uuid, IngredientModel>,
    saves: HashSet<(Uuid, Uuid)>, // (user, recipe)
}

impl RecipeTables {
    /// Fails if another step of the same recipe already holds `position`
    fn move_step(&mut self, step_id: Uuid, position: i32) -> Result<StepModel, AppError> {
        let recipe_id = self
            .steps
            .get(&step_id)
            .map(|s| s.recipe_id)
            .ok_or_else(|| AppError::NotFound("Step not found".to_string()))?;

        let taken = self
            .steps
            .values()
            .any(|s| s.recipe_id == recipe_id && s.id != step_id && s.position == position);
        if taken {
            warn!(step_id = %step_id, position, "Step position already taken");
            return Err(AppError::DatabaseError(format!(
                "step position {} already taken in recipe {}",
                position, recipe_id
            )));
        }

        let step = self
            .steps
            .get_mut(&step_id)
            .ok_or_else(|| AppError::NotFound("Step not found".to_string()))?;
        step.position = position;
        Ok(step.clone())
    }

    fn swap_steps(&mut self, first: &StepModel, second: &StepModel) -> Result<(StepModel, StepModel), AppError> {
        self.move_step(first.id, SWAP_PARKING_POSITION)?;
        let moved_second = self.move_step(second.id, first.position)?;
        let moved_first = self.move_step(first.id, second.position)?;
        Ok((moved_first, moved_second))
    }

    fn remove_recipe(&mut self, recipe_id: Uuid) -> bool {
        self.steps.retain(|_, step| step.recipe_id != recipe_id);
        self.ingredients
            .retain(|_, ingredient| ingredient.recipe_id != recipe_id);
        self.saves.retain(|(_, recipe)| *recipe != recipe_id);
        self.recipes.remove(&recipe_id).is_some()
    }
}

fn recipe_page(recipes: Vec<RecipeModel>, page: &PageRequest<RecipeSortField>) -> Vec<RecipeModel> {
    let field = page.sort;
    paginate(recipes, page, |a, b| field.compare(a, b), |r| r.id)
}

/// ILIKE pattern for a search query; blank queries match everything
fn search_pattern(query: Option<&str>) -> Option<String> {
    query.map(str::trim).filter(|q| !q.is_empty()).map(like_pattern)
}

/// In-memory implementation of RecipeRepository for development and testing
#[derive(Default)]
pub struct InMemoryRecipeRepository {
    tables: RwLock<RecipeTables>,
}

impl InMemoryRecipeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    #[instrument(skip(self, recipe))]
    async fn create_recipe(&self, recipe: &RecipeModel) -> Result<(), AppError> {
        debug!(recipe_id = %recipe.id, author_id = %recipe.author_id, "Creating recipe in memory");
        self.tables
            .write()
            .await
            .recipes
            .insert(recipe.id, recipe.clone());
        Ok(())
    }

    async fn get_recipe(&self, recipe_id: Uuid) -> Result<Option<RecipeModel>, AppError> {
        Ok(self.tables.read().await.recipes.get(&recipe_id).cloned())
    }

    async fn update_recipe(
        &self,
        recipe_id: Uuid,
        changes: &EditRecipeInput,
    ) -> Result<Option<RecipeModel>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(recipe) = tables.recipes.get_mut(&recipe_id) else {
            return Ok(None);
        };

        if let Some(name) = &changes.name {
            recipe.name = name.clone();
        }
        if changes.description.is_some() {
            recipe.description = changes.description.clone();
        }
        if changes.category.is_some() {
            recipe.category = changes.category.clone();
        }
        if changes.cuisine.is_some() {
            recipe.cuisine = changes.cuisine.clone();
        }
        if changes.cook_time.is_some() {
            recipe.cook_time = changes.cook_time;
        }
        if changes.prep_time.is_some() {
            recipe.prep_time = changes.prep_time;
        }
        recipe.updated_at = Utc::now();

        Ok(Some(recipe.clone()))
    }

    #[instrument(skip(self))]
    async fn delete_recipe(&self, recipe_id: Uuid) -> Result<bool, AppError> {
        Ok(self.tables.write().await.remove_recipe(recipe_id))
    }

    async fn list_recipes_by_authors(
        &self,
        author_ids: &[Uuid],
        page: &PageRequest<RecipeSortField>,
    ) -> Result<Vec<RecipeModel>, AppError> {
        let tables = self.tables.read().await;
        let recipes = tables
            .recipes
            .values()
            .filter(|r| author_ids.contains(&r.author_id))
            .cloned()
            .collect();
        Ok(recipe_page(recipes, page))
    }

    async fn count_recipes_by_author(&self, author_id: Uuid) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .recipes
            .values()
            .filter(|r| r.author_id == author_id)
            .count() as i64)
    }

    async fn search_recipes(
        &self,
        query: Option<&str>,
        page: &PageRequest<RecipeSortField>,
    ) -> Result<Vec<RecipeModel>, AppError> {
        let tables = self.tables.read().await;
        let recipes = tables
            .recipes
            .values()
            .filter(|r| {
                matches_query(
                    query,
                    &[
                        Some(r.name.as_str()),
                        r.description.as_deref(),
                        r.cuisine.as_deref(),
                        r.category.as_deref(),
                    ],
                )
            })
            .cloned()
            .collect();
        Ok(recipe_page(recipes, page))
    }

    async fn save_recipe(&self, user_id: Uuid, recipe_id: Uuid) -> Result<(), AppError> {
        self.tables.write().await.saves.insert((user_id, recipe_id));
        Ok(())
    }

    async fn unsave_recipe(&self, user_id: Uuid, recipe_id: Uuid) -> Result<(), AppError> {
        self.tables.write().await.saves.remove(&(user_id, recipe_id));
        Ok(())
    }

    async fn list_saved_recipes(
        &self,
        user_id: Uuid,
        page: &PageRequest<RecipeSortField>,
    ) -> Result<Vec<RecipeModel>, AppError> {
        let tables = self.tables.read().await;
        let recipes = tables
            .saves
            .iter()
            .filter(|(user, _)| *user == user_id)
            .filter_map(|(_, recipe)| tables.recipes.get(recipe).cloned())
            .collect();
        Ok(recipe_page(recipes, page))
    }

    async fn list_saver_ids(&self, recipe_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .saves
            .iter()
            .filter(|(_, recipe)| *recipe == recipe_id)
            .map(|(user, _)| *user)
            .collect())
    }

    async fn count_saves(&self, recipe_id: Uuid) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.saves.iter().filter(|(_, r)| *r == recipe_id).count() as i64)
    }

    #[instrument(skip(self))]
    async fn delete_user_content(&self, user_id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let authored: Vec<Uuid> = tables
            .recipes
            .values()
            .filter(|r| r.author_id == user_id)
            .map(|r| r.id)
            .collect();
        for recipe_id in &authored {
            tables.remove_recipe(*recipe_id);
        }
        tables.saves.retain(|(user, _)| *user != user_id);

        debug!(user_id = %user_id, recipes = authored.len(), "Deleted user content in memory");
        Ok(())
    }

    async fn append_step(&self, step: &StepModel) -> Result<StepModel, AppError> {
        let mut tables = self.tables.write().await;
        let last = tables
            .steps
            .values()
            .filter(|s| s.recipe_id == step.recipe_id)
            .map(|s| s.position)
            .max()
            .unwrap_or(0);

        let mut stored = step.clone();
        stored.position = last + 1;
        tables.steps.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_step(&self, step_id: Uuid) -> Result<Option<StepModel>, AppError> {
        Ok(self.tables.read().await.steps.get(&step_id).cloned())
    }

    async fn update_step(&self, step_id: Uuid, changes: &StepInput) -> Result<Option<StepModel>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(step) = tables.steps.get_mut(&step_id) else {
            return Ok(None);
        };

        if changes.name.is_some() {
            step.name = changes.name.clone();
        }
        step.content = changes.content.clone();
        Ok(Some(step.clone()))
    }

    #[instrument(skip(self))]
    async fn swap_step_positions(
        &self,
        first_id: Uuid,
        second_id: Uuid,
    ) -> Result<Option<(StepModel, StepModel)>, AppError> {
        let mut tables = self.tables.write().await;
        let (Some(first), Some(second)) = (
            tables.steps.get(&first_id).cloned(),
            tables.steps.get(&second_id).cloned(),
        ) else {
            return Ok(None);
        };

        match tables.swap_steps(&first, &second) {
            Ok(swapped) => Ok(Some(swapped)),
            Err(e) => {
                warn!(first = %first.id, second = %second.id, error = %e, "Step swap failed, restoring positions");
                tables.steps.insert(first.id, first);
                tables.steps.insert(second.id, second);
                Err(e)
            }
        }
    }

    async fn delete_step(&self, step_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let Some(removed) = tables.steps.remove(&step_id) else {
            return Ok(false);
        };

        for step in tables.steps.values_mut() {
            if step.recipe_id == removed.recipe_id && step.position > removed.position {
                step.position -= 1;
            }
        }
        Ok(true)
    }

    async fn list_steps(
        &self,
        recipe_id: Uuid,
        page: &PageRequest<StepSortField>,
    ) -> Result<Vec<StepModel>, AppError> {
        let tables = self.tables.read().await;
        let steps = tables
            .steps
            .values()
            .filter(|s| s.recipe_id == recipe_id)
            .cloned()
            .collect();
        let field = page.sort;
        Ok(paginate(steps, page, |a, b| field.compare(a, b), |s| s.id))
    }

    async fn search_steps(
        &self,
        query: Option<&str>,
        page: &PageRequest<StepSortField>,
    ) -> Result<Vec<StepModel>, AppError> {
        let tables = self.tables.read().await;
        let steps = tables
            .steps
            .values()
            .filter(|s| matches_query(query, &[s.name.as_deref(), Some(s.content.as_str())]))
            .cloned()
            .collect();
        let field = page.sort;
        Ok(paginate(steps, page, |a, b| field.compare(a, b), |s| s.id))
    }

    async fn create_ingredient(&self, ingredient: &IngredientModel) -> Result<(), AppError> {
        self.tables
            .write()
            .await
            .ingredients
            .insert(ingredient.id, ingredient.clone());
        Ok(())
    }

    async fn get_ingredient(&self, ingredient_id: Uuid) -> Result<Option<IngredientModel>, AppError> {
        Ok(self.tables.read().await.ingredients.get(&ingredient_id).cloned())
    }

    async fn update_ingredient(
        &self,
        ingredient_id: Uuid,
        changes: &IngredientInput,
    ) -> Result<Option<IngredientModel>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.ingredients.get_mut(&ingredient_id).map(|ingredient| {
            ingredient.name = changes.name.clone();
            ingredient.quantity = changes.quantity.clone();
            ingredient.clone()
        }))
    }

    async fn delete_ingredient(&self, ingredient_id: Uuid) -> Result<bool, AppError> {
        Ok(self
            .tables
            .write()
            .await
            .ingredients
            .remove(&ingredient_id)
            .is_some())
    }

    async fn list_ingredients(
        &self,
        recipe_id: Uuid,
        page: &PageRequest<IngredientSortField>,
    ) -> Result<Vec<IngredientModel>, AppError> {
        let tables = self.tables.read().await;
        let ingredients = tables
            .ingredients
            .values()
            .filter(|i| i.recipe_id == recipe_id)
            .cloned()
            .collect();
        let field = page.sort;
        Ok(paginate(ingredients, page, |a, b| field.compare(a, b), |i| i.id))
    }

    async fn search_ingredients(
        &self,
        query: Option<&str>,
        page: &PageRequest<IngredientSortField>,
    ) -> Result<Vec<IngredientModel>, AppError> {
        let tables = self.tables.read().await;
        let ingredients = tables
            .ingredients
            .values()
            .filter(|i| matches_query(query, &[Some(i.name.as_str())]))
            .cloned()
            .collect();
        let field = page.sort;
        Ok(paginate(ingredients, page, |a, b| field.compare(a, b), |i| i.id))
    }
}

/// PostgreSQL implementation of recipe repository
pub struct PostgresRecipeRepository {
    pool: PgPool,
}

impl PostgresRecipeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_recipes<T>(
        &self,
        base: &str,
        param: T,
        page: &PageRequest<RecipeSortField>,
    ) -> Result<Vec<RecipeModel>, AppError>
    where
        T: for<'q> sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres> + Send + 'static,
    {
        let sql = paged_sql(base, 1, page.sort.column(), page.direction);
        let recipes = sqlx::query_as::<_, RecipeModel>(&sql)
            .bind(param)
            .bind(page.from)
            .bind(page.take)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to fetch recipe page from database");
                AppError::from(e)
            })?;
        Ok(recipes)
    }
}

#[async_trait]
impl RecipeRepository for PostgresRecipeRepository {
    #[instrument(skip(self, recipe))]
    async fn create_recipe(&self, recipe: &RecipeModel) -> Result<(), AppError> {
        debug!(recipe_id = %recipe.id, author_id = %recipe.author_id, "Creating recipe in database");

        sqlx::query(
            "INSERT INTO recipes (id, author_id, name, description, category, cuisine, cook_time, prep_time, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(recipe.id)
        .bind(recipe.author_id)
        .bind(&recipe.name)
        .bind(&recipe.description)
        .bind(&recipe.category)
        .bind(&recipe.cuisine)
        .bind(recipe.cook_time)
        .bind(recipe.prep_time)
        .bind(recipe.created_at)
        .bind(recipe.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_recipe(&self, recipe_id: Uuid) -> Result<Option<RecipeModel>, AppError> {
        let recipe = sqlx::query_as::<_, RecipeModel>("SELECT * FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(recipe)
    }

    async fn update_recipe(
        &self,
        recipe_id: Uuid,
        changes: &EditRecipeInput,
    ) -> Result<Option<RecipeModel>, AppError> {
        let recipe = sqlx::query_as::<_, RecipeModel>(
            "UPDATE recipes SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                category = COALESCE($4, category), \
                cuisine = COALESCE($5, cuisine), \
                cook_time = COALESCE($6, cook_time), \
                prep_time = COALESCE($7, prep_time), \
                updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(recipe_id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(&changes.category)
        .bind(&changes.cuisine)
        .bind(changes.cook_time)
        .bind(changes.prep_time)
        .fetch_optional(&self.pool)
        .await?;
        Ok(recipe)
    }

    #[instrument(skip(self))]
    async fn delete_recipe(&self, recipe_id: Uuid) -> Result<bool, AppError> {
        // steps, ingredients and saves cascade
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_recipes_by_authors(
        &self,
        author_ids: &[Uuid],
        page: &PageRequest<RecipeSortField>,
    ) -> Result<Vec<RecipeModel>, AppError> {
        self.fetch_recipes(
            "SELECT * FROM recipes WHERE author_id = ANY($1)",
            author_ids.to_vec(),
            page,
        )
        .await
    }

    async fn count_recipes_by_author(&self, author_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn search_recipes(
        &self,
        query: Option<&str>,
        page: &PageRequest<RecipeSortField>,
    ) -> Result<Vec<RecipeModel>, AppError> {
        let pattern = search_pattern(query);
        self.fetch_recipes(
            "SELECT * FROM recipes WHERE ($1::text IS NULL \
                OR name ILIKE $1 OR description ILIKE $1 OR cuisine ILIKE $1 OR category ILIKE $1)",
            pattern,
            page,
        )
        .await
    }

    async fn save_recipe(&self, user_id: Uuid, recipe_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO saved_recipes (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn unsave_recipe(&self, user_id: Uuid, recipe_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM saved_recipes WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_saved_recipes(
        &self,
        user_id: Uuid,
        page: &PageRequest<RecipeSortField>,
    ) -> Result<Vec<RecipeModel>, AppError> {
        self.fetch_recipes(
            "SELECT r.* FROM recipes r JOIN saved_recipes s ON s.recipe_id = r.id WHERE s.user_id = $1",
            user_id,
            page,
        )
        .await
    }

    async fn list_saver_ids(&self, recipe_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM saved_recipes WHERE recipe_id = $1")
            .bind(recipe_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn count_saves(&self, recipe_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM saved_recipes WHERE recipe_id = $1")
            .bind(recipe_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn delete_user_content(&self, user_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM saved_recipes WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM recipes WHERE author_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(user_id = %user_id, recipes = deleted.rows_affected(), "Deleted user content in database");
        Ok(())
    }

    async fn append_step(&self, step: &StepModel) -> Result<StepModel, AppError> {
        let stored = sqlx::query_as::<_, StepModel>(
            "INSERT INTO steps (id, recipe_id, position, name, content, created_at) \
             SELECT $1, $2, COALESCE(MAX(position), 0) + 1, $3, $4, $5 FROM steps WHERE recipe_id = $2 \
             RETURNING *",
        )
        .bind(step.id)
        .bind(step.recipe_id)
        .bind(&step.name)
        .bind(&step.content)
        .bind(step.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }

    async fn get_step(&self, step_id: Uuid) -> Result<Option<StepModel>, AppError> {
        let step = sqlx::query_as::<_, StepModel>("SELECT * FROM steps WHERE id = $1")
            .bind(step_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(step)
    }

    async fn update_step(&self, step_id: Uuid, changes: &StepInput) -> Result<Option<StepModel>, AppError> {
        let step = sqlx::query_as::<_, StepModel>(
            "UPDATE steps SET name = COALESCE($2, name), content = $3 WHERE id = $1 RETURNING *",
        )
        .bind(step_id)
        .bind(&changes.name)
        .bind(&changes.content)
        .fetch_optional(&self.pool)
        .await?;
        Ok(step)
    }

    #[instrument(skip(self))]
    async fn swap_step_positions(
        &self,
        first_id: Uuid,
        second_id: Uuid,
    ) -> Result<Option<(StepModel, StepModel)>, AppError> {
        let mut tx = self.pool.begin().await?;

        // Lock both rows so the positions read here are the ones swapped
        let locked = sqlx::query_as::<_, StepModel>("SELECT * FROM steps WHERE id = ANY($1) FOR UPDATE")
            .bind(vec![first_id, second_id])
            .fetch_all(&mut *tx)
            .await?;
        let find = |id: Uuid| locked.iter().find(|s| s.id == id).cloned();
        let (Some(first), Some(second)) = (find(first_id), find(second_id)) else {
            return Ok(None);
        };

        let place = "UPDATE steps SET position = $2 WHERE id = $1 RETURNING *";
        sqlx::query(place)
            .bind(first.id)
            .bind(SWAP_PARKING_POSITION)
            .execute(&mut *tx)
            .await?;
        let moved_second = sqlx::query_as::<_, StepModel>(place)
            .bind(second.id)
            .bind(first.position)
            .fetch_one(&mut *tx)
            .await?;
        let moved_first = sqlx::query_as::<_, StepModel>(place)
            .bind(first.id)
            .bind(second.position)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(first = %first.id, second = %second.id, "Swapped step positions in database");
        Ok(Some((moved_first, moved_second)))
    }

    #[instrument(skip(self))]
    async fn delete_step(&self, step_id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query_as::<_, (Uuid, i32)>(
            "DELETE FROM steps WHERE id = $1 RETURNING recipe_id, position",
        )
        .bind(step_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((recipe_id, position)) = removed else {
            return Ok(false);
        };

        sqlx::query("UPDATE steps SET position = position - 1 WHERE recipe_id = $1 AND position > $2")
            .bind(recipe_id)
            .bind(position)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(true)
    }

    async fn list_steps(
        &self,
        recipe_id: Uuid,
        page: &PageRequest<StepSortField>,
    ) -> Result<Vec<StepModel>, AppError> {
        let sql = paged_sql(
            "SELECT * FROM steps WHERE recipe_id = $1",
            1,
            page.sort.column(),
            page.direction,
        );
        let steps = sqlx::query_as::<_, StepModel>(&sql)
            .bind(recipe_id)
            .bind(page.from)
            .bind(page.take)
            .fetch_all(&self.pool)
            .await?;
        Ok(steps)
    }

    async fn search_steps(
        &self,
        query: Option<&str>,
        page: &PageRequest<StepSortField>,
    ) -> Result<Vec<StepModel>, AppError> {
        let sql = paged_sql(
            "SELECT * FROM steps WHERE ($1::text IS NULL OR name ILIKE $1 OR content ILIKE $1)",
            1,
            page.sort.column(),
            page.direction,
        );
        let steps = sqlx::query_as::<_, StepModel>(&sql)
            .bind(search_pattern(query))
            .bind(page.from)
            .bind(page.take)
            .fetch_all(&self.pool)
            .await?;
        Ok(steps)
    }

    async fn create_ingredient(&self, ingredient: &IngredientModel) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO ingredients (id, recipe_id, name, quantity, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(ingredient.id)
        .bind(ingredient.recipe_id)
        .bind(&ingredient.name)
        .bind(&ingredient.quantity)
        .bind(ingredient.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_ingredient(&self, ingredient_id: Uuid) -> Result<Option<IngredientModel>, AppError> {
        let ingredient = sqlx::query_as::<_, IngredientModel>("SELECT * FROM ingredients WHERE id = $1")
            .bind(ingredient_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ingredient)
    }

    async fn update_ingredient(
        &self,
        ingredient_id: Uuid,
        changes: &IngredientInput,
    ) -> Result<Option<IngredientModel>, AppError> {
        let ingredient = sqlx::query_as::<_, IngredientModel>(
            "UPDATE ingredients SET name = $2, quantity = $3 WHERE id = $1 RETURNING *",
        )
        .bind(ingredient_id)
        .bind(&changes.name)
        .bind(&changes.quantity)
        .fetch_optional(&self.pool)
        .await?;
        Ok(ingredient)
    }

    async fn delete_ingredient(&self, ingredient_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = $1")
            .bind(ingredient_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_ingredients(
        &self,
        recipe_id: Uuid,
        page: &PageRequest<IngredientSortField>,
    ) -> Result<Vec<IngredientModel>, AppError> {
        let sql = paged_sql(
            "SELECT * FROM ingredients WHERE recipe_id = $1",
            1,
            page.sort.column(),
            page.direction,
        );
        let ingredients = sqlx::query_as::<_, IngredientModel>(&sql)
            .bind(recipe_id)
            .bind(page.from)
            .bind(page.take)
            .fetch_all(&self.pool)
            .await?;
        Ok(ingredients)
    }

    async fn search_ingredients(
        &self,
        query: Option<&str>,
        page: &PageRequest<IngredientSortField>,
    ) -> Result<Vec<IngredientModel>, AppError> {
        let sql = paged_sql(
            "SELECT * FROM ingredients WHERE ($1::text IS NULL OR name ILIKE $1)",
            1,
            page.sort.column(),
            page.direction,
        );
        let ingredients = sqlx::query_as::<_, IngredientModel>(&sql)
            .bind(search_pattern(query))
            .bind(page.from)
            .bind(page.take)
            .fetch_all(&self.pool)
            .await?;
        Ok(ingredients)
    }
}
