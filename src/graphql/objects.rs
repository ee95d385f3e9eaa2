use async_graphql::{Context, Object, Result, ID};
use chrono::{DateTime, Utc};

use super::{
    responses::{graphql_error, parse_cursor},
    Services,
};
use crate::pagination::{Direction, PageRequest};
use crate::recipe::{
    models::{IngredientModel, RecipeModel, StepModel},
    types::{IngredientSort, RecipeSort, StepSort},
};
use crate::user::{models::UserModel, types::UserSort};

/// Builds a page request from the common `take`/`from`/sort arguments
pub(crate) fn page<S>(
    take: Option<i32>,
    from: Option<&ID>,
    field: S,
    direction: Direction,
) -> Result<PageRequest<S>> {
    let from = parse_cursor(from).map_err(graphql_error)?;
    Ok(PageRequest::new(take, from, field, direction))
}

fn id_of(id: uuid::Uuid) -> ID {
    ID(id.to_string())
}

pub struct User(pub UserModel);

#[Object]
impl User {
    async fn id(&self) -> ID {
        id_of(self.0.id)
    }

    async fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    async fn username(&self) -> &str {
        &self.0.username
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn recipes(
        &self,
        ctx: &Context<'_>,
        take: Option<i32>,
        from: Option<ID>,
        sort: Option<RecipeSort>,
    ) -> Result<Vec<Recipe>> {
        let sort = sort.unwrap_or_default();
        let page = page(take, from.as_ref(), sort.field, sort.direction)?;
        let recipes = ctx
            .data::<Services>()?
            .recipes
            .recipes_by_author(self.0.id, &page)
            .await
            .map_err(graphql_error)?;
        Ok(recipes.into_iter().map(Recipe).collect())
    }

    async fn recipes_count(&self, ctx: &Context<'_>) -> Result<i64> {
        ctx.data::<Services>()?
            .recipes
            .recipe_count(self.0.id)
            .await
            .map_err(graphql_error)
    }

    async fn saved_recipes(
        &self,
        ctx: &Context<'_>,
        take: Option<i32>,
        from: Option<ID>,
        sort: Option<RecipeSort>,
    ) -> Result<Vec<Recipe>> {
        let sort = sort.unwrap_or_default();
        let page = page(take, from.as_ref(), sort.field, sort.direction)?;
        let recipes = ctx
            .data::<Services>()?
            .recipes
            .saved_recipes(self.0.id, &page)
            .await
            .map_err(graphql_error)?;
        Ok(recipes.into_iter().map(Recipe).collect())
    }

    async fn following(
        &self,
        ctx: &Context<'_>,
        take: Option<i32>,
        from: Option<ID>,
        sort: Option<UserSort>,
    ) -> Result<Vec<User>> {
        let sort = sort.unwrap_or_default();
        let page = page(take, from.as_ref(), sort.field, sort.direction)?;
        let users = ctx
            .data::<Services>()?
            .users
            .following(self.0.id, &page)
            .await
            .map_err(graphql_error)?;
        Ok(users.into_iter().map(User).collect())
    }

    async fn following_count(&self, ctx: &Context<'_>) -> Result<i64> {
        ctx.data::<Services>()?
            .users
            .following_count(self.0.id)
            .await
            .map_err(graphql_error)
    }

    async fn followers(
        &self,
        ctx: &Context<'_>,
        take: Option<i32>,
        from: Option<ID>,
        sort: Option<UserSort>,
    ) -> Result<Vec<User>> {
        let sort = sort.unwrap_or_default();
        let page = page(take, from.as_ref(), sort.field, sort.direction)?;
        let users = ctx
            .data::<Services>()?
            .users
            .followers(self.0.id, &page)
            .await
            .map_err(graphql_error)?;
        Ok(users.into_iter().map(User).collect())
    }

    async fn follower_count(&self, ctx: &Context<'_>) -> Result<i64> {
        ctx.data::<Services>()?
            .users
            .follower_count(self.0.id)
            .await
            .map_err(graphql_error)
    }
}

pub struct Recipe(pub RecipeModel);

#[Object]
impl Recipe {
    async fn id(&self) -> ID {
        id_of(self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn author(&self, ctx: &Context<'_>) -> Result<User> {
        let author = ctx
            .data::<Services>()?
            .users
            .get_user(self.0.author_id)
            .await
            .map_err(graphql_error)?;
        Ok(User(author))
    }

    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    async fn category(&self) -> Option<&str> {
        self.0.category.as_deref()
    }

    async fn cuisine(&self) -> Option<&str> {
        self.0.cuisine.as_deref()
    }

    async fn cook_time(&self) -> Option<i32> {
        self.0.cook_time
    }

    async fn prep_time(&self) -> Option<i32> {
        self.0.prep_time
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn steps(
        &self,
        ctx: &Context<'_>,
        take: Option<i32>,
        from: Option<ID>,
        sort: Option<StepSort>,
    ) -> Result<Vec<Step>> {
        let sort = sort.unwrap_or_default();
        let page = page(take, from.as_ref(), sort.field, sort.direction)?;
        let steps = ctx
            .data::<Services>()?
            .recipes
            .steps(self.0.id, &page)
            .await
            .map_err(graphql_error)?;
        Ok(steps.into_iter().map(Step).collect())
    }

    async fn ingredients(
        &self,
        ctx: &Context<'_>,
        take: Option<i32>,
        from: Option<ID>,
        sort: Option<IngredientSort>,
    ) -> Result<Vec<Ingredient>> {
        let sort = sort.unwrap_or_default();
        let page = page(take, from.as_ref(), sort.field, sort.direction)?;
        let ingredients = ctx
            .data::<Services>()?
            .recipes
            .ingredients(self.0.id, &page)
            .await
            .map_err(graphql_error)?;
        Ok(ingredients.into_iter().map(Ingredient).collect())
    }

    async fn saved_by(
        &self,
        ctx: &Context<'_>,
        take: Option<i32>,
        from: Option<ID>,
        sort: Option<UserSort>,
    ) -> Result<Vec<User>> {
        let sort = sort.unwrap_or_default();
        let page = page(take, from.as_ref(), sort.field, sort.direction)?;
        let users = ctx
            .data::<Services>()?
            .recipes
            .saved_by(self.0.id, &page)
            .await
            .map_err(graphql_error)?;
        Ok(users.into_iter().map(User).collect())
    }

    async fn saved_count(&self, ctx: &Context<'_>) -> Result<i64> {
        ctx.data::<Services>()?
            .recipes
            .saved_count(self.0.id)
            .await
            .map_err(graphql_error)
    }
}

pub struct Step(pub StepModel);

#[Object]
impl Step {
    async fn id(&self) -> ID {
        id_of(self.0.id)
    }

    /// 1-based position within the recipe
    async fn position(&self) -> i32 {
        self.0.position
    }

    async fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    async fn content(&self) -> &str {
        &self.0.content
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn recipe(&self, ctx: &Context<'_>) -> Result<Recipe> {
        let recipe = ctx
            .data::<Services>()?
            .recipes
            .get_recipe(self.0.recipe_id)
            .await
            .map_err(graphql_error)?;
        Ok(Recipe(recipe))
    }
}

pub struct Ingredient(pub IngredientModel);

#[Object]
impl Ingredient {
    async fn id(&self) -> ID {
        id_of(self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn quantity(&self) -> &str {
        &self.0.quantity
    }

    async fn recipe(&self, ctx: &Context<'_>) -> Result<Recipe> {
        let recipe = ctx
            .data::<Services>()?
            .recipes
            .get_recipe(self.0.recipe_id)
            .await
            .map_err(graphql_error)?;
        Ok(Recipe(recipe))
    }
}

/// What the server knows about the caller's session
pub struct Session {
    pub user_id: Option<uuid::Uuid>,
}

#[Object]
impl Session {
    async fn user_id(&self) -> Option<ID> {
        self.user_id.map(id_of)
    }
}
