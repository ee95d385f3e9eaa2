use async_graphql::{Context, Object, Result, ID};

use super::{
    objects::{page, Ingredient, Recipe, Session, Step, User},
    responses::{
        graphql_error, parse_id, respond, IngredientResponse, RecipeResponse, StepResponse,
        UserResponse,
    },
    session_of, Services,
};
use crate::recipe::types::{IngredientSort, RecipeSort, StepSort};
use crate::user::types::UserSort;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The session resolved from the request cookies
    async fn session(&self, ctx: &Context<'_>) -> Session {
        Session {
            user_id: session_of(ctx).session_user_id,
        }
    }

    /// A user by id or username; without either, the logged-in user
    async fn user(
        &self,
        ctx: &Context<'_>,
        id: Option<ID>,
        username: Option<String>,
    ) -> Result<UserResponse> {
        let services = ctx.data::<Services>()?;
        let result = match id.as_ref().map(parse_id).transpose() {
            Ok(id) => {
                services
                    .users
                    .lookup(&session_of(ctx), id, username.as_deref())
                    .await
            }
            Err(e) => Err(e),
        };
        respond(result)
    }

    async fn recipe(&self, ctx: &Context<'_>, id: ID) -> Result<RecipeResponse> {
        let services = ctx.data::<Services>()?;
        let result = match parse_id(&id) {
            Ok(id) => services.recipes.get_recipe(id).await,
            Err(e) => Err(e),
        };
        respond(result)
    }

    async fn step(&self, ctx: &Context<'_>, id: ID) -> Result<StepResponse> {
        let services = ctx.data::<Services>()?;
        let result = match parse_id(&id) {
            Ok(id) => services.recipes.get_step(id).await,
            Err(e) => Err(e),
        };
        respond(result)
    }

    async fn ingredient(&self, ctx: &Context<'_>, id: ID) -> Result<IngredientResponse> {
        let services = ctx.data::<Services>()?;
        let result = match parse_id(&id) {
            Ok(id) => services.recipes.get_ingredient(id).await,
            Err(e) => Err(e),
        };
        respond(result)
    }

    /// Users whose username or name contains `query`
    async fn users(
        &self,
        ctx: &Context<'_>,
        query: Option<String>,
        take: Option<i32>,
        from: Option<ID>,
        sort: Option<UserSort>,
    ) -> Result<Vec<User>> {
        let sort = sort.unwrap_or_default();
        let page = page(take, from.as_ref(), sort.field, sort.direction)?;
        let users = ctx
            .data::<Services>()?
            .users
            .search(query.as_deref(), &page)
            .await
            .map_err(graphql_error)?;
        Ok(users.into_iter().map(User).collect())
    }

    /// Recipes whose name, description, cuisine or category contains `query`
    async fn recipes(
        &self,
        ctx: &Context<'_>,
        query: Option<String>,
        take: Option<i32>,
        from: Option<ID>,
        sort: Option<RecipeSort>,
    ) -> Result<Vec<Recipe>> {
        let sort = sort.unwrap_or_default();
        let page = page(take, from.as_ref(), sort.field, sort.direction)?;
        let recipes = ctx
            .data::<Services>()?
            .recipes
            .search(query.as_deref(), &page)
            .await
            .map_err(graphql_error)?;
        Ok(recipes.into_iter().map(Recipe).collect())
    }

    /// Steps of any recipe whose name or content contains `query`
    async fn steps(
        &self,
        ctx: &Context<'_>,
        query: Option<String>,
        take: Option<i32>,
        from: Option<ID>,
        sort: Option<StepSort>,
    ) -> Result<Vec<Step>> {
        let sort = sort.unwrap_or_default();
        let page = page(take, from.as_ref(), sort.field, sort.direction)?;
        let steps = ctx
            .data::<Services>()?
            .recipes
            .search_steps(query.as_deref(), &page)
            .await
            .map_err(graphql_error)?;
        Ok(steps.into_iter().map(Step).collect())
    }

    /// Ingredients of any recipe whose name contains `query`
    async fn ingredients(
        &self,
        ctx: &Context<'_>,
        query: Option<String>,
        take: Option<i32>,
        from: Option<ID>,
        sort: Option<IngredientSort>,
    ) -> Result<Vec<Ingredient>> {
        let sort = sort.unwrap_or_default();
        let page = page(take, from.as_ref(), sort.field, sort.direction)?;
        let ingredients = ctx
            .data::<Services>()?
            .recipes
            .search_ingredients(query.as_deref(), &page)
            .await
            .map_err(graphql_error)?;
        Ok(ingredients.into_iter().map(Ingredient).collect())
    }

    /// Newest recipes from the people the caller follows
    async fn feed(&self, ctx: &Context<'_>, take: Option<i32>, from: Option<ID>) -> Result<Vec<Recipe>> {
        let from = from
            .as_ref()
            .map(parse_id)
            .transpose()
            .map_err(graphql_error)?;
        let recipes = ctx
            .data::<Services>()?
            .recipes
            .feed(&session_of(ctx), take, from)
            .await
            .map_err(graphql_error)?;
        Ok(recipes.into_iter().map(Recipe).collect())
    }
}
