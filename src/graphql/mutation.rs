use async_graphql::{Context, Object, Result, ID};
use std::future::Future;
use tracing::debug;
use uuid::Uuid;

use super::{
    objects::Step,
    responses::{
        graphql_error, parse_id, respond, IngredientResponse, RecipeResponse, StepResponse,
        UserResponse,
    },
    session_of, set_cookies, Services,
};
use crate::recipe::types::{CreateRecipeInput, EditRecipeInput, IngredientInput, StepInput};
use crate::shared::AppError;
use crate::user::types::{CreateUserInput, EditUserInput};

/// Parses `id` and runs `op` with it
async fn by_id<T, Fut>(id: &ID, op: impl FnOnce(Uuid) -> Fut) -> Result<T, AppError>
where
    Fut: Future<Output = Result<T, AppError>>,
{
    op(parse_id(id)?).await
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_user(&self, ctx: &Context<'_>, user: CreateUserInput) -> Result<UserResponse> {
        let services = ctx.data::<Services>()?;
        respond(services.users.register(&session_of(ctx), user).await)
    }

    /// Checks the credentials and sets the session cookies
    async fn login_user(
        &self,
        ctx: &Context<'_>,
        username_or_email: String,
        password: String,
        #[graphql(default)] remember: bool,
    ) -> Result<UserResponse> {
        let services = ctx.data::<Services>()?;

        let user = match services
            .users
            .authenticate(&session_of(ctx), &username_or_email, &password)
            .await
        {
            Ok(user) => user,
            Err(e) => return respond(Err(e)),
        };

        let cookies = services
            .sessions
            .issue_tokens(user.id, user.session_marker, remember)
            .map_err(graphql_error)?;
        set_cookies(ctx, &cookies);

        respond(Ok(user))
    }

    /// Invalidates every token issued to the caller and clears the cookies
    async fn logout_user(&self, ctx: &Context<'_>) -> Result<bool> {
        let services = ctx.data::<Services>()?;
        let cookies = services
            .sessions
            .logout(&session_of(ctx))
            .await
            .map_err(graphql_error)?;
        set_cookies(ctx, &cookies);
        Ok(true)
    }

    async fn edit_user(&self, ctx: &Context<'_>, user: Option<EditUserInput>) -> Result<UserResponse> {
        let services = ctx.data::<Services>()?;
        respond(
            services
                .users
                .edit_profile(&session_of(ctx), user.unwrap_or_default())
                .await,
        )
    }

    async fn delete_user(&self, ctx: &Context<'_>) -> Result<bool> {
        let services = ctx.data::<Services>()?;
        services
            .users
            .delete_account(&session_of(ctx))
            .await
            .map_err(graphql_error)?;
        set_cookies(ctx, &services.sessions.clear_cookies());
        Ok(true)
    }

    async fn follow_user(&self, ctx: &Context<'_>, id: ID) -> Result<UserResponse> {
        let services = ctx.data::<Services>()?;
        let session = session_of(ctx);
        respond(by_id(&id, |id| services.users.follow(&session, id)).await)
    }

    async fn unfollow_user(&self, ctx: &Context<'_>, id: ID) -> Result<UserResponse> {
        let services = ctx.data::<Services>()?;
        let session = session_of(ctx);
        respond(by_id(&id, |id| services.users.unfollow(&session, id)).await)
    }

    async fn create_recipe(&self, ctx: &Context<'_>, recipe: CreateRecipeInput) -> Result<RecipeResponse> {
        let services = ctx.data::<Services>()?;
        respond(services.recipes.create_recipe(&session_of(ctx), recipe).await)
    }

    async fn edit_recipe(
        &self,
        ctx: &Context<'_>,
        id: ID,
        recipe: Option<EditRecipeInput>,
    ) -> Result<RecipeResponse> {
        let services = ctx.data::<Services>()?;
        let session = session_of(ctx);
        respond(
            by_id(&id, |id| {
                services
                    .recipes
                    .edit_recipe(&session, id, recipe.unwrap_or_default())
            })
            .await,
        )
    }

    async fn delete_recipe(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let services = ctx.data::<Services>()?;
        let session = session_of(ctx);
        by_id(&id, |id| services.recipes.delete_recipe(&session, id))
            .await
            .map_err(graphql_error)
    }

    async fn save_recipe(&self, ctx: &Context<'_>, id: ID) -> Result<RecipeResponse> {
        let services = ctx.data::<Services>()?;
        let session = session_of(ctx);
        respond(by_id(&id, |id| services.recipes.save_recipe(&session, id)).await)
    }

    async fn unsave_recipe(&self, ctx: &Context<'_>, id: ID) -> Result<RecipeResponse> {
        let services = ctx.data::<Services>()?;
        let session = session_of(ctx);
        respond(by_id(&id, |id| services.recipes.unsave_recipe(&session, id)).await)
    }

    async fn create_step(&self, ctx: &Context<'_>, recipe: ID, step: StepInput) -> Result<StepResponse> {
        let services = ctx.data::<Services>()?;
        let session = session_of(ctx);
        respond(by_id(&recipe, |id| services.recipes.create_step(&session, id, step)).await)
    }

    async fn edit_step(&self, ctx: &Context<'_>, id: ID, step: StepInput) -> Result<StepResponse> {
        let services = ctx.data::<Services>()?;
        let session = session_of(ctx);
        respond(by_id(&id, |id| services.recipes.edit_step(&session, id, step)).await)
    }

    async fn delete_step(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let services = ctx.data::<Services>()?;
        let session = session_of(ctx);
        by_id(&id, |id| services.recipes.delete_step(&session, id))
            .await
            .map_err(graphql_error)
    }

    /// Exchanges the positions of two steps of one recipe
    async fn swap_steps(&self, ctx: &Context<'_>, first: ID, second: ID) -> Result<Vec<Step>> {
        let services = ctx.data::<Services>()?;
        let first = parse_id(&first).map_err(graphql_error)?;
        let second = parse_id(&second).map_err(graphql_error)?;

        debug!(first = %first, second = %second, "Swapping steps");
        let steps = services
            .recipes
            .swap_steps(&session_of(ctx), first, second)
            .await
            .map_err(graphql_error)?;
        Ok(steps.into_iter().map(Step).collect())
    }

    async fn create_ingredient(
        &self,
        ctx: &Context<'_>,
        recipe: ID,
        ingredient: IngredientInput,
    ) -> Result<IngredientResponse> {
        let services = ctx.data::<Services>()?;
        let session = session_of(ctx);
        respond(
            by_id(&recipe, |id| {
                services.recipes.create_ingredient(&session, id, ingredient)
            })
            .await,
        )
    }

    async fn edit_ingredient(
        &self,
        ctx: &Context<'_>,
        id: ID,
        ingredient: IngredientInput,
    ) -> Result<IngredientResponse> {
        let services = ctx.data::<Services>()?;
        let session = session_of(ctx);
        respond(by_id(&id, |id| services.recipes.edit_ingredient(&session, id, ingredient)).await)
    }

    async fn delete_ingredient(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let services = ctx.data::<Services>()?;
        let session = session_of(ctx);
        by_id(&id, |id| services.recipes.delete_ingredient(&session, id))
            .await
            .map_err(graphql_error)
    }
}
