//! GraphQL schema: objects, queries and mutations over the user, recipe and
//! session services.
//!
//! Resolvers read the caller's `SessionContext` from request data (inserted
//! by the HTTP handler) and write cookies through response headers, which
//! the handler copies onto the HTTP response.

use async_graphql::{Context, EmptySubscription, Schema};
use axum_extra::extract::cookie::Cookie;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::recipe::RecipeService;
use crate::session::{SessionContext, SessionService};
use crate::user::UserService;

pub use handlers::{graphiql, graphql_handler};
pub use mutation::MutationRoot;
pub use query::QueryRoot;

mod handlers;
mod mutation;
pub mod objects;
mod query;
pub mod responses;

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Services reachable from every resolver
#[derive(Clone)]
pub struct Services {
    pub users: Arc<UserService>,
    pub recipes: Arc<RecipeService>,
    pub sessions: Arc<SessionService>,
}

pub fn build_schema(services: Services, config: &AppConfig) -> AppSchema {
    let mut builder = Schema::build(QueryRoot, MutationRoot, EmptySubscription).data(services);
    if config.is_production() {
        builder = builder.disable_introspection();
    }
    builder.finish()
}

/// The caller's session, anonymous when the request carried none
pub(crate) fn session_of(ctx: &Context<'_>) -> SessionContext {
    ctx.data_opt::<SessionContext>().copied().unwrap_or_default()
}

pub(crate) fn set_cookies(ctx: &Context<'_>, cookies: &[Cookie<'static>]) {
    for cookie in cookies {
        ctx.append_http_header("set-cookie", cookie.to_string());
    }
}
