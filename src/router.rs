use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::graphql::{graphiql, graphql_handler};
use crate::session::session_context;
use crate::shared::{AppError, AppState};
use crate::verification::verify_email;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the HTTP application around `state`.
///
/// Every route runs behind the session middleware, so handlers always find
/// a `SessionContext` in the request extensions.
pub fn build_router(state: AppState) -> Result<Router, AppError> {
    let origin = HeaderValue::from_str(&state.config.client_url).map_err(|_| {
        AppError::Config(format!("CLIENT_URL '{}' is not a valid origin", state.config.client_url))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let router = Router::new()
        .route("/", post(graphql_handler))
        .route("/graphql", post(graphql_handler).get(graphiql))
        .route("/verify/:token", get(verify_email))
        .route("/health", get(health))
        .layer(middleware::from_fn_with_state(state.clone(), session_context))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}
