use async_graphql::http::GraphiQLSource;
use axum::{
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue},
    response::{Html, IntoResponse, Response},
    Extension, Json,
};
use tracing::{debug, instrument, warn};

use crate::session::SessionContext;
use crate::shared::{AppError, AppState};

/// HTTP handler for GraphQL requests
///
/// POST / and POST /graphql
/// Runs the operation with the caller's session and forwards the headers
/// resolvers set (session cookies) onto the HTTP response.
#[instrument(name = "graphql", skip_all)]
pub async fn graphql_handler(
    State(state): State<AppState>,
    session: Option<Extension<SessionContext>>,
    Json(request): Json<async_graphql::Request>,
) -> Response {
    let session = session
        .map(|Extension(session)| session)
        .unwrap_or_default();
    debug!(user_id = ?session.session_user_id, "Executing GraphQL request");

    let response = state.schema.execute(request.data(session)).await;

    let mut headers = HeaderMap::new();
    for (name, value) in response.http_headers.iter() {
        match (
            HeaderName::from_bytes(name.as_str().as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => warn!(header = %name.as_str(), "Dropping invalid response header"),
        }
    }

    (headers, Json(response)).into_response()
}

/// GraphiQL explorer, only served outside production
///
/// GET /graphql
pub async fn graphiql(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    if state.config.is_production() {
        return Err(AppError::NotFound("Not found".to_string()));
    }
    Ok(Html(GraphiQLSource::build().endpoint("/graphql").finish()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, Environment};
    use crate::session::session_context;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        middleware,
        routing::post,
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt; // for `oneshot`

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/graphql", post(graphql_handler).get(graphiql))
            .layer(middleware::from_fn_with_state(state.clone(), session_context))
            .with_state(state)
    }

    fn graphql_request(query: &str, variables: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/graphql")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "query": query, "variables": variables }).to_string(),
            ))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_session_query() {
        let state = AppStateBuilder::new().build();

        let response = app(state)
            .oneshot(graphql_request("{ session { userId } }", json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let body = json_body(response).await;
        assert_eq!(body["data"]["session"]["userId"], Value::Null);
    }

    #[tokio::test]
    async fn test_error_record_for_missing_recipe() {
        let state = AppStateBuilder::new().build();
        let query = r#"
            query($id: ID!) {
                recipe(id: $id) {
                    __typename
                    ... on Error { code message }
                }
            }
        "#;

        let response = app(state)
            .oneshot(graphql_request(
                query,
                json!({ "id": uuid::Uuid::new_v4().to_string() }),
            ))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["data"]["recipe"]["__typename"], "Error");
        assert_eq!(body["data"]["recipe"]["code"], 404);
        assert_eq!(body["data"]["recipe"]["message"], "Recipe not found");
    }

    #[tokio::test]
    async fn test_logout_without_session_is_an_error() {
        let state = AppStateBuilder::new().build();

        let response = app(state)
            .oneshot(graphql_request("mutation { logoutUser }", json!({})))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["errors"][0]["message"], "Not logged in.");
        assert_eq!(body["errors"][0]["extensions"]["code"], 401);
    }

    #[tokio::test]
    async fn test_graphiql_hidden_in_production() {
        let development = AppStateBuilder::new().build();
        let response = app(development)
            .oneshot(Request::builder().uri("/graphql").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let production = AppStateBuilder::new()
            .with_config(AppConfig {
                environment: Environment::Production,
                ..AppConfig::default()
            })
            .build();
        let response = app(production)
            .oneshot(Request::builder().uri("/graphql").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
