use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use axum_extra::extract::cookie::Cookie;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tower::ServiceExt; // for `oneshot`

use appetized::session::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME};

use super::setup::TestApp;

// ============================================================================
// Client Side
// ============================================================================

/// Cookie store of one client, updated from every response
#[derive(Debug, Clone, Default)]
pub struct Browser {
    cookies: BTreeMap<String, String>,
}

#[allow(dead_code)]
impl Browser {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client presenting exactly these cookies
    pub fn with_cookies(cookies: &[(&str, &str)]) -> Self {
        Self {
            cookies: cookies
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.cookie(ACCESS_COOKIE_NAME)
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.cookie(REFRESH_COOKIE_NAME)
    }

    fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Removal cookies delete the entry, everything else overwrites it
    fn store(&mut self, cookies: &[Cookie<'static>]) {
        for cookie in cookies {
            let removed = cookie.value().is_empty()
                || cookie.max_age().is_some_and(|age| age.is_zero());
            if removed {
                self.cookies.remove(cookie.name());
            } else {
                self.cookies
                    .insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }
    }
}

/// What came back from one GraphQL round trip
#[derive(Debug)]
pub struct GraphqlResponse {
    pub status: StatusCode,
    pub set_cookies: Vec<Cookie<'static>>,
    pub body: Value,
}

// ============================================================================
// Action Helpers
// ============================================================================

#[allow(dead_code)]
impl TestApp {
    /// POSTs a GraphQL operation with the browser's cookies and stores the
    /// cookies the server sets.
    pub async fn graphql(&self, browser: &mut Browser, query: &str, variables: Value) -> GraphqlResponse {
        let mut request = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookies) = browser.cookie_header() {
            request = request.header(header::COOKIE, cookies);
        }
        let request = request
            .body(Body::from(
                json!({ "query": query, "variables": variables }).to_string(),
            ))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let set_cookies: Vec<Cookie<'static>> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|value| Cookie::parse(value.to_str().unwrap().to_string()).unwrap())
            .collect();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();

        browser.store(&set_cookies);

        GraphqlResponse {
            status,
            set_cookies,
            body,
        }
    }

    /// GET on an arbitrary path, returning status and JSON body
    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    /// Registers `username` with `<username>@example.com` and "password1"
    pub async fn register(&self, browser: &mut Browser, username: &str) -> GraphqlResponse {
        let query = r#"
            mutation($user: CreateUserInput!) {
                createUser(user: $user) {
                    __typename
                    ... on User { id username }
                    ... on Error { code message }
                }
            }
        "#;
        self.graphql(
            browser,
            query,
            json!({
                "user": {
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "password1",
                }
            }),
        )
        .await
    }

    pub async fn login(&self, browser: &mut Browser, username: &str, remember: bool) -> GraphqlResponse {
        let query = r#"
            mutation($usernameOrEmail: String!, $password: String!, $remember: Boolean!) {
                loginUser(usernameOrEmail: $usernameOrEmail, password: $password, remember: $remember) {
                    __typename
                    ... on User { id username }
                    ... on Error { code message }
                }
            }
        "#;
        self.graphql(
            browser,
            query,
            json!({
                "usernameOrEmail": username,
                "password": "password1",
                "remember": remember,
            }),
        )
        .await
    }

    /// Registers and logs in a fresh user, returning its id
    pub async fn signed_in(&self, browser: &mut Browser, username: &str) -> String {
        let registered = self.register(browser, username).await;
        assert_eq!(registered.body["data"]["createUser"]["__typename"], "User");
        let login = self.login(browser, username, false).await;
        login.body["data"]["loginUser"]["id"]
            .as_str()
            .expect("login should return the user")
            .to_string()
    }

    pub async fn logout(&self, browser: &mut Browser) -> GraphqlResponse {
        self.graphql(browser, "mutation { logoutUser }", json!({})).await
    }

    /// The user id the server resolves from the browser's cookies
    pub async fn session_user_id(&self, browser: &mut Browser) -> (Option<String>, GraphqlResponse) {
        let response = self
            .graphql(browser, "{ session { userId } }", json!({}))
            .await;
        let user_id = response.body["data"]["session"]["userId"]
            .as_str()
            .map(str::to_string);
        (user_id, response)
    }
}
