use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::collections::HashSet;
use tracing::warn;

use super::types::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME};
use crate::config::Environment;

/// Builds the session cookies with the attributes for the deployment
#[derive(Debug, Clone)]
pub struct SessionCookies {
    same_site: SameSite,
}

impl SessionCookies {
    pub fn new(environment: Environment) -> Self {
        let same_site = match environment {
            Environment::Production => SameSite::Lax,
            Environment::Development => SameSite::None,
        };
        Self { same_site }
    }

    fn base(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(true)
            .same_site(self.same_site)
            .build()
    }

    /// Without `max_age` the cookie lives until the browser session ends
    fn session_cookie(
        &self,
        name: &'static str,
        token: String,
        max_age: Option<chrono::Duration>,
    ) -> Cookie<'static> {
        let mut cookie = self.base(name, token);
        if let Some(max_age) = max_age {
            cookie.set_max_age(time::Duration::seconds(max_age.num_seconds()));
        }
        cookie
    }

    pub fn access(&self, token: String, max_age: Option<chrono::Duration>) -> Cookie<'static> {
        self.session_cookie(ACCESS_COOKIE_NAME, token, max_age)
    }

    pub fn refresh(&self, token: String, max_age: Option<chrono::Duration>) -> Cookie<'static> {
        self.session_cookie(REFRESH_COOKIE_NAME, token, max_age)
    }

    pub fn removal(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = self.base(name, String::new());
        cookie.make_removal();
        cookie
    }

    pub fn clear_all(&self) -> Vec<Cookie<'static>> {
        vec![
            self.removal(ACCESS_COOKIE_NAME),
            self.removal(REFRESH_COOKIE_NAME),
        ]
    }
}

/// Raw access and refresh tokens from the request's Cookie header
pub fn read_session_cookies(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let jar = CookieJar::from_headers(headers);
    let value = |name: &str| {
        jar.get(name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    };
    (value(ACCESS_COOKIE_NAME), value(REFRESH_COOKIE_NAME))
}

/// Appends `Set-Cookie` headers, skipping cookies the response already sets
pub fn apply_cookies(headers: &mut HeaderMap, cookies: &[Cookie<'static>]) {
    let already_set: HashSet<String> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| Cookie::parse(value.to_string()).ok())
        .map(|cookie| cookie.name().to_string())
        .collect();

    for cookie in cookies {
        if already_set.contains(cookie.name()) {
            continue;
        }
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(e) => warn!(cookie = %cookie.name(), error = %e, "Cookie is not a valid header value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    #[test]
    fn test_access_cookie_attributes() {
        let cookies = SessionCookies::new(Environment::Production);
        let cookie = cookies.access("token".to_string(), Some(chrono::Duration::hours(1)));

        assert_eq!(cookie.name(), ACCESS_COOKIE_NAME);
        assert_eq!(cookie.value(), "token");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(1)));
    }

    #[test]
    fn test_development_cookies_allow_cross_site() {
        let cookies = SessionCookies::new(Environment::Development);
        let cookie = cookies.refresh("token".to_string(), None);

        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.max_age(), None);
    }

    #[test]
    fn test_removal_cookies_expire_immediately() {
        let cookies = SessionCookies::new(Environment::Production).clear_all();

        assert_eq!(cookies.len(), 2);
        for cookie in cookies {
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        }
    }

    #[test]
    fn test_read_session_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("accessToken=abc; other=1; refreshToken=def"),
        );

        let (access, refresh) = read_session_cookies(&headers);
        assert_eq!(access.as_deref(), Some("abc"));
        assert_eq!(refresh.as_deref(), Some("def"));
    }

    #[test]
    fn test_read_session_cookies_missing() {
        let (access, refresh) = read_session_cookies(&HeaderMap::new());
        assert!(access.is_none());
        assert!(refresh.is_none());
    }

    #[test]
    fn test_apply_cookies_keeps_existing_decisions() {
        let cookies = SessionCookies::new(Environment::Production);
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_str(&cookies.removal(ACCESS_COOKIE_NAME).to_string()).unwrap(),
        );

        apply_cookies(
            &mut headers,
            &[
                cookies.access("reissued".to_string(), None),
                cookies.refresh("kept".to_string(), None),
            ],
        );

        let values: Vec<&str> = headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(values.len(), 2);
        assert!(!values.iter().any(|v| v.contains("reissued")));
        assert!(values.iter().any(|v| v.starts_with("refreshToken=kept")));
    }
}
