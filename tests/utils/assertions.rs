//! Assertion helpers for GraphQL responses and session cookies
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::http::StatusCode;
use axum_extra::extract::cookie::Cookie;
use serde_json::Value;

use appetized::session::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME};

use super::actions::GraphqlResponse;

// ============================================================================
// Assertion Helpers
// ============================================================================

impl GraphqlResponse {
    pub fn cookie(&self, name: &str) -> Option<&Cookie<'static>> {
        self.set_cookies.iter().find(|cookie| cookie.name() == name)
    }

    pub fn data(&self, field: &str) -> &Value {
        &self.body["data"][field]
    }

    /// First GraphQL error message, if any
    pub fn error_message(&self) -> Option<&str> {
        self.body["errors"][0]["message"].as_str()
    }

    pub fn assert_ok(&self) -> &Self {
        assert_eq!(self.status, StatusCode::OK);
        assert!(
            self.body.get("errors").is_none(),
            "unexpected errors: {}",
            self.body["errors"]
        );
        self
    }

    pub fn assert_no_cookies(&self) -> &Self {
        assert!(
            self.set_cookies.is_empty(),
            "expected no Set-Cookie headers, got {:?}",
            self.set_cookies
        );
        self
    }

    /// Both session cookies set with a non-empty, HttpOnly value
    pub fn assert_sets_session_cookies(&self) -> &Self {
        for name in [ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME] {
            let cookie = self
                .cookie(name)
                .unwrap_or_else(|| panic!("{} should be set", name));
            assert!(!cookie.value().is_empty(), "{} should carry a token", name);
            assert_eq!(cookie.http_only(), Some(true));
        }
        self
    }

    /// Both session cookies replaced by removals
    pub fn assert_clears_session_cookies(&self) -> &Self {
        for name in [ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME] {
            let cookie = self
                .cookie(name)
                .unwrap_or_else(|| panic!("{} should be cleared", name));
            assert_eq!(cookie.value(), "", "{} should be emptied", name);
            assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        }
        self
    }

    /// The union field resolved to an `Error` record
    pub fn assert_error_record(&self, field: &str, code: i64, message: &str) -> &Self {
        let record = self.data(field);
        assert_eq!(record["__typename"], "Error", "{} was {}", field, record);
        assert_eq!(record["code"], code);
        assert_eq!(record["message"], message);
        self
    }
}
