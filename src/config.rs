use strum_macros::{Display, EnumString};
use tracing::warn;

use crate::session::InvalidationPolicy;
use crate::shared::AppError;

const DEV_ACCESS_SECRET: &str = "appetized-dev-access-secret";
const DEV_REFRESH_SECRET: &str = "appetized-dev-refresh-secret";

/// Deployment environment, controls cookie SameSite and schema introspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    Production,
    #[default]
    Development,
}

/// Process configuration, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub invalidation_policy: InvalidationPolicy,
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub client_url: String,
    pub email_domain: String,
    pub require_email_verification: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            access_token_secret: DEV_ACCESS_SECRET.to_string(),
            refresh_token_secret: DEV_REFRESH_SECRET.to_string(),
            invalidation_policy: InvalidationPolicy::default(),
            database_url: None,
            bind_addr: "0.0.0.0:4000".to_string(),
            client_url: "http://localhost:3000".to_string(),
            email_domain: "appetized.local".to_string(),
            require_email_verification: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let environment = match lookup("APP_ENV") {
            Some(value) => value
                .parse()
                .map_err(|_| AppError::Config(format!("Unknown APP_ENV '{}'", value)))?,
            None => defaults.environment,
        };

        let invalidation_policy = match lookup("INVALIDATION_POLICY") {
            Some(value) => value.parse().map_err(|_| {
                AppError::Config(format!("Unknown INVALIDATION_POLICY '{}'", value))
            })?,
            None => defaults.invalidation_policy,
        };

        let access_token_secret =
            secret(&lookup, "ACCESS_TOKEN_SECRET", environment, DEV_ACCESS_SECRET)?;
        let refresh_token_secret =
            secret(&lookup, "REFRESH_TOKEN_SECRET", environment, DEV_REFRESH_SECRET)?;
        if access_token_secret == refresh_token_secret {
            return Err(AppError::Config(
                "ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ".to_string(),
            ));
        }

        let require_email_verification = match lookup("REQUIRE_EMAIL_VERIFICATION") {
            Some(value) => value.parse().map_err(|_| {
                AppError::Config(format!("REQUIRE_EMAIL_VERIFICATION must be true or false, got '{}'", value))
            })?,
            None => defaults.require_email_verification,
        };

        Ok(Self {
            environment,
            access_token_secret,
            refresh_token_secret,
            invalidation_policy,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            client_url: lookup("CLIENT_URL").unwrap_or(defaults.client_url),
            email_domain: lookup("EMAIL_DOMAIN").unwrap_or(defaults.email_domain),
            require_email_verification,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn secret(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    environment: Environment,
    dev_default: &str,
) -> Result<String, AppError> {
    match lookup(key).filter(|value| !value.is_empty()) {
        Some(value) => Ok(value),
        None if environment == Environment::Production => {
            Err(AppError::Config(format!("{} must be set in production", key)))
        }
        None => {
            warn!(key = %key, "Signing secret not set, using development default");
            Ok(dev_default.to_string())
        }
    }
}
