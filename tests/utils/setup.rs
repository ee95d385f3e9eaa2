use axum::Router;
use std::sync::Arc;

use appetized::{
    build_router,
    recipe::InMemoryRecipeRepository,
    session::{SessionCookies, TokenIssuer},
    user::InMemoryUserRepository,
    verification::InMemoryVerificationRepository,
    AppConfig, AppState, InvalidationPolicy, SessionService,
};

use super::mocks::RecordingMailer;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// The full HTTP application over in-memory stores
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
}

pub struct TestAppBuilder {
    config: AppConfig,
    tokens: Option<TokenIssuer>,
}

#[allow(dead_code)]
impl TestAppBuilder {
    /// Email verification is off unless a test turns it on
    pub fn new() -> Self {
        Self {
            config: AppConfig {
                require_email_verification: false,
                ..AppConfig::default()
            },
            tokens: None,
        }
    }

    pub fn with_policy(mut self, policy: InvalidationPolicy) -> Self {
        self.config.invalidation_policy = policy;
        self
    }

    pub fn with_email_verification(mut self) -> Self {
        self.config.require_email_verification = true;
        self
    }

    /// Replaces the token issuer, e.g. to mint already-expired access tokens
    pub fn with_tokens(mut self, tokens: TokenIssuer) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn build(self) -> TestApp {
        let users = Arc::new(InMemoryUserRepository::new());
        let mailer = Arc::new(RecordingMailer::new());
        let tokens = self
            .tokens
            .unwrap_or_else(|| TokenIssuer::from_config(&self.config));
        let sessions = Arc::new(SessionService::with_parts(
            users.clone(),
            tokens,
            SessionCookies::new(self.config.environment),
            self.config.invalidation_policy,
        ));

        let state = AppState::with_session_service(
            self.config,
            users,
            Arc::new(InMemoryRecipeRepository::new()),
            Arc::new(InMemoryVerificationRepository::new()),
            mailer.clone(),
            sessions,
        );
        let router = build_router(state.clone()).expect("router should build");

        TestApp {
            router,
            state,
            mailer,
        }
    }
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
