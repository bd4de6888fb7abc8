use axum::Router;
use std::sync::Arc;

use latter::{
    challenge::repository::InMemoryChallengeRepository,
    notify::NotificationQueue,
    player::repository::InMemoryPlayerRepository,
    router,
    session::repository::InMemorySessionRepository,
    AppState, TokenConfig,
};

use super::mocks::MockMailer;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app: Router,
    pub mailer: MockMailer,
    /// Bearer token of the logged-in admin, set by `TestSetupBuilder::logged_in`
    pub token: Option<String>,
}

pub struct TestSetupBuilder {
    logged_in: bool,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self { logged_in: false }
    }

    /// Bootstraps the admin through `/setup` and logs in as them
    pub fn logged_in(mut self) -> Self {
        self.logged_in = true;
        self
    }

    pub async fn build(self) -> TestSetup {
        let mailer = MockMailer::new();
        let (notifications, _worker) = NotificationQueue::start(Arc::new(mailer.clone()));

        let players = Arc::new(InMemoryPlayerRepository::new());
        let challenges = Arc::new(InMemoryChallengeRepository::for_players(&players));
        let app_state = AppState::new(
            players,
            challenges,
            Arc::new(InMemorySessionRepository::new()),
            notifications,
            TokenConfig::with_secret("integration-secret", 1),
        );

        let mut setup = TestSetup {
            app: router(app_state),
            mailer,
            token: None,
        };

        if self.logged_in {
            setup.get("/setup").await;
            let token = setup.login("admin@example.org").await;
            setup.token = Some(token);
        }

        setup
    }
}
