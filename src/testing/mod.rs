//! In-process fixtures for driving the full router without Postgres.

use std::sync::Arc;

use axum::Router;

use crate::app::{app, AppState};
use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::memory::{MemoryCatalogStore, MemoryUserStore};

pub const TEST_SECRET: &str = "test-secret";

/// Router plus handles on the stores behind it.
pub struct TestContext {
    pub catalog: Arc<MemoryCatalogStore>,
    pub users: Arc<MemoryUserStore>,
    state: AppState,
}

impl TestContext {
    pub fn new() -> anyhow::Result<Self> {
        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;
        config.security.jwt_secret = TEST_SECRET.to_string();

        let catalog = Arc::new(MemoryCatalogStore::default());
        let users = Arc::new(MemoryUserStore::default());
        let tokens = TokenIssuer::from_config(&config.security)?;
        let state = AppState::new(config, catalog.clone(), users.clone(), tokens);

        Ok(Self { catalog, users, state })
    }

    /// A fresh router over the same stores. `oneshot` consumes it.
    pub fn app(&self) -> Router {
        app(self.state.clone())
    }

    pub fn token_for(&self, user_id: &str) -> anyhow::Result<String> {
        Ok(self.state.tokens.issue(user_id)?)
    }
}
