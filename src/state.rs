use std::sync::Arc;

use chrono::Duration;
use sqlx::SqlitePool;

use crate::auth::jwt::TokenService;
use crate::config::Config;

/// Shared handles passed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(pool: SqlitePool, tokens: TokenService) -> Self {
        Self {
            pool,
            tokens: Arc::new(tokens),
        }
    }

    pub fn from_config(pool: SqlitePool, config: &Config) -> Self {
        let ttl = Duration::minutes(config.token_ttl_minutes);
        Self::new(pool, TokenService::new(&config.secret_key, ttl))
    }
}
