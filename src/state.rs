use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::{jwt::TokenService, password::CredentialHasher, rate_limit::LoginRateLimiter};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub tokens: TokenService,
    pub hasher: CredentialHasher,
    pub login_limiter: LoginRateLimiter,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = crate::db::connect(&config.database_url).await?;
        let hasher = CredentialHasher::new(config.password_pepper.as_bytes());
        Ok(Self::from_parts(db, config, hasher, LoginRateLimiter::default()))
    }

    pub fn from_parts(
        db: SqlitePool,
        config: AppConfig,
        hasher: CredentialHasher,
        login_limiter: LoginRateLimiter,
    ) -> Self {
        let tokens = TokenService::new(&config.jwt);
        Self {
            db,
            config: Arc::new(config),
            tokens,
            hasher,
            login_limiter,
        }
    }
}
