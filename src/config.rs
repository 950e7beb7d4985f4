use std::env;

use crate::cache;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// HS256 secret shared with the identity provider that issues tokens.
    pub jwt_secret: String,
    pub view_cache_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let view_cache_capacity = env::var("VIEW_CACHE_CAPACITY")
            .ok()
            .and_then(|c| c.parse::<usize>().ok())
            .unwrap_or(cache::DEFAULT_CAPACITY);
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            view_cache_capacity,
        })
    }
}
