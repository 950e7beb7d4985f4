use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{cache::MenuViews, config::AppConfig, scope::ScopeLocks};

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub views: MenuViews,
    pub locks: ScopeLocks,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(orm: DatabaseConnection, config: AppConfig) -> Self {
        Self {
            orm,
            views: MenuViews::new(config.view_cache_capacity),
            locks: ScopeLocks::new(),
            config: Arc::new(config),
        }
    }
}
