use db::DBService;
use sqlx::SqlitePool;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(db: DBService, config: ServerConfig) -> Self {
        Self { db, config }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
