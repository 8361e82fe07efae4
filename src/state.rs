use std::sync::Arc;

use anyhow::Context;
use time::Duration;

use crate::{
    auth::{sessions::SessionStore, User},
    clock::{Clock, SystemClock},
    config::AppConfig,
    db::Database,
    fishing::Fishing,
};

/// Everything a request needs, passed by reference into services.
pub struct AppState {
    pub db: Database,
    pub sessions: SessionStore,
    pub fishing: Fishing,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        Self::from_config(config, Arc::new(SystemClock))
    }

    pub fn from_config(config: Arc<AppConfig>, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let db = Database::open(&config.workbook_path, clock).with_context(|| {
            format!("open workbook {}", config.workbook_path.display())
        })?;
        Ok(Self::from_parts(db, config, Fishing::standard()))
    }

    pub fn from_parts(db: Database, config: Arc<AppConfig>, fishing: Fishing) -> Self {
        let sessions = SessionStore::new(Duration::days(config.session.ttl_days));
        Self {
            db,
            sessions,
            fishing,
            config,
        }
    }

    /// Resolves a session token to its user, if the session is live.
    pub fn authenticate(&self, token: &str) -> Option<&User> {
        let now = self.db.clock().now();
        let username = self.sessions.check(token, now)?;
        self.db.user_by_username(username)
    }
}
