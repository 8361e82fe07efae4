use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;
use time::macros::datetime;

use crate::{
    auth::{User, UserId, SYSTEM_USER_ID},
    clock::{Clock, FixedClock},
    config::AppConfig,
    market::Transfer,
    state::AppState,
    tokens::TokenId,
};

/// An app on a fresh workbook in a temp dir, with the clock pinned to a
/// Wednesday afternoon in New York.
pub struct TestApp {
    _dir: TempDir,
    pub state: AppState,
    pub clock: Arc<FixedClock>,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(FixedClock::new(datetime!(2024-03-06 17:00 UTC)));
        let config = AppConfig {
            workbook_path: dir.path().join("db.json"),
            ..AppConfig::default()
        };
        let state = AppState::from_config(Arc::new(config), clock.clone() as Arc<dyn Clock>).unwrap();
        Self {
            _dir: dir,
            state,
            clock,
        }
    }

    fn insert_user(&mut self, name: &str, admin: bool) -> User {
        let mut nickname = name.to_string();
        if let Some(first) = nickname.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        self.state
            .db
            .write_user(name, &nickname, "not-a-real-hash", admin)
            .unwrap()
    }

    pub fn user(&mut self, name: &str) -> User {
        self.insert_user(name, false)
    }

    pub fn admin(&mut self, name: &str) -> User {
        self.insert_user(name, true)
    }

    pub fn mint(&mut self, to: UserId, amount: i64) {
        self.state
            .db
            .write_transaction(SYSTEM_USER_ID, to, Transfer::Currency(amount))
            .unwrap();
    }

    /// An enabled token held by `owner`.
    pub fn mint_token(&mut self, owner: UserId, title: &str) -> TokenId {
        let n = self.state.db.tokens().count();
        let token = self
            .state
            .db
            .write_token(
                title,
                &format!("https://img.example.com/{n}.jpg"),
                &json!(n).to_string(),
                false,
            )
            .unwrap();
        self.state
            .db
            .write_transaction(SYSTEM_USER_ID, owner, Transfer::Token(token.id))
            .unwrap();
        token.id
    }
}
