use serde_json::{json, Value};

use crate::{
    auth::repo_types::{User, UserId, SYSTEM_USERNAME},
    db::Database,
    store::{self, timestamp_cell, Record, Row},
};

impl Record for User {
    const TABLE: &'static str = "users";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> store::Result<Self> {
        Ok(Self {
            id: row.int("id")?,
            username: row.text("username")?,
            nickname: row.text("nickname")?,
            password_hash: row.text("password")?,
            created_at: row.timestamp("created_at")?,
            admin: row.flag("admin")?,
        })
    }

    fn to_cells(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", json!(self.id)),
            ("username", json!(self.username)),
            ("nickname", json!(self.nickname)),
            ("password", json!(self.password_hash)),
            ("created_at", timestamp_cell(self.created_at)),
            ("admin", json!(self.admin)),
        ]
    }
}

impl Database {
    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Find a user by username.
    pub fn user_by_username(&self, username: &str) -> Option<&User> {
        self.users.values().find(|u| u.username == username)
    }

    pub fn user_by_nickname(&self, nickname: &str) -> Option<&User> {
        self.users.values().find(|u| u.nickname == nickname)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Usernames a viewer can send to: everyone but the system account and themselves.
    pub fn user_list(&self, viewer: &User) -> Vec<String> {
        self.users
            .values()
            .filter(|u| u.username != SYSTEM_USERNAME && u.username != viewer.username)
            .map(|u| u.username.clone())
            .collect()
    }

    /// Non-system users ordered by balance, richest first.
    pub fn leaderboard(&self) -> Vec<(&User, i64)> {
        let mut rows: Vec<(&User, i64)> = self
            .users
            .values()
            .filter(|u| !u.is_system())
            .map(|u| (u, self.balance(u.id)))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.id.cmp(&b.0.id)));
        rows
    }

    /// Create a new user with an already hashed password.
    pub fn write_user(
        &mut self,
        username: &str,
        nickname: &str,
        password_hash: &str,
        admin: bool,
    ) -> store::Result<User> {
        let user = User {
            id: self.next_id::<User>()?,
            username: username.to_string(),
            nickname: nickname.to_string(),
            password_hash: password_hash.to_string(),
            created_at: self.now(),
            admin,
        };
        self.append(&user)?;
        Ok(user)
    }

    pub fn update_user_password(&mut self, id: UserId, password_hash: &str) -> store::Result<()> {
        self.update_cell::<User>(id, "password", json!(password_hash))
    }
}

#[cfg(test)]
mod tests {
    use crate::{auth::SYSTEM_USERNAME, test_support::TestApp};

    #[test]
    fn user_list_skips_system_and_viewer() {
        let mut app = TestApp::new();
        let alice = app.user("alice");
        app.user("bob");
        app.user("carol");

        let names = app.state.db.user_list(&alice);
        assert_eq!(names, vec!["bob", "carol"]);
        assert!(!names.iter().any(|n| n == SYSTEM_USERNAME));
    }

    #[test]
    fn leaderboard_is_richest_first_without_system() {
        let mut app = TestApp::new();
        let alice = app.user("alice");
        let bob = app.user("bob");
        let carol = app.user("carol");
        app.mint(alice.id, 5);
        app.mint(bob.id, 40);
        app.mint(carol.id, 5);

        let board: Vec<_> = app
            .state
            .db
            .leaderboard()
            .into_iter()
            .map(|(u, balance)| (u.username.clone(), balance))
            .collect();
        // ties keep account order
        assert_eq!(
            board,
            vec![("bob".to_string(), 40), ("alice".to_string(), 5), ("carol".to_string(), 5)]
        );
    }
}
