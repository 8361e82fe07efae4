use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    auth::{repo_types::UserId, User},
    db::Database,
    market::TransactionView,
    tokens::TokenView,
};

/// Public part of the user.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: UserId,
    pub username: String,
    pub nickname: String,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            nickname: u.nickname.clone(),
        }
    }
}

/// A user with everything derived from the ledger.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub nickname: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub account_number: String,
    pub balance: i64,
    pub transactions: Vec<TransactionView>,
    pub tokens: Vec<TokenView>,
}

impl Database {
    pub fn user_profile(&self, id: UserId) -> Option<UserProfile> {
        let user = self.user(id)?;
        Some(UserProfile {
            id: user.id,
            username: user.username.clone(),
            nickname: user.nickname.clone(),
            created_at: user.created_at,
            account_number: crate::format::format_account_number(user.id),
            balance: self.balance(user.id),
            transactions: self
                .user_transactions(user.id)
                .into_iter()
                .filter_map(|t| self.transaction_view(t))
                .collect(),
            tokens: self.tokens_of(user.id).into_iter().map(TokenView::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn public_user_hides_password_hash() {
        let user = User {
            id: 3,
            username: "alice".into(),
            nickname: "Alice".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: datetime!(2024-01-01 00:00 UTC),
            admin: false,
        };
        let json = serde_json::to_string(&PublicUser::from(&user)).unwrap();
        assert!(json.contains("alice"));
        assert!(!json.contains("argon2"));

        let full = serde_json::to_string(&user).unwrap();
        assert!(!full.contains("argon2"));
    }
}
