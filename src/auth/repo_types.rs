use serde::Serialize;
use time::OffsetDateTime;

/// Reserved account that mints and absorbs currency and tokens.
pub const SYSTEM_USER_ID: UserId = 0;
pub const SYSTEM_USERNAME: &str = "system";

pub type UserId = i64;

/// User record in the workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    /// Unique, lower-cased.
    pub username: String,
    /// Unique display name.
    pub nickname: String,
    /// Argon2 PHC string; never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub admin: bool,
}

impl User {
    pub fn is_system(&self) -> bool {
        self.id == SYSTEM_USER_ID
    }
}
