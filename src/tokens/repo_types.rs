use serde::Serialize;
use time::OffsetDateTime;

use crate::auth::UserId;

pub type TokenId = i64;
pub type SubmissionId = i64;

/// Collectible image token. Ownership lives in the ledger, not here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub id: TokenId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Title shown to users.
    pub note: String,
    /// https link to a jpg.
    pub url: String,
    /// Perceptual hash of the image.
    pub hash: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub id: SubmissionId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub author_id: UserId,
    pub token_id: TokenId,
    pub reviewed: bool,
}
