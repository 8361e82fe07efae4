use serde::Serialize;
use time::OffsetDateTime;

use crate::{auth::UserId, tokens::TokenId};

pub type TransactionId = i64;
pub type ListingId = i64;

/// What a transaction moves. A row carries exactly one of amount or token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum Transfer {
    Currency(i64),
    Token(TokenId),
}

/// Append-only ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub from: UserId,
    pub to: UserId,
    pub transfer: Transfer,
}

impl Transaction {
    pub fn amount(&self) -> Option<i64> {
        match self.transfer {
            Transfer::Currency(a) => Some(a),
            Transfer::Token(_) => None,
        }
    }

    pub fn token(&self) -> Option<TokenId> {
        match self.transfer {
            Transfer::Token(t) => Some(t),
            Transfer::Currency(_) => None,
        }
    }

    pub fn touches(&self, user: UserId) -> bool {
        self.from == user || self.to == user
    }
}

/// A listing row. `amount == None` delists the token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub id: ListingId,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub seller_id: UserId,
    pub token_id: TokenId,
    pub amount: Option<i64>,
}
