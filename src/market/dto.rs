use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    auth::{PublicUser, UserId},
    db::Database,
    format::format_date,
    market::repo_types::{Listing, Transaction, TransactionId},
    tokens::{TokenId, TokenView},
};

/// A ledger row joined with both parties and, for token transfers, the token.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    pub id: TransactionId,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub display_time: String,
    pub amount: Option<i64>,
    pub token: Option<TokenId>,
    pub user_from_id: UserId,
    pub user_from_username: String,
    pub user_from_nickname: String,
    pub user_to_id: UserId,
    pub user_to_username: String,
    pub user_to_nickname: String,
    pub token_url: Option<String>,
    pub token_note: Option<String>,
}

/// One token on the market.
#[derive(Debug, Clone, Serialize)]
pub struct MarketItem {
    pub token: TokenView,
    pub price: i64,
    pub seller: Option<PublicUser>,
}

/// The three writes of a purchase.
#[derive(Debug, Clone, Serialize)]
pub struct Purchase {
    pub payment: Transaction,
    pub delivery: Transaction,
    pub delisting: Listing,
}

impl Database {
    pub fn transaction_view(&self, tx: &Transaction) -> Option<TransactionView> {
        let from = self.user(tx.from)?;
        let to = self.user(tx.to)?;
        let token = tx.token().and_then(|id| self.token(id));
        Some(TransactionView {
            id: tx.id,
            timestamp: tx.timestamp,
            display_time: format_date(tx.timestamp),
            amount: tx.amount(),
            token: tx.token(),
            user_from_id: from.id,
            user_from_username: from.username.clone(),
            user_from_nickname: from.nickname.clone(),
            user_to_id: to.id,
            user_to_username: to.username.clone(),
            user_to_nickname: to.nickname.clone(),
            token_url: token.map(|t| t.url.clone()),
            token_note: token.map(|t| t.note.clone()),
        })
    }

    /// Listed tokens, newest listing first.
    pub fn market(&self) -> Vec<MarketItem> {
        self.for_sale()
            .into_iter()
            .map(|(token, listing)| MarketItem {
                token: TokenView::from(token),
                price: listing.price,
                seller: self.owner_of(token.id).map(PublicUser::from),
            })
            .collect()
    }
}
