//! Materialized balances, token custody and listing state.
//!
//! The ledger is rebuilt from the transaction and listing logs when the
//! database opens and is then updated one record at a time as rows are
//! appended. [`replay`] holds the scan-based derivation it must agree with.

pub mod replay;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use tracing::warn;

use crate::{
    auth::{UserId, SYSTEM_USER_ID},
    market::{Listing, ListingId, Transaction, TransactionId, Transfer},
    tokens::TokenId,
};

/// Where a token is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Custody {
    /// Created but never transferred (pending submission or denied).
    Unminted,
    Held {
        holder: UserId,
        since: TransactionId,
    },
}

/// A token transfer whose sender was not the holder at that point of the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustodyAnomaly {
    pub transaction: TransactionId,
    pub token: TokenId,
    pub expected_holder: Option<UserId>,
    pub from: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActiveListing {
    pub listing: ListingId,
    pub seller: UserId,
    pub price: i64,
}

#[derive(Debug, Default, Clone)]
pub struct Ledger {
    balances: HashMap<UserId, i64>,
    custody: HashMap<TokenId, Custody>,
    holdings: HashMap<UserId, BTreeSet<TokenId>>,
    listings: BTreeMap<TokenId, ActiveListing>,
    anomalies: Vec<CustodyAnomaly>,
}

impl Ledger {
    pub fn replay<'a>(
        transactions: impl IntoIterator<Item = &'a Transaction>,
        listings: impl IntoIterator<Item = &'a Listing>,
    ) -> Self {
        let mut ledger = Self::default();
        for tx in transactions {
            ledger.apply_transaction(tx);
        }
        for listing in listings {
            ledger.apply_listing(listing);
        }
        ledger
    }

    pub fn apply_transaction(&mut self, tx: &Transaction) {
        match tx.transfer {
            Transfer::Currency(amount) => {
                *self.balances.entry(tx.to).or_default() += amount;
                // The system account mints by paying itself.
                if !(tx.from == SYSTEM_USER_ID && tx.to == SYSTEM_USER_ID) {
                    *self.balances.entry(tx.from).or_default() -= amount;
                }
            }
            Transfer::Token(token) => self.move_token(tx, token),
        }
    }

    fn move_token(&mut self, tx: &Transaction, token: TokenId) {
        let previous = self.custody.get(&token).copied().unwrap_or(Custody::Unminted);
        let expected = match previous {
            Custody::Held { holder, .. } => Some(holder),
            Custody::Unminted => None,
        };
        let consistent = match expected {
            Some(holder) => holder == tx.from,
            None => tx.from == SYSTEM_USER_ID,
        };
        if !consistent {
            warn!(
                transaction = tx.id,
                token,
                from = tx.from,
                expected_holder = ?expected,
                "token transferred by a non-holder"
            );
            self.anomalies.push(CustodyAnomaly {
                transaction: tx.id,
                token,
                expected_holder: expected,
                from: tx.from,
            });
        }

        if let Some(holder) = expected {
            if let Some(set) = self.holdings.get_mut(&holder) {
                set.remove(&token);
            }
        }
        self.holdings.entry(tx.to).or_default().insert(token);
        self.custody.insert(
            token,
            Custody::Held {
                holder: tx.to,
                since: tx.id,
            },
        );
    }

    pub fn apply_listing(&mut self, listing: &Listing) {
        match listing.amount {
            Some(price) => {
                self.listings.insert(
                    listing.token_id,
                    ActiveListing {
                        listing: listing.id,
                        seller: listing.seller_id,
                        price,
                    },
                );
            }
            None => {
                self.listings.remove(&listing.token_id);
            }
        }
    }

    pub fn balance(&self, user: UserId) -> i64 {
        self.balances.get(&user).copied().unwrap_or(0)
    }

    pub fn custody(&self, token: TokenId) -> Custody {
        self.custody.get(&token).copied().unwrap_or(Custody::Unminted)
    }

    pub fn owner(&self, token: TokenId) -> Option<UserId> {
        match self.custody(token) {
            Custody::Held { holder, .. } => Some(holder),
            Custody::Unminted => None,
        }
    }

    /// Tokens currently held by `user`, ascending by id.
    pub fn tokens_of(&self, user: UserId) -> Vec<TokenId> {
        self.holdings
            .get(&user)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn owns(&self, user: UserId, token: TokenId) -> bool {
        self.owner(token) == Some(user)
    }

    pub fn listing(&self, token: TokenId) -> Option<ActiveListing> {
        self.listings.get(&token).copied()
    }

    pub fn is_listed(&self, token: TokenId) -> bool {
        self.listings.contains_key(&token)
    }

    /// Active listings, most recently listed first.
    pub fn for_sale(&self) -> Vec<(TokenId, ActiveListing)> {
        let mut out: Vec<_> = self.listings.iter().map(|(t, l)| (*t, *l)).collect();
        out.sort_by(|a, b| b.1.listing.cmp(&a.1.listing));
        out
    }

    pub fn anomalies(&self) -> &[CustodyAnomaly] {
        &self.anomalies
    }

    /// Sum of every balance, system included. Stays at zero unless the
    /// system account has minted to itself.
    pub fn total_supply(&self) -> i64 {
        self.balances.values().sum()
    }
}
