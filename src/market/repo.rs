use serde_json::{json, Value};

use crate::{
    auth::UserId,
    db::Database,
    market::repo_types::{Listing, Transaction, Transfer},
    store::{self, opt_int_cell, timestamp_cell, Record, Row, StoreError},
    tokens::TokenId,
};

impl Record for Transaction {
    const TABLE: &'static str = "transactions";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> store::Result<Self> {
        let id = row.int("id")?;
        let transfer = match (row.opt_int("amount")?, row.opt_int("token")?) {
            (Some(amount), None) => Transfer::Currency(amount),
            (None, Some(token)) => Transfer::Token(token),
            (amount, token) => {
                return Err(StoreError::MalformedRow {
                    table: Self::TABLE.to_string(),
                    id,
                    reason: format!(
                        "exactly one of amount/token must be set (amount={amount:?}, token={token:?})"
                    ),
                })
            }
        };
        Ok(Self {
            id,
            timestamp: row.timestamp("timestamp")?,
            from: row.int("from")?,
            to: row.int("to")?,
            transfer,
        })
    }

    fn to_cells(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", json!(self.id)),
            ("timestamp", timestamp_cell(self.timestamp)),
            ("from", json!(self.from)),
            ("to", json!(self.to)),
            ("amount", opt_int_cell(self.amount())),
            ("token", opt_int_cell(self.token())),
        ]
    }
}

impl Record for Listing {
    const TABLE: &'static str = "listings";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> store::Result<Self> {
        Ok(Self {
            id: row.int("id")?,
            timestamp: row.timestamp("timestamp")?,
            seller_id: row.int("seller_id")?,
            token_id: row.int("token_id")?,
            amount: row.opt_int("amount")?,
        })
    }

    fn to_cells(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", json!(self.id)),
            ("timestamp", timestamp_cell(self.timestamp)),
            ("seller_id", json!(self.seller_id)),
            ("token_id", json!(self.token_id)),
            ("amount", opt_int_cell(self.amount)),
        ]
    }
}

impl Database {
    pub fn transaction(&self, id: i64) -> Option<&Transaction> {
        self.transactions.get(&id)
    }

    /// Full ledger, newest first.
    pub fn transaction_list(&self) -> Vec<&Transaction> {
        self.transactions.values().rev().collect()
    }

    /// Every transaction naming the user on either side, newest first.
    pub fn user_transactions(&self, user: UserId) -> Vec<&Transaction> {
        self.transactions
            .values()
            .rev()
            .filter(|t| t.touches(user))
            .collect()
    }

    /// Provenance of a token, newest first.
    pub fn token_transactions(&self, token: TokenId) -> Vec<&Transaction> {
        self.transactions
            .values()
            .rev()
            .filter(|t| t.token() == Some(token))
            .collect()
    }

    pub fn listings(&self) -> impl Iterator<Item = &Listing> {
        self.listings.values()
    }

    pub fn write_transaction(
        &mut self,
        from: UserId,
        to: UserId,
        transfer: Transfer,
    ) -> store::Result<Transaction> {
        let tx = Transaction {
            id: self.next_id::<Transaction>()?,
            timestamp: self.now(),
            from,
            to,
            transfer,
        };
        self.append(&tx)?;
        self.ledger.apply_transaction(&tx);
        Ok(tx)
    }

    pub fn write_listing(
        &mut self,
        seller_id: UserId,
        token_id: TokenId,
        amount: Option<i64>,
    ) -> store::Result<Listing> {
        let listing = Listing {
            id: self.next_id::<Listing>()?,
            timestamp: self.now(),
            seller_id,
            token_id,
            amount,
        };
        self.append(&listing)?;
        self.ledger.apply_listing(&listing);
        Ok(listing)
    }
}
