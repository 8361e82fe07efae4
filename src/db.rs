use std::{collections::BTreeMap, path::Path, sync::Arc};

use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::{
    auth::{User, UserId, SYSTEM_USERNAME, SYSTEM_USER_ID},
    clock::Clock,
    fishing::FishCatch,
    ledger::{replay, ActiveListing, CustodyAnomaly, Ledger},
    market::{Listing, Transaction},
    store::{self, Record, Schema, Workbook},
    tokens::{Submission, Token, TokenId},
};

pub const SCHEMA: Schema<'static> = &[
    ("users", &["id", "username", "nickname", "password", "created_at", "admin"]),
    ("tokens", &["id", "created_at", "note", "url", "hash", "disabled"]),
    ("transactions", &["id", "timestamp", "from", "to", "amount", "token"]),
    ("listings", &["id", "timestamp", "seller_id", "token_id", "amount"]),
    ("submissions", &["id", "created_at", "author_id", "token_id", "reviewed"]),
    (
        "fish_catches",
        &["id", "timestamp", "species", "weight_lbs", "length_in", "angler_id", "location_id"],
    ),
];

/// The loaded workbook plus everything derived from it.
///
/// Tables are re-read from disk after every write. Balances, custody and
/// listing state live in the [`Ledger`], which is replayed on open and then
/// updated per appended transaction or listing.
pub struct Database {
    workbook: Workbook,
    clock: Arc<dyn Clock>,
    pub(crate) users: BTreeMap<UserId, User>,
    pub(crate) tokens: BTreeMap<TokenId, Token>,
    pub(crate) transactions: BTreeMap<i64, Transaction>,
    pub(crate) listings: BTreeMap<i64, Listing>,
    pub(crate) submissions: BTreeMap<i64, Submission>,
    pub(crate) catches: BTreeMap<i64, FishCatch>,
    pub(crate) ledger: Ledger,
}

impl Database {
    #[instrument(skip(path, clock), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> store::Result<Self> {
        let workbook = Workbook::open_or_create(path.as_ref(), SCHEMA)?;
        let mut db = Self {
            workbook,
            clock,
            users: BTreeMap::new(),
            tokens: BTreeMap::new(),
            transactions: BTreeMap::new(),
            listings: BTreeMap::new(),
            submissions: BTreeMap::new(),
            catches: BTreeMap::new(),
            ledger: Ledger::default(),
        };
        db.reload()?;
        db.ensure_system_account()?;
        Ok(db)
    }

    /// Re-reads the file, reloads every table and replays the ledger from scratch.
    pub fn reload(&mut self) -> store::Result<()> {
        self.workbook.sync()?;
        self.load_tables()?;
        self.ledger = Ledger::replay(self.transactions.values(), self.listings.values());
        info!(
            users = self.users.len(),
            tokens = self.tokens.len(),
            transactions = self.transactions.len(),
            listings = self.listings.len(),
            "database loaded"
        );
        Ok(())
    }

    fn load_tables(&mut self) -> store::Result<()> {
        self.users = self.workbook.load()?;
        self.tokens = self.workbook.load()?;
        self.transactions = self.workbook.load()?;
        self.listings = self.workbook.load()?;
        self.submissions = self.workbook.load()?;
        self.catches = self.workbook.load()?;
        Ok(())
    }

    fn ensure_system_account(&mut self) -> store::Result<()> {
        if self.users.contains_key(&SYSTEM_USER_ID) {
            return Ok(());
        }
        let system = User {
            id: SYSTEM_USER_ID,
            username: SYSTEM_USERNAME.to_string(),
            nickname: "System".to_string(),
            password_hash: String::new(),
            created_at: self.now(),
            admin: false,
        };
        self.append(&system)?;
        info!("system account created");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        self.workbook.path()
    }

    pub(crate) fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub(crate) fn next_id<T: Record>(&self) -> store::Result<i64> {
        let max = self
            .workbook
            .rows(T::TABLE)?
            .iter()
            .map(|r| r.int("id"))
            .collect::<store::Result<Vec<_>>>()?
            .into_iter()
            .max();
        Ok(max.map_or(0, |m| m + 1))
    }

    /// Appends the record, persists, and reloads all tables.
    pub(crate) fn append<T: Record>(&mut self, record: &T) -> store::Result<()> {
        self.workbook.append(T::TABLE, record.to_cells())?;
        self.load_tables()
    }

    pub(crate) fn update_cell<T: Record>(&mut self, id: i64, column: &str, value: Value) -> store::Result<()> {
        self.workbook.update_cell(T::TABLE, id, column, value)?;
        self.load_tables()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn balance(&self, user: UserId) -> i64 {
        self.ledger.balance(user)
    }

    pub fn owner_of(&self, token: TokenId) -> Option<&User> {
        self.ledger.owner(token).and_then(|id| self.users.get(&id))
    }

    pub fn tokens_of(&self, user: UserId) -> Vec<&Token> {
        self.ledger
            .tokens_of(user)
            .into_iter()
            .filter_map(|id| self.tokens.get(&id))
            .collect()
    }

    pub fn listing_of(&self, token: TokenId) -> Option<ActiveListing> {
        self.ledger.listing(token)
    }

    /// Tokens on the market, newest listing first.
    pub fn for_sale(&self) -> Vec<(&Token, ActiveListing)> {
        self.ledger
            .for_sale()
            .into_iter()
            .filter_map(|(id, listing)| self.tokens.get(&id).map(|t| (t, listing)))
            .collect()
    }

    /// Cross-checks the materialized ledger against full-log scans.
    pub fn audit(&self) -> AuditReport {
        let mut mismatches = Vec::new();
        for user in self.users.values() {
            let scanned = replay::balance_by_scan(self.transactions.values(), user.id);
            let held = self.ledger.balance(user.id);
            if scanned != held {
                mismatches.push(format!(
                    "balance of {} is {held} but the log sums to {scanned}",
                    user.username
                ));
            }
            let scanned_tokens: Vec<_> = replay::tokens_by_scan(self.transactions.values(), user.id)
                .into_iter()
                .collect();
            let held_tokens = self.ledger.tokens_of(user.id);
            if scanned_tokens != held_tokens {
                mismatches.push(format!(
                    "{} holds tokens {held_tokens:?} but the log walk gives {scanned_tokens:?}",
                    user.username
                ));
            }
            if !user.is_system() && held < 0 {
                mismatches.push(format!("{} has a negative balance of {held}", user.username));
            }
        }
        for token in self.tokens.keys() {
            let scanned = replay::owner_by_scan(self.transactions.values(), *token);
            if scanned != self.ledger.owner(*token) {
                mismatches.push(format!(
                    "token {token} is held by {:?} but the log ends at {scanned:?}",
                    self.ledger.owner(*token)
                ));
            }
            let listed = replay::listed_price_by_scan(self.listings.values(), *token);
            if listed != self.ledger.listing(*token).map(|l| l.price) {
                mismatches.push(format!("token {token} listing state disagrees with the log"));
            }
        }
        AuditReport {
            users: self.users.len(),
            tokens: self.tokens.len(),
            transactions: self.transactions.len(),
            listings: self.listings.len(),
            total_supply: self.ledger.total_supply(),
            anomalies: self.ledger.anomalies().to_vec(),
            mismatches,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub users: usize,
    pub tokens: usize,
    pub transactions: usize,
    pub listings: usize,
    pub total_supply: i64,
    pub anomalies: Vec<CustodyAnomaly>,
    pub mismatches: Vec<String>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty() && self.mismatches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::FixedClock, market::Transfer};
    use time::macros::datetime;

    fn open(dir: &tempfile::TempDir) -> Database {
        let clock = Arc::new(FixedClock::new(datetime!(2024-04-01 15:00 UTC)));
        Database::open(dir.path().join("db.json"), clock).expect("open database")
    }

    #[test]
    fn open_seeds_system_account_once() {
        let dir = tempfile::tempdir().unwrap();
        let db = open(&dir);
        assert_eq!(db.user(SYSTEM_USER_ID).map(|u| u.username.as_str()), Some("system"));
        drop(db);
        let db = open(&dir);
        assert_eq!(db.users().count(), 1);
    }

    #[test]
    fn next_id_is_max_plus_one() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = open(&dir);
        assert_eq!(db.next_id::<Transaction>().unwrap(), 0);
        db.write_transaction(SYSTEM_USER_ID, SYSTEM_USER_ID, Transfer::Currency(1)).unwrap();
        db.write_transaction(SYSTEM_USER_ID, SYSTEM_USER_ID, Transfer::Currency(1)).unwrap();
        assert_eq!(db.next_id::<Transaction>().unwrap(), 2);
        assert_eq!(db.next_id::<User>().unwrap(), 1);
    }

    #[test]
    fn writes_survive_reopen_and_replay_matches() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = open(&dir);
        let alice = db.write_user("alice", "Alice", "hash", false).unwrap();
        let token = db.write_token("Sunset", "https://img.example/a.jpg", "abc", false).unwrap();
        db.write_transaction(SYSTEM_USER_ID, alice.id, Transfer::Currency(12)).unwrap();
        db.write_transaction(SYSTEM_USER_ID, alice.id, Transfer::Token(token.id)).unwrap();
        db.write_listing(alice.id, token.id, Some(4)).unwrap();
        let before = (db.balance(alice.id), db.ledger().owner(token.id), db.listing_of(token.id));
        drop(db);

        let db = open(&dir);
        let after = (db.balance(alice.id), db.ledger().owner(token.id), db.listing_of(token.id));
        assert_eq!(before, after);
        assert_eq!(after.0, 12);
        assert_eq!(after.1, Some(alice.id));
        assert!(db.audit().is_clean());
    }

    #[test]
    fn malformed_transaction_row_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        {
            let mut book = Workbook::create(&path, SCHEMA).unwrap();
            book.append(
                "transactions",
                vec![
                    ("id", Value::from(0)),
                    ("timestamp", Value::from("2024-01-01T00:00:00Z")),
                    ("from", Value::from(0)),
                    ("to", Value::from(1)),
                ],
            )
            .unwrap();
        }
        let clock = Arc::new(FixedClock::new(datetime!(2024-04-01 15:00 UTC)));
        let err = Database::open(&path, clock).err().expect("load should fail");
        assert!(matches!(err, store::StoreError::MalformedRow { .. }));
    }

    #[test]
    fn failed_write_reaches_neither_log_nor_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let mut db = open(&dir);
        let alice = db.write_user("alice", "Alice", "hash", false).unwrap();

        let saved = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        assert!(db
            .write_transaction(SYSTEM_USER_ID, alice.id, Transfer::Currency(50))
            .is_err());
        std::fs::remove_dir(&path).unwrap();
        std::fs::write(&path, saved).unwrap();

        db.write_transaction(SYSTEM_USER_ID, alice.id, Transfer::Currency(1)).unwrap();
        assert_eq!(db.balance(alice.id), 1);
        assert_eq!(db.transaction_list().len(), 1);
        assert!(db.audit().is_clean(), "{:?}", db.audit());
        drop(db);
        assert_eq!(open(&dir).balance(alice.id), 1);
    }

    #[test]
    fn audit_reports_token_sent_to_self() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = open(&dir);
        let carol = db.write_user("carol", "Carol", "hash", false).unwrap();
        let token = db.write_token("Moon", "https://img.example/m.jpg", "m", false).unwrap();
        db.write_transaction(SYSTEM_USER_ID, carol.id, Transfer::Token(token.id)).unwrap();
        db.write_transaction(carol.id, carol.id, Transfer::Token(token.id)).unwrap();

        assert_eq!(db.ledger().owner(token.id), Some(carol.id));
        let report = db.audit();
        assert_eq!(report.mismatches.len(), 1);
        assert!(report.mismatches[0].contains("carol holds tokens"));
    }

    #[test]
    fn audit_flags_tampered_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = open(&dir);
        let bob = db.write_user("bob", "Bob", "hash", false).unwrap();
        db.write_transaction(bob.id, SYSTEM_USER_ID, Transfer::Currency(3)).unwrap();
        let report = db.audit();
        assert_eq!(report.mismatches.len(), 1);
        assert!(report.mismatches[0].contains("negative"));
        assert!(!report.is_clean());
    }
}
