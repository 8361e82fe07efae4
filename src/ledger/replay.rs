//! Scan-based derivation over the full transaction log.
//!
//! These walk every transaction on each call and serve as the reference the
//! materialized [`Ledger`](super::Ledger) is audited against.

use std::collections::BTreeSet;

use crate::{
    auth::{UserId, SYSTEM_USER_ID},
    market::{Listing, Transaction, Transfer},
    tokens::TokenId,
};

pub fn balance_by_scan<'a>(transactions: impl IntoIterator<Item = &'a Transaction>, user: UserId) -> i64 {
    let mut balance = 0;
    for tx in transactions {
        let Transfer::Currency(amount) = tx.transfer else {
            continue;
        };
        if tx.to == user {
            balance += amount;
        }
        if tx.from == user {
            if tx.to == tx.from && user == SYSTEM_USER_ID {
                continue;
            }
            balance -= amount;
        }
    }
    balance
}

/// `to` of the last token transaction naming `token`.
pub fn owner_by_scan<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    token: TokenId,
) -> Option<UserId> {
    transactions
        .into_iter()
        .filter(|tx| tx.transfer == Transfer::Token(token))
        .last()
        .map(|tx| tx.to)
}

/// Set-membership walk: add on incoming, remove on outgoing, in log order.
///
/// A token sent to oneself is added and then removed, so it drops out of the
/// set even though `owner_by_scan` still names the sender. The audit reports
/// that disagreement.
pub fn tokens_by_scan<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    user: UserId,
) -> BTreeSet<TokenId> {
    let mut held = BTreeSet::new();
    for tx in transactions {
        let Transfer::Token(token) = tx.transfer else {
            continue;
        };
        if tx.to == user {
            held.insert(token);
        }
        if tx.from == user {
            held.remove(&token);
        }
    }
    held
}

/// Latest listing row for `token` decides whether it is for sale.
pub fn listed_price_by_scan<'a>(listings: impl IntoIterator<Item = &'a Listing>, token: TokenId) -> Option<i64> {
    listings
        .into_iter()
        .filter(|l| l.token_id == token)
        .last()
        .and_then(|l| l.amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use time::macros::datetime;

    fn tx(id: i64, from: UserId, to: UserId, transfer: Transfer) -> Transaction {
        Transaction {
            id,
            timestamp: datetime!(2024-05-01 09:30 UTC),
            from,
            to,
            transfer,
        }
    }

    fn sample_log() -> Vec<Transaction> {
        vec![
            tx(0, SYSTEM_USER_ID, 1, Transfer::Currency(50)),
            tx(1, SYSTEM_USER_ID, 2, Transfer::Currency(20)),
            tx(2, SYSTEM_USER_ID, 1, Transfer::Token(1)),
            tx(3, 1, 2, Transfer::Currency(15)),
            tx(4, 1, 2, Transfer::Token(1)),
            tx(5, SYSTEM_USER_ID, SYSTEM_USER_ID, Transfer::Currency(1000)),
            tx(6, SYSTEM_USER_ID, 2, Transfer::Token(2)),
            tx(7, 2, 3, Transfer::Token(1)),
            tx(8, 2, 2, Transfer::Currency(4)),
        ]
    }

    #[test]
    fn scan_and_materialized_ledger_agree() {
        let log = sample_log();
        let ledger = Ledger::replay(&log, std::iter::empty());
        for user in [SYSTEM_USER_ID, 1, 2, 3] {
            assert_eq!(ledger.balance(user), balance_by_scan(&log, user), "balance of {user}");
            let scanned: Vec<_> = tokens_by_scan(&log, user).into_iter().collect();
            assert_eq!(ledger.tokens_of(user), scanned, "tokens of {user}");
        }
        for token in [1, 2] {
            assert_eq!(ledger.owner(token), owner_by_scan(&log, token));
        }
    }

    #[test]
    fn token_sent_to_self_leaves_the_scanned_set() {
        let log = vec![
            tx(0, SYSTEM_USER_ID, 1, Transfer::Token(7)),
            tx(1, 1, 1, Transfer::Token(7)),
        ];
        assert!(tokens_by_scan(&log, 1).is_empty());
        assert_eq!(owner_by_scan(&log, 7), Some(1));
        let ledger = Ledger::replay(&log, std::iter::empty());
        assert_eq!(ledger.tokens_of(1), vec![7]);
    }

    #[test]
    fn scanned_balances_match_expected_values() {
        let log = sample_log();
        assert_eq!(balance_by_scan(&log, 1), 35);
        assert_eq!(balance_by_scan(&log, 2), 35);
        assert_eq!(balance_by_scan(&log, SYSTEM_USER_ID), 1000 - 70);
    }

    #[test]
    fn every_prefix_has_at_most_one_owner() {
        let log = sample_log();
        for end in 0..=log.len() {
            let prefix = &log[..end];
            for token in [1, 2] {
                let holders = [SYSTEM_USER_ID, 1, 2, 3]
                    .into_iter()
                    .filter(|u| tokens_by_scan(prefix, *u).contains(&token))
                    .count();
                assert!(holders <= 1, "token {token} has {holders} owners after {end} rows");
            }
        }
    }

    #[test]
    fn system_holdings_disjoint_from_users() {
        let log = sample_log();
        let system = tokens_by_scan(&log, SYSTEM_USER_ID);
        for user in [1, 2, 3] {
            assert!(system.is_disjoint(&tokens_by_scan(&log, user)));
        }
    }

    #[test]
    fn listing_scan_uses_latest_row() {
        let at = datetime!(2024-05-01 09:30 UTC);
        let listings = vec![
            Listing { id: 0, timestamp: at, seller_id: 1, token_id: 5, amount: Some(9) },
            Listing { id: 1, timestamp: at, seller_id: 1, token_id: 6, amount: Some(2) },
            Listing { id: 2, timestamp: at, seller_id: 0, token_id: 5, amount: None },
        ];
        assert_eq!(listed_price_by_scan(&listings, 5), None);
        assert_eq!(listed_price_by_scan(&listings, 6), Some(2));
        assert_eq!(listed_price_by_scan(&listings, 7), None);
    }
}
