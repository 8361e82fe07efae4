use std::sync::Arc;

use lbc_exchange::{
    auth::{services::create_account, SYSTEM_USER_ID},
    clock::{Clock, FixedClock},
    config::AppConfig,
    db::Database,
    fishing::{services::catch, FishingError},
    ledger::replay,
    market::services::{buy, list, send_lbc},
    state::AppState,
    tokens::services::{approve, submit_token},
};
use rand::{rngs::StdRng, SeedableRng};
use tempfile::TempDir;
use time::{macros::datetime, Duration};

fn app(dir: &TempDir, clock: &Arc<FixedClock>) -> AppState {
    let config = AppConfig {
        workbook_path: dir.path().join("db.json"),
        ..AppConfig::default()
    };
    AppState::from_config(Arc::new(config), clock.clone() as Arc<dyn Clock>).unwrap()
}

fn assert_ledger_matches_log(db: &Database) {
    let txs: Vec<_> = db.transaction_list().into_iter().rev().cloned().collect();
    for user in db.users() {
        assert_eq!(db.balance(user.id), replay::balance_by_scan(&txs, user.id));
    }
    let system_tokens = replay::tokens_by_scan(&txs, SYSTEM_USER_ID);
    for user in db.users().filter(|u| !u.is_system()) {
        let held = replay::tokens_by_scan(&txs, user.id);
        assert!(held.is_disjoint(&system_tokens));
    }
    assert!(db.audit().is_clean(), "{:?}", db.audit());
}

#[test]
fn submission_to_sale_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(FixedClock::new(datetime!(2024-05-15 16:00 UTC)));
    let mut state = app(&dir, &clock);

    let (alice, _) = create_account(&mut state, "alice", "Alice", "correct horse").unwrap();
    let (bob, session) = create_account(&mut state, "bob", "Bob", "battery staple").unwrap();
    let admin = state.db.write_user("root", "Root", "", true).unwrap();
    assert_eq!(state.authenticate(&session.token).map(|u| u.id), Some(bob.id));

    let (token, submission) = submit_token(
        &mut state.db,
        &alice,
        "Harbor at Dusk",
        "https://img.example.com/harbor.jpeg",
        "c3d4e5",
    )
    .unwrap();
    assert!(state.db.ledger().owner(token.id).is_none());
    approve(&mut state.db, &admin, submission.id).unwrap();
    assert_eq!(state.db.ledger().owner(token.id), Some(alice.id));

    state
        .db
        .write_transaction(SYSTEM_USER_ID, bob.id, lbc_exchange::market::Transfer::Currency(30))
        .unwrap();
    list(&mut state.db, &state.config.market, &alice, token.id, 10).unwrap();
    assert_eq!(state.db.market().len(), 1);
    buy(&mut state.db, &bob, token.id).unwrap();

    assert_eq!(state.db.ledger().owner(token.id), Some(bob.id));
    assert_eq!(state.db.balance(alice.id), 10);
    assert_eq!(state.db.balance(bob.id), 20);
    assert!(state.db.listing_of(token.id).is_none());

    send_lbc(&mut state.db, &bob, "alice", 5).unwrap();
    assert_ledger_matches_log(&state.db);

    let profile = state.db.user_profile(bob.id).unwrap();
    assert_eq!(profile.balance, 15);
    assert_eq!(profile.tokens.len(), 1);
    assert_eq!(profile.transactions[0].user_to_username, "alice");
    assert_eq!(
        state.db.token_transactions(token.id).len(),
        2,
        "mint plus sale"
    );

    drop(state);
    let reopened = app(&dir, &clock);
    assert_eq!(reopened.db.balance(bob.id), 15);
    assert_eq!(reopened.db.ledger().owner(token.id), Some(bob.id));
    assert_eq!(reopened.db.users().filter(|u| u.is_system()).count(), 1);
    assert_ledger_matches_log(&reopened.db);
}

#[test]
fn daily_fishing_limit_follows_eastern_calendar() {
    let dir = tempfile::tempdir().unwrap();
    // 11pm in New York, already the next day in UTC
    let clock = Arc::new(FixedClock::new(datetime!(2024-07-02 03:00 UTC)));
    let mut state = app(&dir, &clock);
    let angler = state.db.write_user("angler", "Angler", "", false).unwrap();
    let mut rng = StdRng::seed_from_u64(99);

    catch(&mut state.db, &state.fishing, &angler, "river", &mut rng).unwrap();

    clock.advance(Duration::minutes(30));
    let err = catch(&mut state.db, &state.fishing, &angler, "river", &mut rng).unwrap_err();
    assert!(matches!(err, FishingError::DailyLimitReached { limit: 1 }));
    assert_eq!(state.db.catches_by(angler.id).count(), 1);

    // 00:30 in New York
    clock.advance(Duration::hours(1));
    catch(&mut state.db, &state.fishing, &angler, "river", &mut rng).unwrap();
    assert_eq!(state.db.catches_by(angler.id).count(), 2);
    assert!(state.db.balance(angler.id) >= 2);
    assert_ledger_matches_log(&state.db);
}
