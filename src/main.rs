use anyhow::bail;
use lbc_exchange::{format::format_account_number, state::AppState};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "lbc_exchange=debug".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init()?;
    let report = state.db.audit();

    tracing::info!(
        path = %state.db.path().display(),
        users = report.users,
        tokens = report.tokens,
        transactions = report.transactions,
        listings = report.listings,
        total_supply = report.total_supply,
        for_sale = state.db.for_sale().len(),
        pending_submissions = state.db.pending_submissions().len(),
        "workbook audited"
    );
    for (rank, (user, balance)) in state.db.leaderboard().into_iter().take(10).enumerate() {
        tracing::info!(
            rank = rank + 1,
            account = %format_account_number(user.id),
            nickname = %user.nickname,
            balance,
            "leaderboard"
        );
    }

    for anomaly in &report.anomalies {
        tracing::warn!(
            tx_id = anomaly.transaction,
            token = anomaly.token,
            from = anomaly.from,
            expected = ?anomaly.expected_holder,
            "token moved by a non-holder"
        );
    }
    for mismatch in &report.mismatches {
        tracing::error!(%mismatch, "ledger mismatch");
    }

    if !report.is_clean() {
        bail!(
            "audit failed: {} anomalies, {} mismatches",
            report.anomalies.len(),
            report.mismatches.len()
        );
    }
    Ok(())
}
