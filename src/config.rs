use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    pub max_listing_amount: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub workbook_path: PathBuf,
    pub session: SessionConfig,
    pub market: MarketConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workbook_path: PathBuf::from("db.json"),
            session: SessionConfig { ttl_days: 30 },
            market: MarketConfig {
                max_listing_amount: 100_000_000,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let workbook_path = std::env::var("WORKBOOK_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.workbook_path);
        let session = SessionConfig {
            ttl_days: parse_var("SESSION_TTL_DAYS")?.unwrap_or(defaults.session.ttl_days),
        };
        let market = MarketConfig {
            max_listing_amount: parse_var("MAX_LISTING_AMOUNT")?
                .unwrap_or(defaults.market.max_listing_amount),
        };
        anyhow::ensure!(session.ttl_days > 0, "SESSION_TTL_DAYS must be positive");
        anyhow::ensure!(market.max_listing_amount >= 0, "MAX_LISTING_AMOUNT must not be negative");
        Ok(Self {
            workbook_path,
            session,
            market,
        })
    }
}

fn parse_var(name: &str) -> anyhow::Result<Option<i64>> {
    match std::env::var(name) {
        Ok(v) => v
            .trim()
            .parse::<i64>()
            .map(Some)
            .with_context(|| format!("{name} must be an integer, got {v:?}")),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_original_limits() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.session.ttl_days, 30);
        assert_eq!(cfg.market.max_listing_amount, 100_000_000);
        assert_eq!(cfg.workbook_path, PathBuf::from("db.json"));
    }

    #[test]
    fn parse_var_reports_garbage() {
        std::env::set_var("LBC_TEST_PARSE_VAR", "ten");
        let err = parse_var("LBC_TEST_PARSE_VAR").unwrap_err();
        assert!(err.to_string().contains("LBC_TEST_PARSE_VAR"));
        std::env::set_var("LBC_TEST_PARSE_VAR", " 12 ");
        assert_eq!(parse_var("LBC_TEST_PARSE_VAR").unwrap(), Some(12));
        std::env::remove_var("LBC_TEST_PARSE_VAR");
        assert_eq!(parse_var("LBC_TEST_PARSE_VAR").unwrap(), None);
    }
}
