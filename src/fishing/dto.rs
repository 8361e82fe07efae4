use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    fishing::{repo_types::FishCatch, species::FishSpecies},
    format::{format_date, format_fish_length, format_fish_weight},
    market::Transaction,
};

#[derive(Debug, Clone, Serialize)]
pub struct CatchView {
    pub id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub display_time: String,
    pub species: String,
    pub icon: Option<&'static str>,
    pub weight: String,
    pub length: String,
    pub location: String,
}

impl CatchView {
    pub fn new(catch: &FishCatch, species: Option<&'static FishSpecies>) -> Self {
        Self {
            id: catch.id,
            timestamp: catch.timestamp,
            display_time: format_date(catch.timestamp),
            species: catch.species.clone(),
            icon: species.map(|s| s.icon),
            weight: format_fish_weight(catch.weight_lbs),
            length: format_fish_length(catch.length_in),
            location: catch.location_id.clone(),
        }
    }
}

/// A recorded catch and the LBC paid out for it.
#[derive(Debug, Clone, Serialize)]
pub struct Catch {
    pub fish: FishCatch,
    pub reward: Transaction,
}

/// One angler's record for one species. Zeroed when never caught.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatchStats {
    pub species: &'static str,
    pub icon: &'static str,
    pub count: usize,
    pub heaviest_lbs: f64,
    pub longest_in: f64,
    pub total_weight_lbs: f64,
    pub lbc_earned: i64,
}

impl CatchStats {
    pub fn empty(species: &'static FishSpecies) -> Self {
        Self {
            species: species.name,
            icon: species.icon,
            count: 0,
            heaviest_lbs: 0.0,
            longest_in: 0.0,
            total_weight_lbs: 0.0,
            lbc_earned: 0,
        }
    }

    pub fn record(&mut self, catch: &FishCatch, value_lbc: i64) {
        self.count += 1;
        self.heaviest_lbs = self.heaviest_lbs.max(catch.weight_lbs);
        self.longest_in = self.longest_in.max(catch.length_in);
        self.total_weight_lbs += catch.weight_lbs;
        self.lbc_earned += value_lbc;
    }

    pub fn caught(&self) -> bool {
        self.count > 0
    }
}
