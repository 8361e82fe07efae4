use serde_json::{json, Value};
use time::OffsetDateTime;

use crate::{
    auth::UserId,
    db::Database,
    fishing::repo_types::FishCatch,
    format::eastern_date,
    store::{self, timestamp_cell, Record, Row},
};

impl Record for FishCatch {
    const TABLE: &'static str = "fish_catches";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> store::Result<Self> {
        Ok(Self {
            id: row.int("id")?,
            timestamp: row.timestamp("timestamp")?,
            species: row.text("species")?,
            weight_lbs: row.float("weight_lbs")?,
            length_in: row.float("length_in")?,
            angler_id: row.int("angler_id")?,
            location_id: row.text("location_id")?,
        })
    }

    fn to_cells(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", json!(self.id)),
            ("timestamp", timestamp_cell(self.timestamp)),
            ("species", json!(self.species)),
            ("weight_lbs", json!(self.weight_lbs)),
            ("length_in", json!(self.length_in)),
            ("angler_id", json!(self.angler_id)),
            ("location_id", json!(self.location_id)),
        ]
    }
}

/// Fields of a catch before it gets an id and timestamp.
#[derive(Debug, Clone)]
pub struct NewCatch<'a> {
    pub species: &'a str,
    pub weight_lbs: f64,
    pub length_in: f64,
    pub angler_id: UserId,
    pub location_id: &'a str,
}

impl Database {
    pub fn catches_by(&self, angler: UserId) -> impl Iterator<Item = &FishCatch> {
        self.catches.values().filter(move |c| c.angler_id == angler)
    }

    /// Catches whose US/Eastern calendar date matches `now`'s.
    pub fn fished_on_day(&self, angler: UserId, now: OffsetDateTime) -> usize {
        let today = eastern_date(now);
        self.catches_by(angler)
            .filter(|c| eastern_date(c.timestamp) == today)
            .count()
    }

    pub fn write_fish_catch(&mut self, new: NewCatch<'_>) -> store::Result<FishCatch> {
        let catch = FishCatch {
            id: self.next_id::<FishCatch>()?,
            timestamp: self.now(),
            species: new.species.to_string(),
            weight_lbs: new.weight_lbs,
            length_in: new.length_in,
            angler_id: new.angler_id,
            location_id: new.location_id.to_string(),
        };
        self.append(&catch)?;
        Ok(catch)
    }
}
