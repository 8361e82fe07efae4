use rand::Rng;
use tracing::{info, instrument, warn};

use crate::{
    auth::{User, UserId, SYSTEM_USER_ID},
    db::Database,
    fishing::{
        dto::{Catch, CatchStats, CatchView},
        error::FishingError,
        location::Fishing,
        repo::NewCatch,
        species::FishSpecies,
    },
    market::Transfer,
};

/// Catches left for the angler today.
pub fn catches_remaining(db: &Database, fishing: &Fishing, angler: UserId) -> usize {
    let used = db.fished_on_day(angler, db.now());
    fishing.attempts_allowed().saturating_sub(used)
}

/// Draws a fish at `location`, records it and pays its value to the angler.
///
/// Nothing is written when the location is unknown or locked, or the daily
/// limit is already used up.
#[instrument(skip(db, fishing, angler, rng), fields(angler = angler.id))]
pub fn catch<R: Rng + ?Sized>(
    db: &mut Database,
    fishing: &Fishing,
    angler: &User,
    location: &str,
    rng: &mut R,
) -> Result<Catch, FishingError> {
    let spot = fishing
        .location(location)
        .ok_or_else(|| FishingError::UnknownLocation(location.to_string()))?;
    if !spot.unlocked {
        return Err(FishingError::LocationLocked(location.to_string()));
    }
    let limit = fishing.attempts_allowed();
    if db.fished_on_day(angler.id, db.now()) >= limit {
        warn!(limit, "daily catch limit reached");
        return Err(FishingError::DailyLimitReached { limit });
    }

    let fish = spot.drop_table.get_drop(rng);
    let recorded = db.write_fish_catch(NewCatch {
        species: fish.species.name,
        weight_lbs: fish.weight_lbs,
        length_in: fish.length_in,
        angler_id: angler.id,
        location_id: spot.key,
    })?;
    let reward = db.write_transaction(
        SYSTEM_USER_ID,
        angler.id,
        Transfer::Currency(fish.species.value_lbc),
    )?;
    info!(
        catch_id = recorded.id,
        species = fish.species.name,
        weight_lbs = fish.weight_lbs,
        lbc = fish.species.value_lbc,
        "fish caught"
    );
    Ok(Catch {
        fish: recorded,
        reward,
    })
}

pub fn species_stats(db: &Database, angler: UserId, species: &'static FishSpecies) -> CatchStats {
    let mut stats = CatchStats::empty(species);
    for c in db.catches_by(angler).filter(|c| c.species == species.name) {
        stats.record(c, species.value_lbc);
    }
    stats
}

/// Stats for every species, caught or not, in species order.
pub fn collection_log(db: &Database, fishing: &Fishing, angler: UserId) -> Vec<CatchStats> {
    fishing
        .species()
        .iter()
        .copied()
        .map(|s| species_stats(db, angler, s))
        .collect()
}

/// The angler's catches, newest first.
pub fn catch_history(db: &Database, fishing: &Fishing, angler: UserId) -> Vec<CatchView> {
    let mut catches: Vec<_> = db.catches_by(angler).collect();
    catches.reverse();
    catches
        .into_iter()
        .map(|c| CatchView::new(c, fishing.species_by_name(&c.species)))
        .collect()
}
