use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum FishingError {
    #[error("Location {0} does not exist.")]
    UnknownLocation(String),
    #[error("Location {0} is locked.")]
    LocationLocked(String),
    #[error("You caught {limit} fish today. Return tomorrow!")]
    DailyLimitReached { limit: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
}
