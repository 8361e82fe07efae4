use serde::Serialize;
use time::OffsetDateTime;

use crate::auth::UserId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FishCatch {
    pub id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub species: String,
    pub weight_lbs: f64,
    pub length_in: f64,
    pub angler_id: UserId,
    pub location_id: String,
}
