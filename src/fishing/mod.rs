pub mod dto;
mod error;
mod location;
mod repo;
mod repo_types;
pub mod services;
pub mod species;

pub use dto::{Catch, CatchStats, CatchView};
pub use error::FishingError;
pub use location::{Fishing, Location};
pub use repo::NewCatch;
pub use repo_types::FishCatch;
pub use species::{DropTable, Fish, FishSpecies};
