pub mod dto;
mod error;
mod repo;
mod repo_types;
pub mod services;

pub use dto::{MarketItem, Purchase, TransactionView};
pub use error::MarketError;
pub use repo_types::{Listing, ListingId, Transaction, TransactionId, Transfer};
