pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod fishing;
pub mod format;
pub mod ledger;
pub mod market;
pub mod state;
pub mod store;
pub mod tokens;

#[cfg(test)]
mod test_support;
