//! Flat workbook-backed row store.

mod error;
mod row;
mod workbook;

use serde_json::Value;

pub use error::{Result, StoreError};
pub use row::{opt_int_cell, timestamp_cell, Row};
pub use workbook::{Schema, Workbook};

/// A typed record living in one table of the workbook.
pub trait Record: Sized {
    const TABLE: &'static str;

    fn id(&self) -> i64;

    fn from_row(row: &Row) -> Result<Self>;

    /// `(column, value)` pairs; the workbook orders them by its header row.
    fn to_cells(&self) -> Vec<(&'static str, Value)>;
}
