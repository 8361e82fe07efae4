use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("workbook not found: {path}")]
    MissingWorkbook { path: PathBuf },
    #[error("table `{table}` not found in workbook")]
    MissingTable { table: String },
    #[error("table `{table}` has no header row")]
    MissingHeader { table: String },
    #[error("table `{table}` has no column `{column}`")]
    MissingColumn { table: String, column: String },
    #[error("table `{table}` has no row with id {id}")]
    MissingRow { table: String, id: i64 },
    #[error("malformed value in `{table}`.`{column}`: {reason}")]
    Malformed {
        table: String,
        column: String,
        reason: String,
    },
    #[error("malformed row {id} in `{table}`: {reason}")]
    MalformedRow {
        table: String,
        id: i64,
        reason: String,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("workbook encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}
