use std::collections::BTreeMap;

use serde_json::Value;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use super::error::{Result, StoreError};

/// One record of a table, keyed by header name.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    table: String,
    cells: BTreeMap<String, Value>,
}

impl Row {
    pub fn new(table: &str, headers: &[Value], values: &[Value]) -> Self {
        let cells = headers
            .iter()
            .enumerate()
            .filter_map(|(i, h)| {
                let name = h.as_str()?;
                let value = values.get(i).cloned().unwrap_or(Value::Null);
                Some((name.to_string(), value))
            })
            .collect();
        Self {
            table: table.to_string(),
            cells,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn cell(&self, column: &str) -> Result<&Value> {
        self.cells
            .get(column)
            .ok_or_else(|| StoreError::MissingColumn {
                table: self.table.clone(),
                column: column.to_string(),
            })
    }

    fn malformed(&self, column: &str, reason: impl Into<String>) -> StoreError {
        StoreError::Malformed {
            table: self.table.clone(),
            column: column.to_string(),
            reason: reason.into(),
        }
    }

    pub fn opt_int(&self, column: &str) -> Result<Option<i64>> {
        int_value(self.cell(column)?).map_err(|reason| self.malformed(column, reason))
    }

    pub fn int(&self, column: &str) -> Result<i64> {
        self.opt_int(column)?
            .ok_or_else(|| self.malformed(column, "missing value"))
    }

    pub fn float(&self, column: &str) -> Result<f64> {
        match self.cell(column)? {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| self.malformed(column, format!("expected number, got {n}"))),
            other => Err(self.malformed(column, format!("expected number, got {other}"))),
        }
    }

    pub fn text(&self, column: &str) -> Result<String> {
        match self.cell(column)? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(self.malformed(column, format!("expected text, got {other}"))),
        }
    }

    /// Null and missing flags read as `false`, as a blank spreadsheet cell would.
    pub fn flag(&self, column: &str) -> Result<bool> {
        match self.cell(column)? {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(*b),
            Value::Number(n) => Ok(n.as_i64().unwrap_or(0) != 0),
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" | "" => Ok(false),
                _ => Err(self.malformed(column, format!("expected flag, got {s:?}"))),
            },
            other => Err(self.malformed(column, format!("expected flag, got {other}"))),
        }
    }

    pub fn timestamp(&self, column: &str) -> Result<OffsetDateTime> {
        let raw = self.text(column)?;
        OffsetDateTime::parse(&raw, &Rfc3339)
            .map_err(|e| self.malformed(column, format!("bad timestamp {raw:?}: {e}")))
    }
}

pub fn timestamp_cell(ts: OffsetDateTime) -> Value {
    // Rfc3339 formatting only fails for offsets with seconds, which UTC never has.
    Value::String(ts.format(&Rfc3339).unwrap_or_else(|_| ts.to_string()))
}

pub fn opt_int_cell(v: Option<i64>) -> Value {
    v.map(Value::from).unwrap_or(Value::Null)
}

/// Integer cell: null, a whole number (`3` or `3.0`) or a numeric string.
pub(crate) fn int_value(value: &Value) -> std::result::Result<Option<i64>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| format!("expected integer, got {n}")),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| format!("expected integer, got {s:?}")),
        other => Err(format!("expected integer, got {other}")),
    }
}
