use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::{
    error::{Result, StoreError},
    row::{int_value, Row},
    Record,
};

/// Header row per table, used when a workbook is created from scratch.
pub type Schema<'a> = &'a [(&'a str, &'a [&'a str])];

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct WorkbookFile {
    sheets: BTreeMap<String, Vec<Vec<Value>>>,
}

impl WorkbookFile {
    fn sheet_mut(&mut self, table: &str) -> Result<&mut Vec<Vec<Value>>> {
        self.sheets
            .get_mut(table)
            .ok_or_else(|| StoreError::MissingTable {
                table: table.to_string(),
            })
    }
}

/// A workbook file of named tables. The first row of every table is its header.
///
/// Every write persists the whole file and re-reads it, so the in-memory copy
/// always matches what is on disk.
#[derive(Debug)]
pub struct Workbook {
    path: PathBuf,
    file: WorkbookFile,
}

impl Workbook {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(StoreError::MissingWorkbook { path });
        }
        let file = read_file(&path)?;
        debug!(path = %path.display(), tables = file.sheets.len(), "workbook opened");
        Ok(Self { path, file })
    }

    pub fn create(path: impl AsRef<Path>, schema: Schema<'_>) -> Result<Self> {
        let mut book = Self {
            path: path.as_ref().to_path_buf(),
            file: WorkbookFile::default(),
        };
        book.ensure_tables(schema)?;
        info!(path = %book.path.display(), "workbook created");
        Ok(book)
    }

    pub fn open_or_create(path: impl AsRef<Path>, schema: Schema<'_>) -> Result<Self> {
        let mut book = if path.as_ref().exists() {
            Self::open(path)?
        } else {
            Self::create(path, schema)?
        };
        book.ensure_tables(schema)?;
        Ok(book)
    }

    /// Adds any table from `schema` the file does not have yet.
    fn ensure_tables(&mut self, schema: Schema<'_>) -> Result<()> {
        let mut changed = !self.path.exists();
        for (table, columns) in schema {
            if !self.file.sheets.contains_key(*table) {
                let header = columns.iter().map(|c| Value::from(*c)).collect();
                self.file.sheets.insert(table.to_string(), vec![header]);
                changed = true;
            }
        }
        if changed {
            self.save()?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<()> {
        write_file(&self.path, &self.file)
    }

    /// Writes `next` to disk and only then adopts it, so a failed write
    /// leaves the in-memory copy untouched.
    fn commit(&mut self, next: WorkbookFile) -> Result<()> {
        write_file(&self.path, &next)?;
        self.file = next;
        self.sync()
    }

    /// Re-reads the backing file, discarding the in-memory copy.
    pub fn sync(&mut self) -> Result<()> {
        self.file = read_file(&self.path)?;
        Ok(())
    }

    fn sheet(&self, table: &str) -> Result<&Vec<Vec<Value>>> {
        self.file
            .sheets
            .get(table)
            .ok_or_else(|| StoreError::MissingTable {
                table: table.to_string(),
            })
    }

    pub fn headers(&self, table: &str) -> Result<Vec<String>> {
        let header = self
            .sheet(table)?
            .first()
            .ok_or_else(|| StoreError::MissingHeader {
                table: table.to_string(),
            })?;
        Ok(header
            .iter()
            .map(|h| h.as_str().unwrap_or_default().to_string())
            .collect())
    }

    fn column_index(&self, table: &str, column: &str) -> Result<usize> {
        self.headers(table)?
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| StoreError::MissingColumn {
                table: table.to_string(),
                column: column.to_string(),
            })
    }

    pub fn rows(&self, table: &str) -> Result<Vec<Row>> {
        let sheet = self.sheet(table)?;
        let (header, body) = sheet.split_first().ok_or_else(|| StoreError::MissingHeader {
            table: table.to_string(),
        })?;
        Ok(body
            .iter()
            .filter(|values| values.iter().any(|v| !v.is_null()))
            .map(|values| Row::new(table, header, values))
            .collect())
    }

    /// Builds one record per data row of `T::TABLE`, keyed by id.
    pub fn load<T: Record>(&self) -> Result<BTreeMap<i64, T>> {
        let mut out = BTreeMap::new();
        for row in self.rows(T::TABLE)? {
            let record = T::from_row(&row)?;
            out.insert(record.id(), record);
        }
        Ok(out)
    }

    /// Appends a row, persists the file and re-reads it.
    pub fn append(&mut self, table: &str, cells: Vec<(&str, Value)>) -> Result<()> {
        let headers = self.headers(table)?;
        let mut by_name: BTreeMap<&str, Value> = cells.into_iter().collect();
        if let Some(unknown) = by_name.keys().find(|k| !headers.iter().any(|h| h == *k)) {
            return Err(StoreError::MissingColumn {
                table: table.to_string(),
                column: unknown.to_string(),
            });
        }
        let row = headers
            .iter()
            .map(|h| by_name.remove(h.as_str()).unwrap_or(Value::Null))
            .collect();
        let mut next = self.file.clone();
        next.sheet_mut(table)?.push(row);
        self.commit(next)?;
        debug!(table, "row appended");
        Ok(())
    }

    /// Overwrites one cell of the row whose `id` column equals `id`.
    pub fn update_cell(&mut self, table: &str, id: i64, column: &str, value: Value) -> Result<()> {
        let id_col = self.column_index(table, "id")?;
        let col = self.column_index(table, column)?;
        let mut next = self.file.clone();
        let row = next
            .sheet_mut(table)?
            .iter_mut()
            .skip(1)
            .find(|r| r.get(id_col).and_then(|v| int_value(v).ok().flatten()) == Some(id))
            .ok_or_else(|| StoreError::MissingRow {
                table: table.to_string(),
                id,
            })?;
        if row.len() <= col {
            row.resize(col + 1, Value::Null);
        }
        row[col] = value;
        self.commit(next)?;
        debug!(table, id, column, "cell updated");
        Ok(())
    }
}

fn write_file(path: &Path, file: &WorkbookFile) -> Result<()> {
    let encoded = serde_json::to_vec_pretty(file)?;
    fs::write(path, encoded)?;
    Ok(())
}

fn read_file(path: &Path) -> Result<WorkbookFile> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
