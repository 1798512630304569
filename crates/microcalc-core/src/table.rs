//! Table type
//!
//! A [`Table`] is a header row plus data rows. Cells are addressed by
//! `(column name, row key)`, where the row key is looked up in a key column.
//! The row index of each key column is built on first use and shared between
//! threads, so a loaded table can serve many concurrent lookups.

use std::fmt;
use std::sync::OnceLock;

use ahash::AHashMap;

use crate::cell::CellValue;
use crate::error::{Error, Result};

/// Row index of one key column: key text → row position
type KeyIndex = AHashMap<String, usize>;

/// A read-only, column-indexed row store
#[derive(Debug, Clone)]
pub struct Table {
    /// Column names, in file order
    columns: Vec<String>,
    /// Column name → column position
    column_index: AHashMap<String, usize>,
    /// Data rows, each exactly `columns.len()` wide
    rows: Vec<Vec<CellValue>>,
    /// Lazily built key index, one slot per column
    key_indexes: Vec<OnceLock<KeyIndex>>,
}

/// What was missing when a lookup failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    /// The value column does not exist
    Column(String),
    /// The key column does not exist
    KeyColumn(String),
    /// No row carries this key in the key column
    Key { key: String, key_column: String },
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Column(name) => write!(f, "column `{name}` does not exist"),
            Missing::KeyColumn(name) => write!(f, "key column `{name}` does not exist"),
            Missing::Key { key, key_column } => {
                write!(f, "row key `{key}` does not exist in column `{key_column}`")
            }
        }
    }
}

/// Result of a `(column, key)` lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CellLookup<'a> {
    /// The referenced cell (which may itself be empty)
    Found(&'a CellValue),
    /// The column, key column or key does not exist
    NotFound(Missing),
}

impl Table {
    /// Create an empty table with the given header
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns
            .into_iter()
            .map(|c| c.into().trim().to_string())
            .collect();

        if columns.is_empty() {
            return Err(Error::NoColumns);
        }

        let mut column_index = AHashMap::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            if column_index.insert(name.clone(), idx).is_some() {
                return Err(Error::DuplicateColumn(name.clone()));
            }
        }

        let key_indexes = columns.iter().map(|_| OnceLock::new()).collect();

        Ok(Self {
            columns,
            column_index,
            rows: Vec::new(),
            key_indexes,
        })
    }

    /// Append a data row. Short rows are padded with empty cells.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) -> Result<()> {
        if row.len() > self.columns.len() {
            return Err(Error::RowTooWide {
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);

        // Indexes built so far no longer cover every row
        for index in &mut self.key_indexes {
            index.take();
        }
        Ok(())
    }

    /// Column names, in file order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of data rows (the header is not counted)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of data cells (`rows × columns`)
    pub fn size(&self) -> usize {
        self.rows.len() * self.columns.len()
    }

    /// Check if a column with this name exists
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index.contains_key(name)
    }

    /// Position of a column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    /// Get a cell by position
    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Iterate over the data rows
    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Find the row whose `key_column` cell equals `key`
    pub fn row_of(&self, key_column: &str, key: &str) -> Option<usize> {
        let col = self.column_index(key_column)?;
        self.key_index(col).get(key.trim()).copied()
    }

    /// Look up the cell in `column` on the row identified by `key` in `key_column`
    pub fn lookup(&self, column: &str, key_column: &str, key: &str) -> CellLookup<'_> {
        let Some(key_col) = self.column_index(key_column) else {
            return CellLookup::NotFound(Missing::KeyColumn(key_column.to_string()));
        };
        let Some(value_col) = self.column_index(column) else {
            return CellLookup::NotFound(Missing::Column(column.to_string()));
        };

        match self.key_index(key_col).get(key.trim()) {
            Some(&row) => CellLookup::Found(&self.rows[row][value_col]),
            None => CellLookup::NotFound(Missing::Key {
                key: key.to_string(),
                key_column: key_column.to_string(),
            }),
        }
    }

    /// Look up `column` for each key, in order
    pub fn lookup_all<'k, I>(&self, column: &str, key_column: &str, keys: I) -> Vec<CellLookup<'_>>
    where
        I: IntoIterator<Item = &'k str>,
    {
        keys.into_iter()
            .map(|key| self.lookup(column, key_column, key))
            .collect()
    }

    fn key_index(&self, col: usize) -> &KeyIndex {
        self.key_indexes[col].get_or_init(|| {
            let mut index = KeyIndex::with_capacity(self.rows.len());
            for (row_idx, row) in self.rows.iter().enumerate() {
                let key = row[col].key_text();
                if key.is_empty() {
                    continue;
                }
                if index.contains_key(&*key) {
                    log::warn!(
                        "Duplicate key `{}` in column `{}` (row {}); keeping the first occurrence",
                        key,
                        self.columns[col],
                        row_idx + 1
                    );
                    continue;
                }
                index.insert(key.into_owned(), row_idx);
            }
            log::debug!(
                "Indexed {} keys of column `{}`",
                index.len(),
                self.columns[col]
            );
            index
        })
    }
}
