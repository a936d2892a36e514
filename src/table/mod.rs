//! In-memory table model.
//!
//! A [`Table`] is an ordered sequence of rows sharing one [`Schema`]. Rows are
//! positional: `row[i]` is the value of column `schema.names()[i]`.
//!
//! Tables are produced by the [`reader`] module and consumed read-only by the
//! duplicate analyzer.
//!
//! # Example
//!
//! ```
//! use rowdupe::table::{Table, Value};
//!
//! let table = Table::new(
//!     vec!["a".to_string(), "b".to_string()],
//!     vec![
//!         vec![Value::Int(1), Value::Int(2)],
//!         vec![Value::Int(3), Value::Int(4)],
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.schema().index_of("b"), Some(1));
//! ```

pub mod reader;
pub mod value;

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

pub use reader::{ReaderOptions, TableReader, DEFAULT_NULL_VALUES};
pub use value::Value;

/// A single row of values aligned with the table schema.
pub type Row = Vec<Value>;

/// Errors raised while building, loading, or validating a table.
#[derive(Debug, Error)]
pub enum TableError {
    /// The input file does not exist.
    #[error("File '{0}' not found")]
    NotFound(PathBuf),

    /// The input has no header row.
    #[error("CSV input '{0}' is empty")]
    EmptyFile(PathBuf),

    /// An I/O error occurred while reading the input.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The CSV parser rejected the input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row does not match the width of the schema.
    #[error("Row {line} has {found} fields, expected {expected}")]
    RaggedRow {
        /// 1-based record number (header excluded)
        line: usize,
        /// Number of columns in the schema
        expected: usize,
        /// Number of fields found in the row
        found: usize,
    },

    /// Reading was interrupted by a shutdown request.
    #[error("Reading interrupted by user")]
    Interrupted,
}

/// Ordered column names with name lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Create a schema from column names.
    ///
    /// Repeated names are made unique by suffixing `.1`, `.2`, and so on.
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        let mut schema = Self::default();
        for name in names {
            schema.push_unique(name);
        }
        schema
    }

    fn push_unique(&mut self, name: String) {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while self.index.contains_key(&candidate) {
            candidate = format!("{}.{}", name, suffix);
            suffix += 1;
        }
        if candidate != name {
            log::debug!("Renamed repeated column '{}' to '{}'", name, candidate);
        }
        self.index.insert(candidate.clone(), self.names.len());
        self.names.push(candidate);
    }

    /// Column names in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of a column, if present.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Check if a column exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the schema has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// An in-memory table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    schema: Schema,
    rows: Vec<Row>,
}

impl Table {
    /// Create a table, checking that every row matches the schema width.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::RaggedRow`] for the first row with the wrong
    /// number of values.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self, TableError> {
        Self::with_schema(Schema::new(columns), rows)
    }

    /// Create a table from an existing schema.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::RaggedRow`] if a row has the wrong width.
    pub fn with_schema(schema: Schema, rows: Vec<Row>) -> Result<Self, TableError> {
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != schema.len())
        {
            return Err(TableError::RaggedRow {
                line: idx + 1,
                expected: schema.len(),
                found: row.len(),
            });
        }
        Ok(Self { schema, rows })
    }

    /// The table schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        self.schema.names()
    }

    /// All rows.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row at `idx`, if present.
    #[must_use]
    pub fn row(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    /// Value at (`row`, `column name`), if both exist.
    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.schema.index_of(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First `n` rows.
    #[must_use]
    pub fn head(&self, n: usize) -> &[Row] {
        &self.rows[..n.min(self.rows.len())]
    }
}
