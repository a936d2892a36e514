//! CSV table loader.
//!
//! # Overview
//!
//! [`TableReader`] parses a CSV document with a header row into a [`Table`].
//! Column types are inferred per column after the whole input is read:
//!
//! 1. cells matching one of the configured null tokens become [`Value::Null`]
//! 2. a column whose remaining cells all parse as `i64` is an integer column
//! 3. otherwise, if they all parse as `f64`, it is a float column
//! 4. otherwise, if they are all `true`/`false` (any case), it is a boolean column
//! 5. anything else keeps the raw text
//!
//! Inferring per column rather than per cell means `1` and `1.0` in the same
//! float column compare equal during duplicate detection.
//!
//! # Example
//!
//! ```
//! use rowdupe::table::{ReaderOptions, TableReader, Value};
//!
//! let data = "a,b\n1,x\n2,\n";
//! let table = TableReader::new(ReaderOptions::default())
//!     .read_from(data.as_bytes())
//!     .unwrap();
//!
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.get(0, "a"), Some(&Value::Int(1)));
//! assert_eq!(table.get(1, "b"), Some(&Value::Null));
//! ```

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{Row, Schema, Table, TableError, Value};
use crate::progress::ProgressCallback;

/// Tokens read as missing values, matching the usual dataframe defaults.
pub const DEFAULT_NULL_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// How often (in records) the reader reports progress and checks for shutdown.
const READ_CHECK_INTERVAL: usize = 1024;

/// Options for the CSV reader.
#[derive(Clone)]
pub struct ReaderOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Cell contents treated as null.
    pub null_values: Vec<String>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl std::fmt::Debug for ReaderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderOptions")
            .field("delimiter", &(self.delimiter as char))
            .field("null_values", &self.null_values)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .field("shutdown_flag", &self.shutdown_flag)
            .finish()
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            null_values: DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect(),
            progress_callback: None,
            shutdown_flag: None,
        }
    }
}

impl ReaderOptions {
    /// Set the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Replace the null tokens.
    #[must_use]
    pub fn with_null_values(mut self, values: Vec<String>) -> Self {
        self.null_values = values;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Float,
    Bool,
    Text,
}

/// CSV reader producing [`Table`]s.
#[derive(Debug, Clone, Default)]
pub struct TableReader {
    options: ReaderOptions,
}

impl TableReader {
    /// Create a reader with the given options.
    #[must_use]
    pub fn new(options: ReaderOptions) -> Self {
        Self { options }
    }

    /// Read a CSV file from disk.
    ///
    /// # Errors
    ///
    /// - [`TableError::NotFound`] if the file does not exist
    /// - [`TableError::Io`] if it cannot be opened
    /// - [`TableError::EmptyFile`] if it has no header row
    /// - [`TableError::Csv`] for malformed content
    /// - [`TableError::RaggedRow`] for a row with more fields than the header
    ///
    /// Rows with fewer fields than the header are padded with nulls.
    pub fn read_path(&self, path: &Path) -> Result<Table, TableError> {
        if !path.exists() {
            return Err(TableError::NotFound(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Reading CSV file {}", path.display());
        self.read_inner(BufReader::new(file), path)
    }

    /// Read CSV data from any reader.
    ///
    /// # Errors
    ///
    /// Same as [`TableReader::read_path`], minus `NotFound`.
    pub fn read_from<R: io::Read>(&self, reader: R) -> Result<Table, TableError> {
        self.read_inner(reader, Path::new("<stream>"))
    }

    fn read_inner<R: io::Read>(&self, reader: R, source: &Path) -> Result<Table, TableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.options.delimiter)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        if headers.is_empty() {
            return Err(TableError::EmptyFile(PathBuf::from(source)));
        }
        let schema = Schema::new(headers.iter().map(str::to_string).collect());
        let width = schema.len();

        if let Some(ref callback) = self.options.progress_callback {
            callback.on_phase_start("reading", 0);
        }

        let nulls: HashSet<&str> = self.options.null_values.iter().map(String::as_str).collect();
        let mut cells: Vec<Vec<Option<String>>> = Vec::new();

        for (idx, record) in csv_reader.records().enumerate() {
            let record = record?;
            if record.len() > width {
                return Err(TableError::RaggedRow {
                    line: idx + 1,
                    expected: width,
                    found: record.len(),
                });
            }
            let mut row: Vec<Option<String>> = record
                .iter()
                .map(|field| {
                    if nulls.contains(field) {
                        None
                    } else {
                        Some(field.to_string())
                    }
                })
                .collect();
            if row.len() < width {
                log::trace!(
                    "Row {} has {} of {} fields; padding with nulls",
                    idx + 1,
                    row.len(),
                    width
                );
                row.resize(width, None);
            }
            cells.push(row);

            if (idx + 1) % READ_CHECK_INTERVAL == 0 {
                if self.options.is_shutdown_requested() {
                    log::debug!("Reading: shutdown requested after {} records", idx + 1);
                    return Err(TableError::Interrupted);
                }
                if let Some(ref callback) = self.options.progress_callback {
                    callback.on_progress(idx + 1, &source.to_string_lossy());
                }
            }
        }

        if let Some(ref callback) = self.options.progress_callback {
            callback.on_phase_end("reading");
        }

        let kinds: Vec<ColumnKind> = (0..width).map(|col| infer_kind(&cells, col)).collect();
        for (name, kind) in schema.names().iter().zip(&kinds) {
            log::trace!("Column '{}' inferred as {:?}", name, kind);
        }

        let rows: Vec<Row> = cells
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(&kinds)
                    .map(|(cell, kind)| convert(cell, *kind))
                    .collect()
            })
            .collect();

        log::info!(
            "Loaded {} rows x {} columns from {}",
            rows.len(),
            width,
            source.display()
        );

        Table::with_schema(schema, rows)
    }
}

fn infer_kind(cells: &[Vec<Option<String>>], col: usize) -> ColumnKind {
    let mut present = cells.iter().filter_map(|row| row[col].as_deref()).peekable();
    if present.peek().is_none() {
        // An all-null column has no type; text keeps the nulls as-is.
        return ColumnKind::Text;
    }

    let mut int_ok = true;
    let mut float_ok = true;
    let mut bool_ok = true;
    for cell in present {
        if int_ok && cell.parse::<i64>().is_err() {
            int_ok = false;
        }
        if float_ok && !int_ok && cell.parse::<f64>().is_err() {
            float_ok = false;
        }
        if bool_ok && parse_bool(cell).is_none() {
            bool_ok = false;
        }
        if !int_ok && !float_ok && !bool_ok {
            return ColumnKind::Text;
        }
    }

    if int_ok {
        ColumnKind::Int
    } else if float_ok {
        ColumnKind::Float
    } else if bool_ok {
        ColumnKind::Bool
    } else {
        ColumnKind::Text
    }
}

fn convert(cell: Option<String>, kind: ColumnKind) -> Value {
    let Some(cell) = cell else {
        return Value::Null;
    };
    match kind {
        ColumnKind::Int => cell.parse().map_or(Value::Null, Value::Int),
        ColumnKind::Float => cell.parse().map_or(Value::Null, Value::float),
        ColumnKind::Bool => parse_bool(&cell).map_or(Value::Null, Value::Bool),
        ColumnKind::Text => Value::Text(cell),
    }
}

fn parse_bool(cell: &str) -> Option<bool> {
    if cell.eq_ignore_ascii_case("true") {
        Some(true)
    } else if cell.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
