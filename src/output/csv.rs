//! CSV export of the annotated output table.
//!
//! One record is written per output row: the source row's values in schema
//! order followed by `duplicate_count`.
//!
//! # Empty output
//!
//! An empty table produces no file at all. [`CsvOutput::write_path`] reports
//! this as [`WriteOutcome::Skipped`] so the caller can tell the user instead of
//! claiming a successful export.
//!
//! # Example
//!
//! ```
//! use rowdupe::duplicates::analyze;
//! use rowdupe::output::csv::CsvOutput;
//! use rowdupe::table::{Table, Value};
//!
//! let table = Table::new(
//!     vec!["x".to_string()],
//!     vec![vec![Value::Int(1)], vec![Value::Int(1)]],
//! )
//! .unwrap();
//! let analysis = analyze(&table, None, 5).unwrap();
//!
//! let csv = CsvOutput::new(&analysis.output).to_string().unwrap();
//! assert_eq!(csv, "x,duplicate_count\n1,2\n1,2\n");
//! ```

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::duplicates::AnnotatedTable;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// I/O error creating the output file.
    #[error("Failed to create {path}: {source}")]
    Create {
        /// Output path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// What an export call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Rows were written to the destination.
    Written {
        /// Number of data rows written (header excluded)
        rows: usize,
        /// Destination path
        path: PathBuf,
    },
    /// The table was empty; no file was created.
    Skipped,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    table: &'a AnnotatedTable,
    delimiter: u8,
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(table: &'a AnnotatedTable) -> Self {
        Self {
            table,
            delimiter: b',',
        }
    }

    /// Use a different field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Write the CSV output to the given writer.
    ///
    /// The header is always written, even for an empty table.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<usize, CsvOutputError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        csv_writer.write_record(self.table.output_columns())?;

        for row in self.table.rows() {
            let mut record: Vec<String> = row.values.iter().map(|v| v.to_field()).collect();
            record.push(row.duplicate_count.to_string());
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(self.table.len())
    }

    /// Write the table to `path`, or skip it when there is nothing to export.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if the file cannot be created or written.
    pub fn write_path(&self, path: &Path) -> Result<WriteOutcome, CsvOutputError> {
        if self.table.is_empty() {
            log::warn!("No rows to export; {} was not created", path.display());
            return Ok(WriteOutcome::Skipped);
        }

        let file = File::create(path).map_err(|source| CsvOutputError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        let rows = self.write_to(BufWriter::new(file))?;
        log::info!("Exported {} rows to {}", rows, path.display());

        Ok(WriteOutcome::Written {
            rows,
            path: path.to_path_buf(),
        })
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicates::AnnotatedRow;
    use crate::table::Value;
    use tempfile::TempDir;

    fn sample() -> AnnotatedTable {
        AnnotatedTable::new(
            vec!["name".to_string(), "score".to_string()],
            vec![
                AnnotatedRow {
                    source_index: 0,
                    values: vec![Value::Text("a,b".into()), Value::Float(1.0)],
                    duplicate_count: 3,
                },
                AnnotatedRow {
                    source_index: 4,
                    values: vec![Value::Null, Value::Float(2.5)],
                    duplicate_count: 1,
                },
            ],
        )
    }

    #[test]
    fn test_csv_output_basic() {
        let table = sample();
        let csv_str = CsvOutput::new(&table).to_string().unwrap();

        assert_eq!(
            csv_str,
            "name,score,duplicate_count\n\"a,b\",1.0,3\n,2.5,1\n"
        );
    }

    #[test]
    fn test_csv_output_delimiter() {
        let table = sample();
        let csv_str = CsvOutput::new(&table)
            .with_delimiter(b';')
            .to_string()
            .unwrap();
        assert!(csv_str.starts_with("name;score;duplicate_count\n"));
        assert!(csv_str.contains("a,b;1.0;3"));
    }

    #[test]
    fn test_write_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let table = sample();

        let outcome = CsvOutput::new(&table).write_path(&path).unwrap();
        assert_eq!(
            outcome,
            WriteOutcome::Written {
                rows: 2,
                path: path.clone()
            }
        );
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("name,score,duplicate_count"));
    }

    #[test]
    fn test_empty_table_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let table = AnnotatedTable::new(vec!["a".to_string()], Vec::new());

        let outcome = CsvOutput::new(&table).write_path(&path).unwrap();
        assert_eq!(outcome, WriteOutcome::Skipped);
        assert!(!path.exists());
    }

    #[test]
    fn test_create_error_names_path() {
        let table = sample();
        let path = Path::new("/definitely/not/a/dir/out.csv");
        let err = CsvOutput::new(&table).write_path(path).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/a/dir/out.csv"));
    }
}
