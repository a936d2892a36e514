//! Output formatters for analysis results.
//!
//! - [`csv`]: the annotated export table (duplicates first, then singles)
//! - [`summary`]: the console report
//! - [`json`]: a machine-readable report for scripting
//!
//! # Example
//!
//! ```no_run
//! use rowdupe::duplicates::DuplicateAnalyzer;
//! use rowdupe::output::{CsvOutput, TextSummary};
//! use rowdupe::table::TableReader;
//! use std::path::Path;
//!
//! let table = TableReader::default().read_path(Path::new("data.csv")).unwrap();
//! let analysis = DuplicateAnalyzer::with_defaults().analyze(&table).unwrap();
//!
//! CsvOutput::new(&analysis.output)
//!     .write_path(Path::new("duplicates_and_singles.csv"))
//!     .unwrap();
//! TextSummary::new(&analysis).write_to(std::io::stdout()).unwrap();
//! ```

pub mod csv;
pub mod json;
pub mod summary;

pub use csv::{CsvOutput, CsvOutputError, WriteOutcome};
pub use json::JsonOutput;
pub use summary::TextSummary;
