//! JSON report for duplicate analysis results.
//!
//! Provides machine-readable output for scripting and automation. Only
//! duplicate patterns are listed; singles are summarised by count.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "key_columns": ["a", "b"],
//!   "duplicates": [
//!     {
//!       "values": [1, 2],
//!       "count": 7,
//!       "exported": 5,
//!       "rows": [0, 3, 4, 8, 9]
//!     }
//!   ],
//!   "summary": {
//!     "total_rows": 100,
//!     "exported_duplicate_rows": 5,
//!     "single_rows": 93,
//!     "duplicate_patterns": 1,
//!     "duplicate_rows": 7,
//!     "distinct_patterns": 94,
//!     "omitted_rows": 2,
//!     "max_duplicates": 5,
//!     "exit_code": 0,
//!     "exit_code_name": "RW000",
//!     "generated_at": "2026-01-01T00:00:00+00:00"
//!   }
//! }
//! ```

use std::io::Write;

use chrono::Utc;
use serde::Serialize;

use crate::duplicates::{AnalysisStats, DuplicateAnalysis, Pattern, PatternGroup};
use crate::error::ExitCode;

/// A single duplicate pattern in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonPattern<'a> {
    /// Key-column values shared by every row of the pattern
    pub values: &'a Pattern,
    /// Total occurrences in the input
    pub count: usize,
    /// Rows of this pattern included in the export
    pub exported: usize,
    /// Source row indices of the exported rows
    pub rows: &'a [usize],
}

impl<'a> JsonPattern<'a> {
    /// Create a JSON pattern from a group and the export cap.
    #[must_use]
    pub fn from_group(group: &'a PatternGroup, cap: usize) -> Self {
        let rows = group.exemplars(cap);
        Self {
            values: &group.pattern,
            count: group.count(),
            exported: rows.len(),
            rows,
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Analysis counts
    #[serde(flatten)]
    pub stats: AnalysisStats,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "RW000")
    pub exit_code_name: String,
    /// When the report was generated (RFC 3339)
    pub generated_at: String,
}

impl JsonSummary {
    /// Create a JSON summary from analysis stats and an exit code.
    #[must_use]
    pub fn new(stats: &AnalysisStats, exit_code: ExitCode) -> Self {
        Self {
            stats: stats.clone(),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Complete JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// Columns the patterns were built from
    pub key_columns: &'a [String],
    /// Duplicate patterns in first-encountered order
    pub duplicates: Vec<JsonPattern<'a>>,
    /// Summary statistics
    pub summary: JsonSummary,
}

impl<'a> JsonOutput<'a> {
    /// Create a JSON report for an analysis.
    #[must_use]
    pub fn new(analysis: &'a DuplicateAnalysis, exit_code: ExitCode) -> Self {
        let cap = analysis.stats.max_duplicates;
        Self {
            key_columns: &analysis.key_columns,
            duplicates: analysis
                .duplicate_groups()
                .map(|g| JsonPattern::from_group(g, cap))
                .collect(),
            summary: JsonSummary::new(&analysis.stats, exit_code),
        }
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        let json = self.to_json_pretty().map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}
