//! Duplicate analyzer: grouping, capped selection, and annotation.
//!
//! # Overview
//!
//! [`DuplicateAnalyzer::analyze`] runs the whole pipeline over an in-memory
//! [`Table`]:
//!
//! 1. **Validate** - the table has rows, the key columns exist, the cap is positive
//! 2. **Extract** - compute each row's [`Pattern`] (on the rayon pool for large tables)
//! 3. **Group** - one pass building pattern -> ordered row indices
//! 4. **Select** - keep the first `max_duplicates` rows of each duplicate pattern,
//!    then every single row, each annotated with its pattern's total count
//!
//! # Output order
//!
//! Retained duplicate rows come first, grouped by first-encountered pattern and
//! in original order within each group. All single rows follow in original
//! row order.
//!
//! # Example
//!
//! ```
//! use rowdupe::duplicates::{AnalyzerConfig, DuplicateAnalyzer};
//! use rowdupe::table::{Table, Value};
//!
//! let table = Table::new(
//!     vec!["a".to_string(), "b".to_string()],
//!     vec![
//!         vec![Value::Int(1), Value::Int(2)],
//!         vec![Value::Int(1), Value::Int(2)],
//!         vec![Value::Int(3), Value::Int(4)],
//!     ],
//! )
//! .unwrap();
//!
//! let analyzer = DuplicateAnalyzer::new(AnalyzerConfig::default().with_max_duplicates(1));
//! let analysis = analyzer.analyze(&table).unwrap();
//!
//! assert_eq!(analysis.output.len(), 2);
//! assert_eq!(analysis.output.rows()[0].duplicate_count, 2);
//! assert_eq!(analysis.stats.duplicate_patterns, 1);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use super::groups::{NullEquality, Pattern, PatternGroup, PatternGrouper, PatternGroups};
use crate::progress::ProgressCallback;
use crate::table::{Row, Schema, Table};

/// Default number of exemplar rows kept per duplicate pattern.
pub const DEFAULT_MAX_DUPLICATES: usize = 5;

/// Default row count from which pattern extraction runs in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 100_000;

/// Name of the column appended to every exported row.
pub const DUPLICATE_COUNT_COLUMN: &str = "duplicate_count";

/// Minimum Jaro-Winkler similarity for a column name suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Configuration for the duplicate analyzer.
#[derive(Clone)]
pub struct AnalyzerConfig {
    /// Key columns; `None` or empty compares all columns.
    pub columns: Option<Vec<String>>,
    /// Maximum exemplar rows kept per duplicate pattern. Must be at least 1.
    pub max_duplicates: usize,
    /// How nulls take part in pattern equality.
    pub null_equality: NullEquality,
    /// Tables with at least this many rows extract patterns in parallel.
    pub parallel_threshold: usize,
    /// Rows between progress notifications (1 = every row).
    pub progress_interval: usize,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl std::fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("columns", &self.columns)
            .field("max_duplicates", &self.max_duplicates)
            .field("null_equality", &self.null_equality)
            .field("parallel_threshold", &self.parallel_threshold)
            .field("progress_interval", &self.progress_interval)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .field("shutdown_flag", &self.shutdown_flag)
            .finish()
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            columns: None,
            max_duplicates: DEFAULT_MAX_DUPLICATES,
            null_equality: NullEquality::Equal,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            progress_interval: 1,
            progress_callback: None,
            shutdown_flag: None,
        }
    }
}

impl AnalyzerConfig {
    /// Compare rows on these columns only.
    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the per-pattern exemplar cap.
    #[must_use]
    pub fn with_max_duplicates(mut self, max_duplicates: usize) -> Self {
        self.max_duplicates = max_duplicates;
        self
    }

    /// Set the null equality mode.
    #[must_use]
    pub fn with_null_equality(mut self, nulls: NullEquality) -> Self {
        self.null_equality = nulls;
        self
    }

    /// Set the row count from which pattern extraction runs in parallel.
    #[must_use]
    pub fn with_parallel_threshold(mut self, rows: usize) -> Self {
        self.parallel_threshold = rows;
        self
    }

    /// Set how many rows pass between progress notifications.
    #[must_use]
    pub fn with_progress_interval(mut self, rows: usize) -> Self {
        self.progress_interval = rows.max(1);
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

/// Summary counts of an analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisStats {
    /// Rows in the input table
    pub total_rows: usize,
    /// Duplicate rows exported (sum of capped counts across duplicate patterns)
    pub exported_duplicate_rows: usize,
    /// Rows whose pattern occurs once (all exported)
    pub single_rows: usize,
    /// Distinct patterns occurring 2+ times
    pub duplicate_patterns: usize,
    /// Rows whose pattern occurs 2+ times, before capping
    pub duplicate_rows: usize,
    /// Distinct patterns overall
    pub distinct_patterns: usize,
    /// Duplicate rows left out by the cap
    pub omitted_rows: usize,
    /// Cap used for this analysis
    pub max_duplicates: usize,
}

impl AnalysisStats {
    /// Total rows in the output table.
    #[must_use]
    pub fn exported_rows(&self) -> usize {
        self.exported_duplicate_rows + self.single_rows
    }
}

/// A copied input row annotated with its pattern's total count.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRow {
    /// Index of the source row in the input table
    pub source_index: usize,
    /// The source row's values, all columns
    pub values: Row,
    /// Total occurrences of this row's pattern (never the capped count)
    pub duplicate_count: usize,
}

/// The export table: original schema plus `duplicate_count`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotatedTable {
    columns: Vec<String>,
    rows: Vec<AnnotatedRow>,
}

impl AnnotatedTable {
    /// Create an annotated table.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<AnnotatedRow>) -> Self {
        Self { columns, rows }
    }

    /// The source table's columns.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Header for export: source columns followed by `duplicate_count`.
    #[must_use]
    pub fn output_columns(&self) -> Vec<String> {
        let mut header = self.columns.clone();
        header.push(DUPLICATE_COUNT_COLUMN.to_string());
        header
    }

    /// All annotated rows in output order.
    #[must_use]
    pub fn rows(&self) -> &[AnnotatedRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if there is nothing to export.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Result of a duplicate analysis.
#[derive(Debug, Clone)]
pub struct DuplicateAnalysis {
    /// Columns the patterns were built from
    pub key_columns: Vec<String>,
    /// Every pattern with its total count and row indices
    pub patterns: PatternGroups,
    /// Capped duplicates followed by all singles
    pub output: AnnotatedTable,
    /// Summary counts
    pub stats: AnalysisStats,
}

impl DuplicateAnalysis {
    /// Every pattern with its total occurrence count, in first-encountered order.
    ///
    /// Under [`NullEquality::Distinct`] each row whose key holds a null is its
    /// own entry with count 1, so such a pattern may be listed more than once.
    pub fn pattern_counts(&self) -> impl Iterator<Item = (&Pattern, usize)> {
        self.patterns.iter().map(|g| (&g.pattern, g.count()))
    }

    /// Total occurrence count of `pattern`.
    ///
    /// `None` for patterns holding a null under [`NullEquality::Distinct`],
    /// even when such rows occur.
    #[must_use]
    pub fn count_of(&self, pattern: &Pattern) -> Option<usize> {
        self.patterns.count_of(pattern)
    }

    /// Duplicate pattern groups, in first-encountered order.
    pub fn duplicate_groups(&self) -> impl Iterator<Item = &PatternGroup> {
        self.patterns.duplicates()
    }

    /// Check if the analysis found any duplicate pattern.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.stats.duplicate_patterns > 0
    }
}

/// Errors that can occur during duplicate analysis.
#[derive(thiserror::Error, Debug)]
pub enum AnalyzerError {
    /// The table has no rows.
    #[error("Input table is empty")]
    EmptyInput,

    /// Requested key columns are missing from the schema.
    #[error("Columns {missing:?} not found in table{}", format_suggestions(.suggestions))]
    UnknownColumns {
        /// Missing names, in request order
        missing: Vec<String>,
        /// (missing name, closest existing column) pairs
        suggestions: Vec<(String, String)>,
    },

    /// The exemplar cap is not positive.
    #[error("max_duplicates must be at least 1 (got {0})")]
    InvalidMaxDuplicates(usize),

    /// The analysis was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Analysis interrupted by user")]
    Interrupted,
}

fn format_suggestions(suggestions: &[(String, String)]) -> String {
    if suggestions.is_empty() {
        return String::new();
    }
    let hints: Vec<String> = suggestions
        .iter()
        .map(|(missing, close)| format!("'{}' -> '{}'", missing, close))
        .collect();
    format!(" (did you mean: {})", hints.join(", "))
}

/// Duplicate analyzer over in-memory tables.
///
/// # Example
///
/// ```
/// use rowdupe::duplicates::{AnalyzerConfig, AnalyzerError, DuplicateAnalyzer};
/// use rowdupe::table::{Table, Value};
///
/// let table = Table::new(vec!["x".to_string()], vec![vec![Value::Int(1)]]).unwrap();
/// let analyzer = DuplicateAnalyzer::new(AnalyzerConfig::default().with_columns(["y"]));
///
/// match analyzer.analyze(&table) {
///     Err(AnalyzerError::UnknownColumns { missing, .. }) => assert_eq!(missing, vec!["y"]),
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct DuplicateAnalyzer {
    config: AnalyzerConfig,
}

impl DuplicateAnalyzer {
    /// Create an analyzer with the given configuration.
    #[must_use]
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Create an analyzer with default configuration (all columns, cap 5).
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(AnalyzerConfig::default())
    }

    /// The analyzer configuration.
    #[must_use]
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze `table` for duplicate rows.
    ///
    /// # Errors
    ///
    /// Returns `AnalyzerError` if:
    /// - the table has no rows
    /// - a requested column does not exist
    /// - `max_duplicates` is 0
    /// - shutdown is requested during the pass
    pub fn analyze(&self, table: &Table) -> Result<DuplicateAnalysis, AnalyzerError> {
        if table.is_empty() {
            return Err(AnalyzerError::EmptyInput);
        }
        let (key_indices, key_columns) = self.resolve_columns(table.schema())?;
        let cap = self.config.max_duplicates;
        if cap == 0 {
            return Err(AnalyzerError::InvalidMaxDuplicates(cap));
        }

        log::info!(
            "Analyzing {} rows for duplicates on {} (max {} per pattern)",
            table.len(),
            if self.config.columns.as_ref().is_some_and(|c| !c.is_empty()) {
                format!("columns {:?}", key_columns)
            } else {
                "all columns".to_string()
            },
            cap
        );

        if self.config.is_shutdown_requested() {
            return Err(AnalyzerError::Interrupted);
        }

        let patterns = self.extract_patterns(table, &key_indices);
        let patterns = self.group(patterns)?;
        let output = build_output(table, &patterns, cap);

        let mut stats = AnalysisStats {
            total_rows: table.len(),
            distinct_patterns: patterns.len(),
            max_duplicates: cap,
            ..Default::default()
        };
        for group in patterns.iter() {
            if group.is_duplicate() {
                let kept = group.exemplars(cap).len();
                stats.duplicate_patterns += 1;
                stats.duplicate_rows += group.count();
                stats.exported_duplicate_rows += kept;
                stats.omitted_rows += group.omitted(cap);
                log::debug!(
                    "Row {}: {} times (including up to {} in output)",
                    group.pattern,
                    group.count(),
                    kept
                );
            } else {
                stats.single_rows += 1;
            }
        }

        if output.is_empty() {
            log::warn!(
                "Table has {} rows but no rows were selected for export",
                table.len()
            );
        }

        log::info!(
            "Analysis complete: {} duplicate rows exported (up to {} per pattern), {} single rows, {} duplicate patterns",
            stats.exported_duplicate_rows,
            cap,
            stats.single_rows,
            stats.duplicate_patterns
        );

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_summary(&stats);
        }

        Ok(DuplicateAnalysis {
            key_columns,
            patterns,
            output,
            stats,
        })
    }

    /// Map requested key columns to schema positions.
    fn resolve_columns(&self, schema: &Schema) -> Result<(Vec<usize>, Vec<String>), AnalyzerError> {
        let requested = match self.config.columns {
            Some(ref cols) if !cols.is_empty() => cols,
            _ => return Ok(((0..schema.len()).collect(), schema.names().to_vec())),
        };

        let mut indices = Vec::with_capacity(requested.len());
        let mut names: Vec<String> = Vec::with_capacity(requested.len());
        let mut missing: Vec<String> = Vec::new();

        for name in requested {
            if names.contains(name) || missing.contains(name) {
                continue;
            }
            match schema.index_of(name) {
                Some(idx) => {
                    indices.push(idx);
                    names.push(name.clone());
                }
                None => missing.push(name.clone()),
            }
        }

        if !missing.is_empty() {
            let suggestions = missing
                .iter()
                .filter_map(|m| closest_column(m, schema).map(|c| (m.clone(), c)))
                .collect();
            return Err(AnalyzerError::UnknownColumns {
                missing,
                suggestions,
            });
        }

        Ok((indices, names))
    }

    /// Compute every row's pattern, in row order.
    fn extract_patterns(&self, table: &Table, key_indices: &[usize]) -> Vec<Pattern> {
        if table.len() >= self.config.parallel_threshold {
            log::debug!(
                "Extracting patterns for {} rows on {} threads",
                table.len(),
                rayon::current_num_threads()
            );
            // Indexed collect keeps row order.
            table
                .rows()
                .par_iter()
                .map(|row| Pattern::from_row(row, key_indices))
                .collect()
        } else {
            table
                .rows()
                .iter()
                .map(|row| Pattern::from_row(row, key_indices))
                .collect()
        }
    }

    /// Group patterns, reporting progress and honouring the shutdown flag.
    fn group(&self, patterns: Vec<Pattern>) -> Result<PatternGroups, AnalyzerError> {
        let total = patterns.len();
        let interval = self.config.progress_interval.max(1);
        let callback = self.config.progress_callback.as_ref();

        if let Some(cb) = callback {
            cb.on_phase_start("grouping", total);
        }

        let mut grouper = PatternGrouper::new(self.config.null_equality);
        for pattern in patterns {
            grouper.push(pattern);
            let seen = grouper.rows_seen();
            if seen % interval == 0 || seen == total {
                if self.config.is_shutdown_requested() {
                    log::debug!("Grouping: shutdown requested after {} rows", seen);
                    return Err(AnalyzerError::Interrupted);
                }
                if let Some(cb) = callback {
                    cb.on_progress(seen, "");
                }
            }
        }

        if let Some(cb) = callback {
            cb.on_phase_end("grouping");
        }

        let (groups, _) = grouper.finish();
        Ok(groups)
    }
}

/// Build the export table from final pattern counts.
fn build_output(table: &Table, patterns: &PatternGroups, cap: usize) -> AnnotatedTable {
    let rows = table.rows();
    let annotate = |idx: usize, count: usize| AnnotatedRow {
        source_index: idx,
        values: rows[idx].clone(),
        duplicate_count: count,
    };

    let mut output: Vec<AnnotatedRow> = patterns
        .duplicates()
        .flat_map(|group| {
            group
                .exemplars(cap)
                .iter()
                .map(move |&idx| annotate(idx, group.count()))
        })
        .collect();
    output.extend(patterns.singles().map(|group| annotate(group.first_row(), 1)));

    AnnotatedTable::new(table.columns().to_vec(), output)
}

/// Closest schema column to `name`, if similar enough.
fn closest_column(name: &str, schema: &Schema) -> Option<String> {
    schema
        .names()
        .iter()
        .map(|candidate| (strsim::jaro_winkler(name, candidate), candidate))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate.clone())
}

/// Analyze `table` with an optional key-column subset and exemplar cap.
///
/// Shorthand for building a [`DuplicateAnalyzer`] with those two settings.
///
/// # Errors
///
/// See [`DuplicateAnalyzer::analyze`].
pub fn analyze(
    table: &Table,
    columns: Option<&[&str]>,
    max_duplicates: usize,
) -> Result<DuplicateAnalysis, AnalyzerError> {
    let mut config = AnalyzerConfig::default().with_max_duplicates(max_duplicates);
    if let Some(cols) = columns {
        config = config.with_columns(cols.iter().copied());
    }
    DuplicateAnalyzer::new(config).analyze(table)
}
