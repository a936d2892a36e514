//! Human-readable console report.
//!
//! Prints the completion summary, one line per duplicate pattern, and (in
//! debug mode) a sample of the input with the classification breakdown.

use std::fmt::Display;
use std::io::{self, Write};

use yansi::{Paint, Style};

use super::csv::WriteOutcome;
use crate::duplicates::DuplicateAnalysis;
use crate::table::Table;

const HEADING: Style = Style::new().bold();
const COUNT: Style = Style::new().cyan();
const WARN: Style = Style::new().yellow();

/// Text report for a finished analysis.
pub struct TextSummary<'a> {
    analysis: &'a DuplicateAnalysis,
    debug_table: Option<&'a Table>,
    sample_rows: usize,
    color: bool,
}

impl<'a> TextSummary<'a> {
    /// Create a report without the debug section.
    #[must_use]
    pub fn new(analysis: &'a DuplicateAnalysis) -> Self {
        Self {
            analysis,
            debug_table: None,
            sample_rows: 5,
            color: true,
        }
    }

    /// Include the debug section, sampling the first `sample_rows` of `table`.
    #[must_use]
    pub fn with_debug(mut self, table: &'a Table, sample_rows: usize) -> Self {
        self.debug_table = Some(table);
        self.sample_rows = sample_rows;
        self
    }

    /// Enable or disable ANSI colours.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn paint(&self, text: impl Display, style: Style) -> String {
        if self.color {
            text.paint(style).to_string()
        } else {
            text.to_string()
        }
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, mut w: W) -> io::Result<()> {
        let stats = &self.analysis.stats;
        let cap = stats.max_duplicates;

        writeln!(w)?;
        writeln!(w, "{}", self.paint("Analysis Complete!", HEADING))?;
        writeln!(
            w,
            "Total duplicate rows (up to {} per pattern): {}",
            cap,
            self.paint(stats.exported_duplicate_rows, COUNT)
        )?;
        writeln!(
            w,
            "Total non-duplicate rows: {}",
            self.paint(stats.single_rows, COUNT)
        )?;
        writeln!(
            w,
            "Unique duplicate row patterns: {}",
            self.paint(stats.duplicate_patterns, COUNT)
        )?;

        if self.analysis.has_duplicates() {
            writeln!(w)?;
            writeln!(w, "Duplicate rows (limited to {} per pattern):", cap)?;
            for group in self.analysis.duplicate_groups() {
                writeln!(
                    w,
                    "Row {}: {} times (including up to {} in output)",
                    group.pattern,
                    group.count(),
                    group.exemplars(cap).len()
                )?;
            }
        }

        if let Some(table) = self.debug_table {
            self.write_debug(&mut w, table)?;
        }
        Ok(())
    }

    fn write_debug<W: Write>(&self, w: &mut W, table: &Table) -> io::Result<()> {
        writeln!(w)?;
        writeln!(w, "{}", self.paint("Debug Info:", HEADING))?;
        writeln!(w, "Sample of first {} rows:", self.sample_rows)?;
        write!(w, "{}", render_sample(table, self.sample_rows))?;
        writeln!(w)?;
        writeln!(
            w,
            "Rows marked as duplicates: {}",
            self.analysis.stats.duplicate_rows
        )?;
        let all_columns = self.analysis.key_columns.len() == table.columns().len()
            && self.analysis.key_columns.as_slice() == table.columns();
        if all_columns {
            writeln!(w, "Duplicate check based on columns: All columns")?;
        } else {
            writeln!(
                w,
                "Duplicate check based on columns: {:?}",
                self.analysis.key_columns
            )?;
        }
        Ok(())
    }

    /// Write the export result line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_export<W: Write>(&self, mut w: W, outcome: &WriteOutcome) -> io::Result<()> {
        writeln!(w)?;
        match outcome {
            WriteOutcome::Written { rows, path } => writeln!(
                w,
                "Exported {} rows (duplicates and non-duplicates) to '{}'",
                rows,
                path.display()
            ),
            WriteOutcome::Skipped => writeln!(
                w,
                "{}",
                self.paint("No rows to export. No CSV created.", WARN)
            ),
        }
    }
}

/// Render the first `n` rows as an aligned text grid with a row index column.
#[must_use]
pub fn render_sample(table: &Table, n: usize) -> String {
    let rows = table.head(n);
    let index_width = rows.len().saturating_sub(1).to_string().len();

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|v| v.to_field_or_nan()).collect())
        .collect();
    let widths: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(col, name)| {
            cells
                .iter()
                .map(|r| r[col].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&" ".repeat(index_width));
    for (name, width) in table.columns().iter().zip(&widths) {
        out.push_str(&format!("  {:>width$}", name, width = width));
    }
    out.push('\n');
    for (idx, row) in cells.iter().enumerate() {
        out.push_str(&format!("{:<width$}", idx, width = index_width));
        for (cell, width) in row.iter().zip(&widths) {
            out.push_str(&format!("  {:>width$}", cell, width = width));
        }
        out.push('\n');
    }
    out
}
