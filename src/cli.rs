//! Command-line interface definitions for rowdupe.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! Flags given here take precedence over the configuration file and `ROWDUPE_*`
//! environment variables.
//!
//! # Example
//!
//! ```bash
//! # Compare whole rows, keep up to 5 exemplars per duplicate pattern
//! rowdupe analyze data.csv
//!
//! # Compare on a subset of columns with a smaller cap
//! rowdupe analyze data.csv -c name,email -m 2 -o report.csv
//!
//! # Machine-readable report
//! rowdupe analyze data.csv --report json
//!
//! # Write the default configuration file
//! rowdupe config --init
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Find duplicate rows in CSV data.
///
/// rowdupe groups rows by the values of the selected columns, exports a capped
/// number of exemplars for every duplicate pattern plus all unique rows, and
/// annotates each exported row with how often its pattern occurs.
#[derive(Debug, Parser)]
#[command(name = "rowdupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for rowdupe.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyze a CSV file for duplicate rows
    Analyze(AnalyzeArgs),
    /// Show or initialise the configuration file
    Config(ConfigArgs),
}

/// Arguments for the analyze subcommand.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// CSV file to analyze
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Columns to compare (repeatable or comma-separated; default: all columns)
    #[arg(short, long, value_name = "COLUMN", value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Maximum rows exported per duplicate pattern (default: 5)
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_duplicates: Option<u64>,

    /// Output CSV path (default: duplicates_and_singles.csv)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Console report format
    #[arg(long, value_enum, default_value = "text")]
    pub report: ReportFormat,

    /// Print a sample of the input and the classification breakdown
    #[arg(long)]
    pub debug: bool,

    /// Field delimiter for input and output (single ASCII character)
    #[arg(long, value_name = "CHAR", value_parser = parse_delimiter)]
    pub delimiter: Option<char>,

    /// Treat missing values as distinct from each other
    #[arg(long)]
    pub null_distinct: bool,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Arguments for the config subcommand.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Write the default configuration file
    #[arg(long)]
    pub init: bool,

    /// Overwrite an existing file when used with --init
    #[arg(long, requires = "init")]
    pub force: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Console report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ReportFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// JSON report for scripting
    Json,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a field delimiter.
///
/// Accepts a single ASCII character, or the names `tab`, `comma`, `semicolon`
/// and `pipe` (case-insensitive). `\t` is accepted for tab.
///
/// # Examples
///
/// ```
/// use rowdupe::cli::parse_delimiter;
///
/// assert_eq!(parse_delimiter(";").unwrap(), ';');
/// assert_eq!(parse_delimiter("tab").unwrap(), '\t');
/// assert!(parse_delimiter("ab").is_err());
/// ```
///
/// # Errors
///
/// Returns an error if the value is empty, longer than one character, or not ASCII.
pub fn parse_delimiter(s: &str) -> Result<char, String> {
    match s.to_ascii_lowercase().as_str() {
        "tab" | "\\t" => return Ok('\t'),
        "comma" => return Ok(','),
        "semicolon" => return Ok(';'),
        "pipe" => return Ok('|'),
        _ => {}
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Err("Delimiter cannot be empty".to_string()),
        (Some(c), None) if c.is_ascii() => Ok(c),
        (Some(c), None) => Err(format!("Delimiter must be an ASCII character, got '{c}'")),
        _ => Err(format!("Delimiter must be a single character, got '{s}'")),
    }
}
