//! Structured error handling and exit codes.

use serde::Serialize;

use crate::duplicates::AnalyzerError;
use crate::table::TableError;

/// Exit codes for the rowdupe application.
///
/// - 0: Success (analysis completed and duplicates were found)
/// - 1: General error (bad input, unknown column, I/O failure)
/// - 2: No duplicates found (every row is a single)
/// - 3: Empty output (nothing to export, no CSV written)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Analysis completed and duplicates were found.
    Success = 0,
    /// An error occurred.
    GeneralError = 1,
    /// Analysis completed but no duplicate patterns exist.
    NoDuplicates = 2,
    /// Analysis produced no rows to export.
    EmptyOutput = 3,
    /// Interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "RW000",
            Self::GeneralError => "RW001",
            Self::NoDuplicates => "RW002",
            Self::EmptyOutput => "RW003",
            Self::Interrupted => "RW130",
        }
    }

    /// Classify a top-level error.
    ///
    /// Interruptions raised by either the reader or the analyzer map to
    /// [`ExitCode::Interrupted`]; everything else is a general error.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        let interrupted = matches!(
            err.downcast_ref::<AnalyzerError>(),
            Some(AnalyzerError::Interrupted)
        ) || matches!(
            err.downcast_ref::<TableError>(),
            Some(TableError::Interrupted)
        );
        if interrupted {
            Self::Interrupted
        } else {
            Self::GeneralError
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "RW001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
