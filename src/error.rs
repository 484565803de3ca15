use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Fatal failures that abort a run before any report is printed.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Wrapper for IO failures such as listing a directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the workbook cannot be opened or a sheet cannot be decoded.
    #[error("failed to read workbook: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a directory holds no `.xlsx` workbook to pick from.
    #[error("no .xlsx workbook found in {0}")]
    NoWorkbookFound(PathBuf),

    /// Raised when the workbook does not contain the expected sheet.
    #[error("sheet '{sheet}' not found; workbook contains: {}", .available.join(", "))]
    MissingSheet {
        sheet: String,
        available: Vec<String>,
    },

    /// Raised when the header row lacks a column the cleaner depends on.
    #[error("sheet '{sheet}' has no '{column}' column in its header row")]
    MissingColumn { sheet: String, column: String },

    /// Raised when the configured week ends before it starts.
    #[error("week start {start} is after week end {end}")]
    InvalidWeek { start: NaiveDate, end: NaiveDate },

    /// Raised when only one of the explicit week bounds was supplied.
    #[error("--week-start and --week-end must be given together")]
    IncompleteWeek,

    /// Raised when JSON serialization of a report fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Reasons a single spreadsheet row is discarded by the cleaner.
///
/// These never abort a run; they are collected alongside the cleaned records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowParseError {
    #[error("empty ControlId")]
    MissingControlId,

    #[error("no date in column '{column}'")]
    MissingDate { column: String },

    #[error("unparsable date '{value}' in column '{column}'")]
    InvalidDate { column: String, value: String },

    #[error("window starts {start} after it ends {end}")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },
}
