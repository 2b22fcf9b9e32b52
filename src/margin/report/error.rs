use std::path::PathBuf;

use thiserror::Error;

use crate::margin::report::io::table::TableKind;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Error type covering the hard failures that abort a report computation.
///
/// Unmatched identifiers and empty join results are not errors; they travel
/// inside [`ProfitReport`](crate::model::ProfitReport) instead.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when delimited text cannot be parsed or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a workbook does not contain a readable worksheet.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when an input table lacks one of its required columns.
    #[error("{table} table is missing required column '{column}'")]
    MissingColumn { table: TableKind, column: String },

    /// Raised when a column that must come from exactly one table appears in both.
    #[error("column '{column}' is present in both the sales and the reference table")]
    AmbiguousColumn { column: String },

    /// Raised when a numeric cell cannot be parsed.
    #[error("invalid number '{value}' in {table} table, column '{column}', row {row}")]
    InvalidNumber {
        table: TableKind,
        column: String,
        row: usize,
        value: String,
    },

    /// Raised when a previously exported result cannot be decoded.
    #[error("malformed export: {0}")]
    MalformedExport(String),

    /// Raised when a profit or unit total leaves the representable range.
    #[error("numeric overflow while computing {0}")]
    NumericOverflow(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when an output path cannot receive a file, e.g. it is a directory.
    #[error("output path is not writable as a file: {0}")]
    InvalidOutput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
