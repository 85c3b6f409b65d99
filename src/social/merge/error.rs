use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, MergeError>;

/// Error type covering the different failure cases that can occur when the
/// tool reads source workbooks or emits the merged dataset.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Wrapper for IO failures such as listing directories or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a composite cell cannot be serialised to JSON text.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors bubbled up from the SQLite sink.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Raised when a sheet listed by a workbook cannot be loaded.
    #[error("invalid workbook {path}: {reason}")]
    InvalidWorkbook { path: PathBuf, reason: String },

    /// Raised when the input directory does not exist.
    #[error("input directory not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
