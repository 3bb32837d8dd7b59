//! Error types for tsc-output.

use thiserror::Error;

use tsc_control::ControlError;

/// Errors that can occur when writing run output or reading saved tables.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Q-table file: {0}")]
    Format(String),

    #[error(transparent)]
    Control(#[from] ControlError),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
