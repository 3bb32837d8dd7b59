//! Configuration error type.
//!
//! Everything in here is fatal: a run with a bad configuration or missing
//! input files stops before the first simulated step.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no file ending in {suffix:?} found in {dir}")]
    MissingInput { dir: PathBuf, suffix: String },

    #[error("{count} files ending in {suffix:?} found in {dir}; expected exactly one")]
    AmbiguousInput {
        dir:    PathBuf,
        suffix: String,
        count:  usize,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for configuration handling.
pub type ConfigResult<T> = Result<T, ConfigError>;
