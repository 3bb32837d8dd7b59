use thiserror::Error;

use tsc_adapter::AdapterError;
use tsc_control::ControlError;
use tsc_core::ConfigError;

#[derive(Debug, Error)]
pub enum EpisodeError {
    #[error("simulation failure: {0}")]
    Adapter(#[from] AdapterError),

    #[error("control failure: {0}")]
    Control(#[from] ControlError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("scenario {scenario:?} did not drain within {limit} steps")]
    StepLimit { scenario: String, limit: u64 },

    #[error("{what} length {got} does not match intersection count {expected}")]
    IntersectionCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },
}

pub type EpisodeResult<T> = Result<T, EpisodeError>;
