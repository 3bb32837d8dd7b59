use thiserror::Error;

/// A simulation failure.  Always fatal to the running episode: the episode
/// controller never retries a failed adapter call.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("simulation has not been started")]
    NotStarted,

    #[error("simulation unreachable: {0}")]
    Unreachable(String),

    #[error("malformed simulation data: {0}")]
    Malformed(String),

    #[error("unknown intersection {0:?}")]
    UnknownIntersection(String),

    #[error("phase {phase} does not exist at intersection {intersection:?}")]
    InvalidPhase { intersection: String, phase: u32 },

    #[error("demand error: {0}")]
    Demand(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AdapterResult<T> = Result<T, AdapterError>;
