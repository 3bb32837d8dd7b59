use thiserror::Error;

use tsc_core::{ActionIndex, ConfigError, IntersectionId, StateIndex};

use crate::DegenerateWindow;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("expected {expected} approach counts, got {got}")]
    ApproachMismatch { expected: usize, got: usize },

    #[error("{state} outside a table of {states} states")]
    StateOutOfRange { state: StateIndex, states: usize },

    #[error("{action} outside a table of {actions} actions")]
    ActionOutOfRange { action: ActionIndex, actions: usize },

    #[error("table shape {got:?} does not match configured shape {expected:?}")]
    TableShape {
        expected: (usize, usize),
        got:      (usize, usize),
    },

    #[error("expected {expected} agent tables, got {got}")]
    AgentCount { expected: usize, got: usize },

    #[error("{intersection}: {source}")]
    DegenerateWindow {
        intersection: IntersectionId,
        #[source]
        source:       DegenerateWindow,
    },

    #[error("{intersection}: observation is missing {what}")]
    MissingObservation {
        intersection: IntersectionId,
        what:         &'static str,
    },

    #[error("unknown intersection {0:?}")]
    UnknownIntersection(String),
}

pub type ControlResult<T> = Result<T, ControlError>;
