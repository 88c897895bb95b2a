//! Error types shared across the timer and its persistence layer

use thiserror::Error;

use crate::state::{TimerAction, TimerPhase};

/// Errors raised by timer operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// The requested action is not valid from the current phase
    #[error("cannot {action} a timer that is {phase}")]
    InvalidTransition {
        phase: TimerPhase,
        action: TimerAction,
    },

    /// A reset confirmation referred to a prompt that is not pending
    #[error("no pending reset prompt with id {0}")]
    NoPendingReset(u64),
}

/// Errors raised by a key-value store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value for `{key}` is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn corrupt(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::Corrupt {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}
