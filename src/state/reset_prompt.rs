//! Confirmation step guarding a timer reset

use serde::{Deserialize, Serialize};

use crate::error::TimerError;

pub const RESET_TITLE: &str = "Reset timer?";
pub const RESET_MESSAGE: &str = "This will reset your timer to zero.";

/// Confirmation dialog shown before a reset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPrompt {
    pub id: u64,
    pub title: String,
    pub message: String,
    pub actions: Vec<String>,
}

impl ResetPrompt {
    fn new(id: u64) -> Self {
        Self {
            id,
            title: RESET_TITLE.to_string(),
            message: RESET_MESSAGE.to_string(),
            actions: vec!["Cancel".to_string(), "Reset".to_string()],
        }
    }
}

/// Tracks the single pending reset prompt
#[derive(Debug, Default)]
pub struct ResetGate {
    pending: Option<ResetPrompt>,
    next_id: u64,
}

impl ResetGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new prompt, replacing any prompt still pending
    pub fn open(&mut self) -> ResetPrompt {
        self.next_id += 1;
        let prompt = ResetPrompt::new(self.next_id);
        self.pending = Some(prompt.clone());
        prompt
    }

    /// Close the prompt with the given id
    pub fn close(&mut self, id: u64) -> Result<ResetPrompt, TimerError> {
        match self.pending.take() {
            Some(prompt) if prompt.id == id => Ok(prompt),
            other => {
                self.pending = other;
                Err(TimerError::NoPendingReset(id))
            }
        }
    }

    pub fn pending(&self) -> Option<&ResetPrompt> {
        self.pending.as_ref()
    }
}
