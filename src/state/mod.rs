//! State management module
//! 
//! This module contains the timer state machine, its persisted record and
//! the application state shared with the HTTP handlers.

pub mod app_state;
pub mod controller;
pub mod record;
pub mod reset_prompt;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use controller::{TimerController, TimerSnapshot};
pub use record::PersistedRecord;
pub use reset_prompt::{ResetGate, ResetPrompt};
pub use timer_state::{TimerAction, TimerPhase, TimerState};
