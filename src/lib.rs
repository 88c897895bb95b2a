//! Stopwatch - a single-screen stopwatch service
//! 
//! This library provides a start/pause/resume/reset timer whose state is
//! persisted to a key-value store, survives restarts and backgrounding, and
//! is served over HTTP as a single screen.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{StoreError, TimerError};
pub use state::{AppState, TimerController};
pub use api::{create_router, serve};
pub use utils::signals::shutdown_signal;
