//! Background tasks module
//! 
//! This module contains the display refresh loop and the lifecycle listener
//! owned by the mounted screen.

pub mod lifecycle;
pub mod refresh;

// Re-export main types
pub use lifecycle::{AppLifecycle, Screen};
pub use refresh::RefreshLoop;
