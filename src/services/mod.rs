//! External collaborators module
//! 
//! This module contains the key-value stores the timer persists to, the
//! ordered write queue in front of them, and the wall-clock sources.

pub mod clock;
pub mod persistence;
pub mod store;

// Re-export main types
pub use clock::{Clock, ManualClock, SystemClock};
pub use persistence::{PersistenceQueue, WriteOp};
pub use store::{FileStore, KeyValueStore, MemoryStore};
