//! Timer state structure and transitions

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TimerError;

/// Phase of the timer, derived from the `started` and `paused` flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    /// Never started, or reset since
    Idle,
    /// Accruing time
    Running,
    /// Stopped, retaining the accumulated duration
    Paused,
}

impl fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// User actions that drive the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerAction {
    Start,
    Pause,
    Resume,
    Reset,
}

impl fmt::Display for TimerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimerAction::Start => "start",
            TimerAction::Pause => "pause",
            TimerAction::Resume => "resume",
            TimerAction::Reset => "reset",
        };
        f.write_str(name)
    }
}

/// In-memory timer state.
///
/// `start_time` is set exactly while the timer is running. `accumulated_ms`
/// holds the time accrued by every previous running interval.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerState {
    pub started: bool,
    pub paused: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub accumulated_ms: u64,
}

impl TimerState {
    /// Create an idle timer state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a running timer state whose current interval began at `start_time`
    pub fn running(start_time: DateTime<Utc>, accumulated_ms: u64) -> Self {
        Self {
            started: true,
            paused: false,
            start_time: Some(start_time),
            accumulated_ms,
        }
    }

    /// Create a paused timer state
    pub fn paused(accumulated_ms: u64) -> Self {
        Self {
            started: true,
            paused: true,
            start_time: None,
            accumulated_ms,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        match (self.started, self.paused) {
            (false, _) => TimerPhase::Idle,
            (true, false) => TimerPhase::Running,
            (true, true) => TimerPhase::Paused,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase() == TimerPhase::Running
    }

    /// Total elapsed milliseconds as of `now`
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> u64 {
        match self.start_time {
            Some(start) if self.is_running() => {
                self.accumulated_ms.saturating_add(interval_ms(start, now))
            }
            _ => self.accumulated_ms,
        }
    }

    /// Idle -> Running
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), TimerError> {
        self.expect_phase(TimerPhase::Idle, TimerAction::Start)?;
        *self = Self::running(now, 0);
        Ok(())
    }

    /// Running -> Paused, folding the current interval into the accumulated
    /// duration. Returns the new accumulated duration.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<u64, TimerError> {
        self.expect_phase(TimerPhase::Running, TimerAction::Pause)?;
        *self = Self::paused(self.elapsed_ms(now));
        Ok(self.accumulated_ms)
    }

    /// Paused -> Running
    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), TimerError> {
        self.expect_phase(TimerPhase::Paused, TimerAction::Resume)?;
        *self = Self::running(now, self.accumulated_ms);
        Ok(())
    }

    /// Any phase -> Idle
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn expect_phase(&self, expected: TimerPhase, action: TimerAction) -> Result<(), TimerError> {
        let phase = self.phase();
        if phase == expected {
            Ok(())
        } else {
            Err(TimerError::InvalidTransition { phase, action })
        }
    }
}

/// Milliseconds between two instants; a clock that went backwards yields zero
fn interval_ms(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from((now - start).num_milliseconds()).unwrap_or(0)
}
