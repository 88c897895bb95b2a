//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    state::{ResetPrompt, TimerPhase, TimerSnapshot},
    tasks::AppLifecycle,
};

/// Buttons the screen shows for a phase
pub fn buttons_for(phase: TimerPhase) -> Vec<String> {
    let labels: &[&str] = match phase {
        TimerPhase::Idle => &["START"],
        TimerPhase::Running => &["RESET", "PAUSE"],
        TimerPhase::Paused => &["RESET", "RESUME"],
    };
    labels.iter().map(|label| label.to_string()).collect()
}

/// API response structure for timer action endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_prompt: Option<ResetPrompt>,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
            reset_prompt: None,
        }
    }

    /// Create a successful response
    pub fn ok(message: String, timer: TimerSnapshot) -> Self {
        Self::new("ok".to_string(), message, timer)
    }

    /// Create a response carrying an open reset prompt
    pub fn prompt(prompt: ResetPrompt, timer: TimerSnapshot) -> Self {
        Self {
            reset_prompt: Some(prompt),
            ..Self::new("confirm".to_string(), "Reset requires confirmation".to_string(), timer)
        }
    }

    /// Create an error response
    pub fn error(message: String, timer: TimerSnapshot) -> Self {
        Self::new("error".to_string(), message, timer)
    }
}

/// Status response: everything the screen renders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub buttons: Vec<String>,
    pub reset_prompt: Option<ResetPrompt>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Acknowledgement of a lifecycle event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleResponse {
    pub status: String,
    pub event: AppLifecycle,
    pub timestamp: DateTime<Utc>,
}

impl LifecycleResponse {
    pub fn accepted(event: AppLifecycle) -> Self {
        Self {
            status: "accepted".to_string(),
            event,
            timestamp: Utc::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
