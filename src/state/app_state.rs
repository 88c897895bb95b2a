//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::debug;

use super::TimerController;
use crate::tasks::{AppLifecycle, Screen};

/// Application state shared with the HTTP handlers
pub struct AppState {
    /// The mounted timer screen, owning the controller's active lifetime
    pub screen: Screen,
    /// Channel the host app reports lifecycle changes on
    pub lifecycle_tx: broadcast::Sender<AppLifecycle>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Mount the timer screen and create the application state
    pub fn new(controller: Arc<TimerController>, port: u16, host: String) -> Self {
        let (lifecycle_tx, lifecycle_rx) = broadcast::channel(16);

        Self {
            screen: Screen::mount(controller, lifecycle_rx),
            lifecycle_tx,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    pub fn controller(&self) -> &Arc<TimerController> {
        self.screen.controller()
    }

    /// Record the last user action for status reporting
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Forward a lifecycle change to the mounted screen
    pub fn notify_lifecycle(&self, event: AppLifecycle) -> Result<(), String> {
        self.lifecycle_tx
            .send(event)
            .map(|listeners| debug!("Lifecycle {} sent to {} listeners", event, listeners))
            .map_err(|e| format!("Failed to send lifecycle event: {}", e))
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
