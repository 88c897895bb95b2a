//! App lifecycle events and the screen that listens to them

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::state::TimerController;

/// Foreground/background state reported by the host app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppLifecycle {
    Active,
    Inactive,
    Background,
}

impl fmt::Display for AppLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AppLifecycle::Active => "active",
            AppLifecycle::Inactive => "inactive",
            AppLifecycle::Background => "background",
        };
        f.write_str(name)
    }
}

/// The mounted timer screen.
///
/// While it lives, lifecycle events are forwarded to the controller. Dropping
/// it unsubscribes and stops the refresh loop.
pub struct Screen {
    controller: Arc<TimerController>,
    listener: JoinHandle<()>,
}

impl Screen {
    pub fn mount(controller: Arc<TimerController>, events: broadcast::Receiver<AppLifecycle>) -> Self {
        let listener = tokio::spawn(lifecycle_listener(Arc::clone(&controller), events));
        info!("Timer screen mounted");
        Self { controller, listener }
    }

    pub fn controller(&self) -> &Arc<TimerController> {
        &self.controller
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        self.listener.abort();
        self.controller.enter_background();
        debug!("Timer screen unmounted");
    }
}

async fn lifecycle_listener(controller: Arc<TimerController>, mut events: broadcast::Receiver<AppLifecycle>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                debug!("App lifecycle changed: {}", event);
                controller.handle_lifecycle(event);
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Lifecycle listener lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                debug!("Lifecycle channel closed");
                break;
            }
        }
    }
}
