//! Cancellable periodic display refresh

use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

/// Shortest period a loop will tick at
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Periodic task that runs a callback every `period` until stopped.
///
/// At most one task is live at a time; starting again replaces the previous
/// one. Dropping the loop cancels it.
#[derive(Debug)]
pub struct RefreshLoop {
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl RefreshLoop {
    /// Periods below one millisecond are raised to it.
    pub fn new(period: Duration) -> Self {
        if period < MIN_PERIOD {
            warn!("Refresh period {:?} too short, using {:?}", period, MIN_PERIOD);
        }

        Self {
            period: period.max(MIN_PERIOD),
            handle: None,
        }
    }

    /// Start ticking. The first tick fires one period from now.
    pub fn start<F>(&mut self, mut on_tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.stop();

        let period = self.period;
        self.handle = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                on_tick();
            }
        }));
        debug!("Refresh loop started ({}ms)", period.as_millis());
    }

    /// Cancel the running task, if any. Returns whether one was running.
    pub fn stop(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                debug!("Refresh loop stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for RefreshLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
