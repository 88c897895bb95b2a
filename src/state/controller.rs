//! Timer controller: the state machine wired to persistence, display and
//! the refresh loop

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{
    record::{
        encode_duration, encode_flag, encode_start_time, PersistedRecord, KEY_DURATION,
        KEY_PAUSED, KEY_STARTED, KEY_START_TIME,
    },
    ResetGate, ResetPrompt, TimerAction, TimerPhase, TimerState,
};
use crate::{
    error::TimerError,
    services::{Clock, KeyValueStore, PersistenceQueue, WriteOp},
    tasks::{AppLifecycle, RefreshLoop},
    utils::format::{format_elapsed, ZERO_DISPLAY},
};

/// Point-in-time view of the timer as the screen shows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: TimerPhase,
    pub started: bool,
    pub paused: bool,
    /// Last published display string
    pub display: String,
    pub elapsed_ms: u64,
    pub accumulated_ms: u64,
    pub start_time: Option<DateTime<Utc>>,
}

/// Owns the timer state and everything that reacts to it.
///
/// Every transition updates memory first, then enqueues its store writes on
/// the persistence queue without waiting for them. Persistence failures
/// never fail a transition.
pub struct TimerController {
    timer: Arc<Mutex<TimerState>>,
    clock: Arc<dyn Clock>,
    store: Arc<dyn KeyValueStore>,
    queue: PersistenceQueue,
    display_tx: Arc<watch::Sender<String>>,
    refresh: Mutex<RefreshLoop>,
    reset_gate: Mutex<ResetGate>,
    rehydrated: AtomicBool,
    /// Cleared while the app is backgrounded; the refresh loop only runs in
    /// the foreground
    foreground: AtomicBool,
}

impl TimerController {
    /// Create an idle controller. Must be called inside a tokio runtime.
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, refresh_period: Duration) -> Self {
        let (display_tx, _) = watch::channel(ZERO_DISPLAY.to_string());

        Self {
            timer: Arc::new(Mutex::new(TimerState::new())),
            clock,
            queue: PersistenceQueue::spawn(Arc::clone(&store)),
            store,
            display_tx: Arc::new(display_tx),
            refresh: Mutex::new(RefreshLoop::new(refresh_period)),
            reset_gate: Mutex::new(ResetGate::new()),
            rehydrated: AtomicBool::new(false),
            foreground: AtomicBool::new(true),
        }
    }

    /// Restore state from the store. Runs once; later calls only return the
    /// current snapshot. Unreadable or malformed records restore as idle.
    pub async fn rehydrate(&self) -> TimerSnapshot {
        if self.rehydrated.swap(true, Ordering::SeqCst) {
            debug!("Timer state already rehydrated, skipping");
            return self.snapshot();
        }

        let now = self.clock.now();
        let restored = PersistedRecord::read(self.store.as_ref())
            .await
            .and_then(|record| record.decode(now).map(|state| (state, record.start_time.is_none())));
        let (state, missing_start) = restored.unwrap_or_else(|e| {
            warn!("Failed to restore timer state, starting idle: {}", e);
            (TimerState::new(), false)
        });

        let mut timer = self.lock_timer();
        *timer = state;
        if let (true, Some(start_time)) = (missing_start, timer.start_time) {
            // Running record without a start time: store the one assumed here
            debug!("Running record had no start time, assuming {}", start_time);
            self.queue.enqueue(WriteOp::set(KEY_START_TIME, encode_start_time(start_time)));
        }
        self.publish(&timer, now);
        if timer.is_running() {
            self.resume_refresh();
        }

        let snapshot = self.snapshot_of(&timer, now);
        info!("Timer rehydrated: phase={}, display={}", snapshot.phase, snapshot.display);
        snapshot
    }

    /// Idle -> Running
    pub fn start(&self) -> Result<TimerSnapshot, TimerError> {
        let now = self.clock.now();
        let mut timer = self.lock_timer();
        timer.start(now)?;

        self.queue.enqueue_all([
            WriteOp::set(KEY_START_TIME, encode_start_time(now)),
            WriteOp::set(KEY_STARTED, encode_flag(true)),
            WriteOp::set(KEY_PAUSED, encode_flag(false)),
            WriteOp::set(KEY_DURATION, encode_duration(0)),
        ]);
        self.publish(&timer, now);
        self.resume_refresh();

        info!("Timer started");
        Ok(self.snapshot_of(&timer, now))
    }

    /// Running -> Paused
    pub fn pause(&self) -> Result<TimerSnapshot, TimerError> {
        let now = self.clock.now();
        let mut timer = self.lock_timer();
        let accumulated = timer.pause(now)?;

        self.stop_refresh();
        self.queue.enqueue_all([
            WriteOp::set(KEY_DURATION, encode_duration(accumulated)),
            WriteOp::remove(KEY_START_TIME),
            WriteOp::set(KEY_PAUSED, encode_flag(true)),
        ]);
        self.publish(&timer, now);

        info!("Timer paused at {}", format_elapsed(accumulated));
        Ok(self.snapshot_of(&timer, now))
    }

    /// Paused -> Running
    pub fn resume(&self) -> Result<TimerSnapshot, TimerError> {
        let now = self.clock.now();
        let mut timer = self.lock_timer();
        timer.resume(now)?;

        self.queue.enqueue_all([
            WriteOp::set(KEY_START_TIME, encode_start_time(now)),
            WriteOp::set(KEY_PAUSED, encode_flag(false)),
        ]);
        self.publish(&timer, now);
        self.resume_refresh();

        info!("Timer resumed from {}", format_elapsed(timer.accumulated_ms));
        Ok(self.snapshot_of(&timer, now))
    }

    /// Pause when running, resume when paused
    pub fn toggle(&self) -> Result<TimerSnapshot, TimerError> {
        match self.phase() {
            TimerPhase::Running => self.pause(),
            TimerPhase::Paused => self.resume(),
            phase @ TimerPhase::Idle => Err(TimerError::InvalidTransition {
                phase,
                action: TimerAction::Pause,
            }),
        }
    }

    /// Any phase -> Idle, skipping the confirmation step
    pub fn reset(&self) -> TimerSnapshot {
        let now = self.clock.now();
        let mut timer = self.lock_timer();
        let previous = timer.phase();
        timer.reset();

        self.stop_refresh();
        self.queue.enqueue_all([
            WriteOp::set(KEY_DURATION, encode_duration(0)),
            WriteOp::set(KEY_STARTED, encode_flag(false)),
            WriteOp::set(KEY_PAUSED, encode_flag(false)),
            WriteOp::remove(KEY_START_TIME),
        ]);
        self.display_tx.send_replace(ZERO_DISPLAY.to_string());

        info!("Timer reset (was {})", previous);
        self.snapshot_of(&timer, now)
    }

    /// Ask for confirmation before resetting
    pub fn request_reset(&self) -> ResetPrompt {
        let prompt = self.lock_gate().open();
        debug!("Reset prompt {} opened", prompt.id);
        prompt
    }

    /// Confirm the pending prompt and reset
    pub fn confirm_reset(&self, id: u64) -> Result<TimerSnapshot, TimerError> {
        self.lock_gate().close(id)?;
        Ok(self.reset())
    }

    /// Dismiss the pending prompt, leaving the timer untouched
    pub fn cancel_reset(&self, id: u64) -> Result<(), TimerError> {
        self.lock_gate().close(id)?;
        debug!("Reset prompt {} cancelled", id);
        Ok(())
    }

    pub fn pending_reset(&self) -> Option<ResetPrompt> {
        self.lock_gate().pending().cloned()
    }

    /// Stop refreshing; the timer itself keeps its state
    pub fn enter_background(&self) {
        let _timer = self.lock_timer();
        self.foreground.store(false, Ordering::SeqCst);
        if self.stop_refresh() {
            debug!("Refresh loop suspended while in background");
        }
    }

    /// Bring the display up to date at once and resume refreshing if running
    pub fn enter_foreground(&self) {
        let now = self.clock.now();
        let timer = self.lock_timer();
        self.foreground.store(true, Ordering::SeqCst);
        if timer.is_running() {
            self.publish(&timer, now);
            self.start_refresh();
            debug!("Refresh loop resumed in foreground");
        }
    }

    pub fn handle_lifecycle(&self, event: AppLifecycle) {
        match event {
            AppLifecycle::Background => self.enter_background(),
            AppLifecycle::Active => self.enter_foreground(),
            AppLifecycle::Inactive => {}
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.lock_timer().phase()
    }

    pub fn state(&self) -> TimerState {
        self.lock_timer().clone()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let now = self.clock.now();
        let timer = self.lock_timer();
        self.snapshot_of(&timer, now)
    }

    /// Last published display string
    pub fn display(&self) -> String {
        self.display_tx.borrow().clone()
    }

    /// Receive every published display string
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.display_tx.subscribe()
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock_refresh().is_active()
    }

    /// Wait for every write issued so far to reach the store
    pub async fn flush(&self) {
        self.queue.flush().await;
    }

    fn publish(&self, timer: &TimerState, now: DateTime<Utc>) {
        self.display_tx.send_replace(format_elapsed(timer.elapsed_ms(now)));
    }

    fn start_refresh(&self) {
        let timer = Arc::clone(&self.timer);
        let clock = Arc::clone(&self.clock);
        let display_tx = Arc::clone(&self.display_tx);

        self.lock_refresh().start(move || {
            // Publish under the state lock so a tick can never overwrite the
            // display of a transition that raced with it.
            let timer = timer.lock().unwrap_or_else(PoisonError::into_inner);
            if timer.is_running() {
                let display = format_elapsed(timer.elapsed_ms(clock.now()));
                display_tx.send_replace(display);
            }
        });
    }

    /// Start refreshing unless backgrounded; foregrounding picks it up later
    fn resume_refresh(&self) {
        if self.foreground.load(Ordering::SeqCst) {
            self.start_refresh();
        }
    }

    fn stop_refresh(&self) -> bool {
        self.lock_refresh().stop()
    }

    fn snapshot_of(&self, timer: &TimerState, now: DateTime<Utc>) -> TimerSnapshot {
        TimerSnapshot {
            phase: timer.phase(),
            started: timer.started,
            paused: timer.paused,
            display: self.display_tx.borrow().clone(),
            elapsed_ms: timer.elapsed_ms(now),
            accumulated_ms: timer.accumulated_ms,
            start_time: timer.start_time,
        }
    }

    fn lock_timer(&self) -> MutexGuard<'_, TimerState> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_refresh(&self) -> MutexGuard<'_, RefreshLoop> {
        self.refresh.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_gate(&self) -> MutexGuard<'_, ResetGate> {
        self.reset_gate.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
