//! Persisted timer record: four independent string keys in a key-value store

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use super::TimerState;
use crate::{error::StoreError, services::KeyValueStore};

pub const KEY_START_TIME: &str = "startTime";
pub const KEY_STARTED: &str = "started";
pub const KEY_PAUSED: &str = "paused";
pub const KEY_DURATION: &str = "duration";

/// Raw values as read from the store, before parsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedRecord {
    pub start_time: Option<String>,
    pub started: Option<String>,
    pub paused: Option<String>,
    pub duration: Option<String>,
}

impl PersistedRecord {
    /// Read all four keys. Any failing read fails the whole record.
    pub async fn read(store: &dyn KeyValueStore) -> Result<Self, StoreError> {
        let record = Self {
            start_time: store.get(KEY_START_TIME).await?,
            started: store.get(KEY_STARTED).await?,
            paused: store.get(KEY_PAUSED).await?,
            duration: store.get(KEY_DURATION).await?,
        };
        debug!("Read persisted record: {:?}", record);
        Ok(record)
    }

    /// Parse the record into a timer state.
    ///
    /// Absent keys take their defaults; any malformed value is an error.
    /// The result always satisfies the `start_time` invariant: a running
    /// record without a stored start time restarts its interval at `now`,
    /// and a stored start time is dropped unless the timer is running.
    pub fn decode(&self, now: DateTime<Utc>) -> Result<TimerState, StoreError> {
        let started = decode_flag(KEY_STARTED, self.started.as_deref())?;
        let paused = decode_flag(KEY_PAUSED, self.paused.as_deref())?;
        let accumulated_ms = decode_duration(self.duration.as_deref())?;
        let start_time = self
            .start_time
            .as_deref()
            .map(decode_start_time)
            .transpose()?;

        let state = match (started, paused) {
            (false, _) => TimerState::new(),
            (true, true) => TimerState::paused(accumulated_ms),
            (true, false) => TimerState::running(start_time.unwrap_or(now), accumulated_ms),
        };
        Ok(state)
    }
}

pub fn encode_flag(value: bool) -> String {
    value.to_string()
}

pub fn encode_duration(millis: u64) -> String {
    millis.to_string()
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-03-01T12:00:00.000Z`
pub fn encode_start_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn decode_flag(key: &str, raw: Option<&str>) -> Result<bool, StoreError> {
    match raw {
        None => Ok(false),
        Some(raw) => serde_json::from_str::<bool>(raw.trim()).map_err(|e| StoreError::corrupt(key, e)),
    }
}

fn decode_duration(raw: Option<&str>) -> Result<u64, StoreError> {
    match raw {
        None => Ok(0),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| StoreError::corrupt(KEY_DURATION, e)),
    }
}

fn decode_start_time(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|time| time.with_timezone(&Utc))
        .map_err(|e| StoreError::corrupt(KEY_START_TIME, e))
}
