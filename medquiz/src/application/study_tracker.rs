// src/application/study_tracker.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::constants::{SESSIONS_KEY, TIMER_KEY};
use crate::domain::session::export_csv;
use crate::domain::{SessionFilter, SessionStats, StudySession, TimerState};

/// String-keyed JSON storage, the local stand-in for browser localStorage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn set(&mut self, key: &str, value: Value) -> Result<()>;
}

/// Study timer plus session history, persisted after every change.
pub struct StudyTracker<S: KeyValueStore> {
    store: S,
    timer: TimerState,
    sessions: Vec<StudySession>,
}

impl<S: KeyValueStore> StudyTracker<S> {
    /// Restore state from the store. Values that fail to parse are logged and
    /// replaced by empty state.
    pub fn open(store: S) -> Result<Self> {
        let sessions = load_or_default(&store, SESSIONS_KEY)?;
        let timer = load_or_default(&store, TIMER_KEY)?;
        Ok(Self {
            store,
            timer,
            sessions,
        })
    }

    pub fn timer(&self) -> &TimerState {
        &self.timer
    }

    /// Newest first
    pub fn sessions(&self) -> &[StudySession] {
        &self.sessions
    }

    pub fn set_details(&mut self, subject: &str, tags: &str, notes: &str) -> Result<()> {
        self.timer.set_details(subject, tags, notes)?;
        self.save_timer()
    }

    pub fn start(&mut self, now_ms: i64) -> Result<()> {
        self.timer.start(now_ms)?;
        info!(subject = %self.timer.current_subject, "Study timer started");
        self.save_timer()
    }

    pub fn pause(&mut self, now_ms: i64) -> Result<()> {
        self.timer.pause(now_ms)?;
        debug!(seconds = self.timer.paused_time, "Study timer paused");
        self.save_timer()
    }

    pub fn resume(&mut self, now_ms: i64) -> Result<()> {
        self.timer.resume(now_ms)?;
        debug!("Study timer resumed");
        self.save_timer()
    }

    pub fn stop(&mut self, now_ms: i64) -> Result<StudySession> {
        let session = self.timer.stop(now_ms)?;
        info!(
            id = %session.id,
            subject = %session.subject,
            duration = session.duration,
            "Study session saved"
        );
        self.sessions.insert(0, session.clone());
        self.save_sessions()?;
        self.save_timer()?;
        Ok(session)
    }

    pub fn reset(&mut self) -> Result<()> {
        self.timer.reset();
        debug!("Study timer reset");
        self.save_timer()
    }

    pub fn filtered(&self, filter: &SessionFilter, now_ms: i64) -> Vec<&StudySession> {
        filter.apply(&self.sessions, now_ms)
    }

    pub fn stats(&self, now: DateTime<Local>) -> SessionStats {
        let today_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
            .map_or(now.timestamp_millis(), |t| t.timestamp_millis());
        SessionStats::compute(&self.sessions, now.timestamp_millis(), today_start)
    }

    pub fn export_csv(&self, filter: &SessionFilter, now_ms: i64) -> String {
        export_csv(self.filtered(filter, now_ms))
    }

    fn save_timer(&mut self) -> Result<()> {
        let value = serde_json::to_value(&self.timer).context("Failed to serialize timer state")?;
        self.store.set(TIMER_KEY, value)
    }

    /// An empty history is never written, so a fresh store stays untouched.
    fn save_sessions(&mut self) -> Result<()> {
        if self.sessions.is_empty() {
            return Ok(());
        }
        let value = serde_json::to_value(&self.sessions).context("Failed to serialize sessions")?;
        self.store.set(SESSIONS_KEY, value)
    }
}

fn load_or_default<T: DeserializeOwned + Default>(store: &impl KeyValueStore, key: &str) -> Result<T> {
    let Some(value) = store.get(key)? else {
        return Ok(T::default());
    };
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            warn!(%key, error = %e, "Failed to parse saved value, starting empty");
            Ok(T::default())
        }
    }
}
