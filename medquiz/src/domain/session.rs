// src/domain/session.rs
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::DomainError;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// A finished, saved study session. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: String,
    pub subject: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
    pub start_time: i64,
    pub end_time: i64,
    /// Seconds.
    pub duration: u64,
}

/// The running (or idle) study timer plus the form it was started from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub is_running: bool,
    pub is_paused: bool,
    pub start_time: Option<i64>,
    /// Seconds accumulated before the current run segment.
    pub paused_time: u64,
    pub current_subject: String,
    /// Comma-separated, as typed.
    pub current_tags: String,
    pub current_notes: String,
}

impl TimerState {
    pub fn set_details(
        &mut self,
        subject: impl Into<String>,
        tags: impl Into<String>,
        notes: impl Into<String>,
    ) -> Result<(), DomainError> {
        if self.is_running {
            return Err(DomainError::TimerError(
                "session details cannot change while the timer runs",
            ));
        }
        self.current_subject = subject.into();
        self.current_tags = tags.into();
        self.current_notes = notes.into();
        Ok(())
    }

    pub fn start(&mut self, now_ms: i64) -> Result<(), DomainError> {
        if self.is_running {
            return Err(DomainError::TimerError("timer is already running"));
        }
        if self.current_subject.trim().is_empty() {
            return Err(DomainError::TimerError(
                "Please enter a subject before starting the timer.",
            ));
        }
        self.is_running = true;
        self.is_paused = false;
        self.start_time = Some(now_ms);
        Ok(())
    }

    pub fn pause(&mut self, now_ms: i64) -> Result<(), DomainError> {
        if !self.is_running || self.is_paused {
            return Err(DomainError::TimerError("timer is not running"));
        }
        self.paused_time = self.display_seconds(now_ms);
        self.is_paused = true;
        self.start_time = None;
        Ok(())
    }

    pub fn resume(&mut self, now_ms: i64) -> Result<(), DomainError> {
        if !self.is_running || !self.is_paused {
            return Err(DomainError::TimerError("timer is not paused"));
        }
        self.is_paused = false;
        self.start_time = Some(now_ms);
        Ok(())
    }

    /// Close the running timer into a session and clear the form.
    pub fn stop(&mut self, now_ms: i64) -> Result<StudySession, DomainError> {
        if !self.is_running {
            return Err(DomainError::TimerError("no running timer to stop"));
        }
        let duration = self.display_seconds(now_ms);
        let session = StudySession {
            id: format!("session-{now_ms}"),
            subject: self.current_subject.clone(),
            tags: parse_tags(&self.current_tags),
            notes: self.current_notes.clone(),
            start_time: now_ms - (duration as i64) * 1000,
            end_time: now_ms,
            duration,
        };
        *self = TimerState::default();
        Ok(session)
    }

    /// Discard the running timer; the form keeps its values.
    pub fn reset(&mut self) {
        self.is_running = false;
        self.is_paused = false;
        self.start_time = None;
        self.paused_time = 0;
    }

    pub fn display_seconds(&self, now_ms: i64) -> u64 {
        match self.start_time {
            Some(start) if self.is_running && !self.is_paused => {
                self.paused_time + ((now_ms - start).max(0) / 1000) as u64
            }
            _ => self.paused_time,
        }
    }

    pub fn status_label(&self) -> &'static str {
        match (self.is_running, self.is_paused) {
            (false, _) => "Ready to start",
            (true, true) => "Paused",
            (true, false) => "Running",
        }
    }
}

pub fn parse_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateRange {
    #[default]
    All,
    Last7Days,
    Last30Days,
}

impl DateRange {
    fn cutoff(&self, now_ms: i64) -> Option<i64> {
        match self {
            DateRange::All => None,
            DateRange::Last7Days => Some(now_ms - 7 * DAY_MS),
            DateRange::Last30Days => Some(now_ms - 30 * DAY_MS),
        }
    }
}

impl FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(DateRange::All),
            "7d" => Ok(DateRange::Last7Days),
            "30d" => Ok(DateRange::Last30Days),
            other => Err(format!("unknown date range '{other}' (expected all, 7d or 30d)")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub subject: Option<String>,
    pub tag: Option<String>,
    pub range: DateRange,
}

impl SessionFilter {
    pub fn matches(&self, session: &StudySession, now_ms: i64) -> bool {
        if let Some(subject) = non_blank(&self.subject) {
            if !session
                .subject
                .to_lowercase()
                .contains(&subject.to_lowercase())
            {
                return false;
            }
        }

        if let Some(tag) = non_blank(&self.tag) {
            let needle = tag.to_lowercase();
            if !session
                .tags
                .iter()
                .any(|t| t.to_lowercase().contains(&needle))
            {
                return false;
            }
        }

        match self.range.cutoff(now_ms) {
            Some(cutoff) => session.start_time >= cutoff,
            None => true,
        }
    }

    pub fn apply<'a>(&self, sessions: &'a [StudySession], now_ms: i64) -> Vec<&'a StudySession> {
        sessions
            .iter()
            .filter(|s| self.matches(s, now_ms))
            .collect()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub today_seconds: u64,
    pub week_seconds: u64,
    pub total_sessions: usize,
}

impl SessionStats {
    /// `today_start_ms` is local midnight; the week is the trailing 7 days.
    pub fn compute(sessions: &[StudySession], now_ms: i64, today_start_ms: i64) -> Self {
        let week_start = now_ms - 7 * DAY_MS;
        Self {
            today_seconds: sessions
                .iter()
                .filter(|s| s.start_time >= today_start_ms)
                .map(|s| s.duration)
                .sum(),
            week_seconds: sessions
                .iter()
                .filter(|s| s.start_time >= week_start)
                .map(|s| s.duration)
                .sum(),
            total_sessions: sessions.len(),
        }
    }
}

/// Render sessions as CSV. Every cell is quoted.
pub fn export_csv<'a>(sessions: impl IntoIterator<Item = &'a StudySession>) -> String {
    let mut lines = vec!["Subject,Tags,Start Time,End Time,Duration (min),Notes".to_string()];
    for s in sessions {
        let cells = [
            s.subject.clone(),
            s.tags.join("; "),
            local_timestamp(s.start_time),
            local_timestamp(s.end_time),
            format!("{:.2}", s.duration as f64 / 60.0),
            s.notes.clone(),
        ];
        let row = cells
            .iter()
            .map(|cell| format!("\"{}\"", cell.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(row);
    }
    lines.join("\n")
}

fn local_timestamp(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}
