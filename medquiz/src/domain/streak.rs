// src/domain/streak.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Questions answered on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_questions: u64,
    pub avg_questions: f64,
}

impl ActivityStats {
    /// Streaks over the records dated up to `today`.
    ///
    /// A missing day breaks a streak the same way a zero count does. The
    /// current streak is zero unless today itself has activity.
    pub fn compute(records: &[DailyActivity], today: NaiveDate) -> Self {
        let mut past: Vec<DailyActivity> = records
            .iter()
            .copied()
            .filter(|r| r.date <= today)
            .collect();
        past.sort_by_key(|r| r.date);

        let total_questions: u64 = past.iter().map(|r| u64::from(r.count)).sum();
        let avg_questions = if past.is_empty() {
            0.0
        } else {
            total_questions as f64 / past.len() as f64
        };

        let mut longest_streak = 0;
        let mut run = 0;
        let mut previous: Option<NaiveDate> = None;
        for record in &past {
            let contiguous = previous.is_some_and(|p| p.succ_opt() == Some(record.date));
            if record.count == 0 {
                run = 0;
            } else if contiguous {
                run += 1;
            } else {
                run = 1;
            }
            longest_streak = longest_streak.max(run);
            previous = Some(record.date);
        }

        let today_active = past
            .last()
            .is_some_and(|r| r.date == today && r.count > 0);
        let current_streak = if today_active { run } else { 0 };

        Self {
            current_streak,
            longest_streak,
            total_questions,
            avg_questions,
        }
    }
}
