// src/domain/mod.rs
pub mod content;
pub mod error;
pub mod question;
pub mod quiz;
pub mod session;
pub mod streak;

pub use content::{CatalogEntry, ContentStructure, Difficulty, TopicInfo};
pub use error::DomainError;
pub use question::{Question, QuestionType, TopicData};
pub use quiz::{AnswerOutcome, QuizPhase, QuizRunner, Revealed, Verdict};
pub use session::{DateRange, SessionFilter, SessionStats, StudySession, TimerState};
pub use streak::{ActivityStats, DailyActivity};
