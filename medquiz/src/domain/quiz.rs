// src/domain/quiz.rs
//
// Quiz runner: Loading -> Ready -> InProgress -> Completed, with Failed for
// topics that could not be loaded. Inside InProgress each question is either
// awaiting an answer or revealed; only a revealed question can be left.
use chrono::{DateTime, Utc};

use crate::constants::{GOOD_PERCENT, OUTSTANDING_PERCENT};
use crate::domain::{DomainError, Question, TopicData};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizPhase {
    Loading,
    /// Loading failed; holds the message shown next to the retry action.
    Failed(String),
    Ready,
    InProgress,
    Completed,
}

impl QuizPhase {
    fn name(&self) -> &'static str {
        match self {
            QuizPhase::Loading => "loading",
            QuizPhase::Failed(_) => "failed",
            QuizPhase::Ready => "ready",
            QuizPhase::InProgress => "in progress",
            QuizPhase::Completed => "completed",
        }
    }
}

/// The answer picked for the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revealed {
    pub selected: String,
    pub correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    /// The question was already answered; the click changes nothing.
    AlreadyAnswered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Outstanding,
    Good,
    KeepStudying,
}

impl Verdict {
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage >= OUTSTANDING_PERCENT {
            Verdict::Outstanding
        } else if percentage >= GOOD_PERCENT {
            Verdict::Good
        } else {
            Verdict::KeepStudying
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Outstanding => "Outstanding! You're ready for the boards!",
            Verdict::Good => "Good work! Keep reinforcing your knowledge.",
            Verdict::KeepStudying => "Keep studying. You'll get there!",
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Stopwatch {
    started_at: Option<DateTime<Utc>>,
    stopped_at: Option<DateTime<Utc>>,
}

impl Stopwatch {
    fn restart(&mut self, now: DateTime<Utc>) {
        self.started_at = Some(now);
        self.stopped_at = None;
    }

    fn stop(&mut self, now: DateTime<Utc>) {
        if self.started_at.is_some() && self.stopped_at.is_none() {
            self.stopped_at = Some(now);
        }
    }

    fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        match self.started_at {
            None => 0,
            Some(start) => {
                let end = self.stopped_at.unwrap_or(now);
                (end - start).num_seconds().max(0) as u64
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuizRunner {
    phase: QuizPhase,
    topic: Option<TopicData>,
    current: usize,
    revealed: Option<Revealed>,
    score: usize,
    stopwatch: Stopwatch,
}

impl Default for QuizRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizRunner {
    pub fn new() -> Self {
        Self {
            phase: QuizPhase::Loading,
            topic: None,
            current: 0,
            revealed: None,
            score: 0,
            stopwatch: Stopwatch::default(),
        }
    }

    /// Feed the outcome of fetching the topic. A failed or empty topic moves the
    /// runner to `Failed`; the error itself is not returned.
    pub fn load(&mut self, result: Result<TopicData, DomainError>) -> Result<(), DomainError> {
        self.expect_phase(&QuizPhase::Loading, "load a topic")?;

        match result.and_then(TopicData::validate) {
            Ok(topic) => {
                self.topic = Some(topic);
                self.phase = QuizPhase::Ready;
            }
            Err(e) => {
                self.topic = None;
                self.phase = QuizPhase::Failed(e.to_string());
            }
        }
        Ok(())
    }

    pub fn retry(&mut self) -> Result<(), DomainError> {
        match self.phase {
            QuizPhase::Failed(_) => {
                self.phase = QuizPhase::Loading;
                Ok(())
            }
            _ => Err(self.invalid("retry loading")),
        }
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.expect_phase(&QuizPhase::Ready, "start")?;
        self.begin(now);
        Ok(())
    }

    /// Select an answer for the current question.
    ///
    /// Only the first answer per question is scored.
    pub fn answer(&mut self, option: &str) -> Result<AnswerOutcome, DomainError> {
        self.expect_phase(&QuizPhase::InProgress, "answer")?;
        if self.revealed.is_some() {
            return Ok(AnswerOutcome::AlreadyAnswered);
        }

        let correct = self
            .current_question()
            .map(|q| q.is_correct(option))
            .unwrap_or(false);
        if correct {
            self.score += 1;
        }
        self.revealed = Some(Revealed {
            selected: option.to_string(),
            correct,
        });

        Ok(if correct {
            AnswerOutcome::Correct
        } else {
            AnswerOutcome::Incorrect
        })
    }

    /// Select an answer by its zero-based position in the option list.
    pub fn answer_index(&mut self, index: usize) -> Result<AnswerOutcome, DomainError> {
        let option = self
            .current_question()
            .and_then(|q| q.options.get(index))
            .cloned()
            .ok_or(DomainError::UnknownOption(index + 1))?;
        self.answer(&option)
    }

    /// Leave the revealed question. On the last question this completes the quiz.
    pub fn next(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.expect_phase(&QuizPhase::InProgress, "advance")?;
        if self.revealed.is_none() {
            return Err(DomainError::InvalidTransition {
                action: "advance",
                phase: "awaiting an answer",
            });
        }

        if self.current + 1 >= self.total() {
            self.phase = QuizPhase::Completed;
            self.stopwatch.stop(now);
        } else {
            self.current += 1;
            self.revealed = None;
        }
        Ok(())
    }

    /// Retake the quiz from the first question.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        match self.phase {
            QuizPhase::InProgress | QuizPhase::Completed => {
                self.begin(now);
                Ok(())
            }
            _ => Err(self.invalid("reset")),
        }
    }

    pub fn phase(&self) -> &QuizPhase {
        &self.phase
    }

    pub fn topic(&self) -> Option<&TopicData> {
        self.topic.as_ref()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.topic.as_ref()?.questions.get(self.current)
    }

    /// Zero-based index of the question on screen.
    pub fn question_index(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.topic.as_ref().map_or(0, |t| t.questions.len())
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn revealed(&self) -> Option<&Revealed> {
        self.revealed.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.phase == QuizPhase::Completed
    }

    /// Fraction of questions answered; the one on screen counts once revealed.
    pub fn progress(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => {
                let answered = self.current + usize::from(self.revealed.is_some());
                answered as f64 / total as f64
            }
        }
    }

    pub fn percentage(&self) -> u32 {
        match self.total() {
            0 => 0,
            total => ((self.score as f64 / total as f64) * 100.0).round() as u32,
        }
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_percentage(self.percentage())
    }

    /// Seconds on the clock. Runs from start (or reset) until completion.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        self.stopwatch.elapsed_secs(now)
    }

    fn begin(&mut self, now: DateTime<Utc>) {
        self.phase = QuizPhase::InProgress;
        self.current = 0;
        self.revealed = None;
        self.score = 0;
        self.stopwatch.restart(now);
    }

    fn expect_phase(&self, expected: &QuizPhase, action: &'static str) -> Result<(), DomainError> {
        if &self.phase == expected {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> DomainError {
        DomainError::InvalidTransition {
            action,
            phase: self.phase.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::sample_topic_data;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn started_runner(questions: usize) -> QuizRunner {
        let mut runner = QuizRunner::new();
        runner.load(Ok(sample_topic_data("Cardio", questions))).unwrap();
        runner.start(t0()).unwrap();
        runner
    }

    #[test]
    fn given_valid_topic_when_loading_then_becomes_ready() {
        let mut runner = QuizRunner::new();

        runner.load(Ok(sample_topic_data("Cardio", 3))).unwrap();

        assert_eq!(runner.phase(), &QuizPhase::Ready);
        assert_eq!(runner.total(), 3);
    }

    #[test]
    fn given_empty_topic_when_loading_then_fails_with_message() {
        let mut runner = QuizRunner::new();

        runner.load(Ok(sample_topic_data("Empty", 0))).unwrap();

        match runner.phase() {
            QuizPhase::Failed(msg) => assert!(msg.contains("No questions found")),
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn given_failed_load_when_retrying_then_returns_to_loading() {
        let mut runner = QuizRunner::new();
        runner
            .load(Err(DomainError::TopicNotFound("/Modules/x.json".to_string())))
            .unwrap();

        runner.retry().unwrap();

        assert_eq!(runner.phase(), &QuizPhase::Loading);
        runner.load(Ok(sample_topic_data("Cardio", 1))).unwrap();
        assert_eq!(runner.phase(), &QuizPhase::Ready);
    }

    #[test]
    fn given_ready_quiz_when_answering_before_start_then_rejects() {
        let mut runner = QuizRunner::new();
        runner.load(Ok(sample_topic_data("Cardio", 2))).unwrap();

        let result = runner.answer("Option A");

        assert!(matches!(result, Err(DomainError::InvalidTransition { .. })));
    }

    #[test]
    fn given_wrong_answers_in_any_order_when_scoring_then_score_is_identical() {
        // Arrange: sample questions have "Option A" as the correct answer
        let mut first = started_runner(1);
        let mut second = started_runner(1);

        // Act
        first.answer("Option B").unwrap();
        first.answer("Option C").unwrap();
        first.answer("Option A").unwrap();

        second.answer("Option C").unwrap();
        second.answer("Option A").unwrap();
        second.answer("Option B").unwrap();

        // Assert
        assert_eq!(first.score(), 0);
        assert_eq!(second.score(), 0);
        assert_eq!(first.revealed().unwrap().selected, "Option B");
        assert_eq!(second.revealed().unwrap().selected, "Option C");
    }

    #[test]
    fn given_revealed_question_when_answering_again_then_reports_already_answered() {
        let mut runner = started_runner(2);

        assert_eq!(runner.answer("Option A").unwrap(), AnswerOutcome::Correct);
        assert_eq!(
            runner.answer("Option A").unwrap(),
            AnswerOutcome::AlreadyAnswered
        );

        assert_eq!(runner.score(), 1);
    }

    #[test]
    fn given_unanswered_question_when_advancing_then_rejects() {
        let mut runner = started_runner(2);

        let result = runner.next(t0());

        assert!(result.is_err());
        assert_eq!(runner.question_index(), 0);
    }

    #[test]
    fn given_one_answer_when_advancing_twice_then_moves_exactly_once() {
        let mut runner = started_runner(3);
        runner.answer("Option A").unwrap();

        runner.next(t0()).unwrap();
        let second = runner.next(t0());

        assert_eq!(runner.question_index(), 1);
        assert!(second.is_err());
        assert!(runner.revealed().is_none());
    }

    #[test]
    fn given_answer_revealed_when_measuring_progress_then_counts_question_once() {
        // Arrange
        let mut runner = started_runner(4);
        let before = runner.progress();

        // Act
        runner.answer("Option B").unwrap();
        let revealed = runner.progress();
        runner.next(t0()).unwrap();
        let advanced = runner.progress();

        // Assert
        assert_eq!(before, 0.0);
        assert_eq!(revealed, 0.25);
        assert_eq!(advanced, 0.25);
    }

    #[test]
    fn given_last_question_unanswered_when_checking_then_not_completed() {
        let mut runner = started_runner(2);
        runner.answer("Option A").unwrap();
        runner.next(t0()).unwrap();

        assert!(!runner.is_completed());
        assert!(runner.next(t0()).is_err());
        assert!(!runner.is_completed());
    }

    #[test]
    fn given_last_answer_revealed_when_advancing_then_completes() {
        let mut runner = started_runner(2);
        runner.answer("Option A").unwrap();
        runner.next(t0()).unwrap();
        runner.answer("Option D").unwrap();

        assert!(!runner.is_completed());
        runner.next(t0() + Duration::seconds(95)).unwrap();

        assert!(runner.is_completed());
        assert_eq!(runner.score(), 1);
        assert_eq!(runner.percentage(), 50);
        assert_eq!(runner.verdict(), Verdict::KeepStudying);
    }

    #[test]
    fn given_completed_quiz_when_checking_clock_then_stops_at_completion() {
        let mut runner = started_runner(1);
        runner.answer("Option A").unwrap();
        runner.next(t0() + Duration::seconds(42)).unwrap();

        let elapsed = runner.elapsed_secs(t0() + Duration::seconds(600));

        assert_eq!(elapsed, 42);
    }

    #[test]
    fn given_completed_quiz_when_resetting_then_starts_over() {
        let mut runner = started_runner(1);
        runner.answer("Option A").unwrap();
        runner.next(t0()).unwrap();

        runner.reset(t0() + Duration::seconds(10)).unwrap();

        assert_eq!(runner.phase(), &QuizPhase::InProgress);
        assert_eq!(runner.score(), 0);
        assert_eq!(runner.question_index(), 0);
        assert_eq!(runner.elapsed_secs(t0() + Duration::seconds(15)), 5);
    }

    #[test]
    fn given_option_index_out_of_range_when_answering_then_rejects() {
        let mut runner = started_runner(1);

        let result = runner.answer_index(9);

        assert!(matches!(result, Err(DomainError::UnknownOption(10))));
        assert!(runner.revealed().is_none());
    }

    #[test]
    fn given_percentages_when_judging_then_uses_score_bands() {
        assert_eq!(Verdict::from_percentage(80), Verdict::Outstanding);
        assert_eq!(Verdict::from_percentage(79), Verdict::Good);
        assert_eq!(Verdict::from_percentage(60), Verdict::Good);
        assert_eq!(Verdict::from_percentage(59), Verdict::KeepStudying);
    }

    #[test]
    fn given_three_questions_when_scoring_two_then_rounds_percentage() {
        let mut runner = started_runner(3);
        for answer in ["Option A", "Option A", "Option B"] {
            runner.answer(answer).unwrap();
            runner.next(t0()).unwrap();
        }

        assert_eq!(runner.percentage(), 67);
        assert_eq!(runner.verdict(), Verdict::Good);
    }
}
