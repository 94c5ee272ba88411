// src/ports/terminal.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::io::{BufRead, Write};
use tracing::{debug, instrument};

use crate::domain::{
    ActivityStats, AnswerOutcome, CatalogEntry, DomainError, QuizPhase, QuizRunner, SessionStats,
    StudySession, TimerState, TopicData,
};
use crate::util::text::{format_clock, format_duration, format_minutes_seconds};

/// Plain-text rendering for the command line.
#[derive(Debug, Default)]
pub struct TerminalPresenter;

impl TerminalPresenter {
    pub fn new() -> Self {
        Self
    }

    pub fn render_names(&self, names: &[String]) -> String {
        names.join("\n")
    }

    pub fn render_catalog(&self, entries: &[&CatalogEntry]) -> String {
        if entries.is_empty() {
            return "No topics match the current filters.".to_string();
        }
        entries
            .iter()
            .map(|e| {
                let exams = if e.info.exam_type.is_empty() {
                    "-".to_string()
                } else {
                    e.info.exam_type.join("/")
                };
                format!(
                    "{}/{}\t{}\t{}\t{}\tyear {}\t{}",
                    e.module,
                    e.topic_folder,
                    e.info.title,
                    e.info.subject,
                    e.info.difficulty.map_or("-".to_string(), |d| d.to_string()),
                    e.info.year,
                    exams
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render_timer(&self, timer: &TimerState, now_ms: i64) -> String {
        let mut out = format!(
            "{}  {}",
            format_clock(timer.display_seconds(now_ms)),
            timer.status_label()
        );
        if !timer.current_subject.is_empty() {
            out.push_str(&format!("\nSubject: {}", timer.current_subject));
        }
        if !timer.current_tags.is_empty() {
            out.push_str(&format!("\nTags: {}", timer.current_tags));
        }
        out
    }

    pub fn render_sessions(&self, sessions: &[&StudySession]) -> String {
        if sessions.is_empty() {
            return "No study sessions recorded.".to_string();
        }
        sessions
            .iter()
            .map(|s| {
                let mut line = format!(
                    "{}\t{}\t{}",
                    s.id,
                    s.subject,
                    format_duration(s.duration)
                );
                if !s.tags.is_empty() {
                    line.push_str(&format!("\t[{}]", s.tags.join(", ")));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render_stats(&self, stats: &SessionStats) -> String {
        format!(
            "Today: {}\nThis week: {}\nSessions: {}",
            format_duration(stats.today_seconds),
            format_duration(stats.week_seconds),
            stats.total_sessions
        )
    }

    pub fn render_activity(&self, stats: &ActivityStats) -> String {
        format!(
            "Current streak: {} days\nLongest streak: {} days\nTotal questions: {}\nAverage per day: {:.1}",
            stats.current_streak, stats.longest_streak, stats.total_questions, stats.avg_questions
        )
    }

    fn render_question(&self, runner: &QuizRunner, now: DateTime<Utc>) -> String {
        let Some(question) = runner.current_question() else {
            return String::new();
        };
        let mut out = format!(
            "\nQuestion {}/{}  [{}]  {}% done\n{}\n",
            runner.question_index() + 1,
            runner.total(),
            format_minutes_seconds(runner.elapsed_secs(now)),
            progress_percent(runner),
            question.question_text
        );
        if let Some(url) = &question.image_url {
            let alt = question.image_alt.as_deref().unwrap_or("image");
            out.push_str(&format!("({alt}: {url})\n"));
        }
        for (i, option) in question.options.iter().enumerate() {
            out.push_str(&format!("  {}) {}\n", i + 1, option));
        }
        out
    }

    fn render_reveal(&self, runner: &QuizRunner, outcome: AnswerOutcome) -> String {
        let Some(question) = runner.current_question() else {
            return String::new();
        };
        let verdict = match outcome {
            AnswerOutcome::Correct => "Correct!".to_string(),
            _ => format!("Incorrect. The answer is: {}", question.correct_answer),
        };
        let mut out = verdict;
        if !question.explanation.is_empty() {
            out.push_str(&format!("\n{}", question.explanation));
        }
        for reference in &question.references {
            out.push_str(&format!("\n  ref: {reference}"));
        }
        out.push_str(&format!("\nProgress: {}%", progress_percent(runner)));
        out
    }

    pub fn render_result(&self, runner: &QuizRunner, now: DateTime<Utc>) -> String {
        format!(
            "\nScore: {}/{} ({}%)\nTime: {}\n{}",
            runner.score(),
            runner.total(),
            runner.percentage(),
            format_minutes_seconds(runner.elapsed_secs(now)),
            runner.verdict().message()
        )
    }
}

fn progress_percent(runner: &QuizRunner) -> u32 {
    (runner.progress() * 100.0).round() as u32
}

/// Drive a loaded quiz interactively: numbered answers, Enter to advance,
/// `q` to quit, `r` to retake at the end or to reload after a failed load.
/// Ends on quit or end of input.
#[instrument(level = "debug", skip_all)]
pub fn play_quiz<R, W, C, L>(
    runner: &mut QuizRunner,
    input: &mut R,
    out: &mut W,
    clock: C,
    mut reload: L,
) -> Result<()>
where
    R: BufRead,
    W: Write,
    C: Fn() -> DateTime<Utc>,
    L: FnMut() -> Result<TopicData, DomainError>,
{
    let presenter = TerminalPresenter::new();

    loop {
        let phase = runner.phase().clone();
        match phase {
            QuizPhase::Failed(message) => {
                writeln!(out, "Error: {message}")?;
                write!(out, "Retry? (r to retry, Enter to exit): ")?;
                out.flush()?;
                match read_line(input)? {
                    Some(line) if line.eq_ignore_ascii_case("r") => {
                        runner.retry()?;
                        runner.load(reload())?;
                    }
                    _ => break,
                }
            }
            QuizPhase::Ready => {
                if let Some(topic) = runner.topic() {
                    writeln!(out, "{} ({} questions)", topic.title, topic.questions.len())?;
                }
                runner.start(clock())?;
            }
            QuizPhase::InProgress if runner.revealed().is_none() => {
                write!(out, "{}", presenter.render_question(runner, clock()))?;
                write!(out, "Your answer: ")?;
                out.flush()?;
                let Some(line) = read_line(input)? else {
                    break;
                };
                if line.eq_ignore_ascii_case("q") {
                    break;
                }
                let choice = match line.parse::<usize>() {
                    Ok(n) if n > 0 => n - 1,
                    _ => {
                        writeln!(out, "Enter the number of an option.")?;
                        continue;
                    }
                };
                match runner.answer_index(choice) {
                    Ok(outcome) => {
                        debug!(?outcome, "Answered question");
                        writeln!(out, "{}", presenter.render_reveal(runner, outcome))?;
                    }
                    Err(e) => writeln!(out, "{e}")?,
                }
            }
            QuizPhase::InProgress => {
                write!(out, "Press Enter to continue (q to quit): ")?;
                out.flush()?;
                let Some(line) = read_line(input)? else {
                    break;
                };
                if line.eq_ignore_ascii_case("q") {
                    break;
                }
                runner.next(clock())?;
            }
            QuizPhase::Completed => {
                writeln!(out, "{}", presenter.render_result(runner, clock()))?;
                write!(out, "Retake? (r to retake, Enter to exit): ")?;
                out.flush()?;
                match read_line(input)? {
                    Some(line) if line.eq_ignore_ascii_case("r") => runner.reset(clock())?,
                    _ => break,
                }
            }
            _ => break,
        }
    }

    Ok(())
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("Failed to read from input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
