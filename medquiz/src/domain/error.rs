// src/domain/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{0}")]
    MissingParameter(&'static str),
    #[error("Invalid path segment: {0:?}")]
    InvalidSegment(String),
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),
    #[error("Invalid URL format. Expected: /topics/[module]/[subject]/[topic_folder]/[topic_file]")]
    InvalidSlug,
    #[error("Topic file not found: {0}")]
    TopicNotFound(String),
    #[error("Invalid topic data: {0}")]
    InvalidTopic(String),
    #[error("Cannot {action} while the quiz is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },
    #[error("Option {0} does not exist for this question")]
    UnknownOption(usize),
    #[error("Timer error: {0}")]
    TimerError(&'static str),
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl DomainError {
    /// Wrap an I/O error, turning `NotFound` into [`DomainError::PathNotFound`].
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            DomainError::PathNotFound(path)
        } else {
            DomainError::Io { path, source }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::PathNotFound(_) | DomainError::TopicNotFound(_)
        )
    }
}
