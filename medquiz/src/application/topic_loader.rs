// src/application/topic_loader.rs
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

use crate::application::directory_scanner::validate_segment;
use crate::application::ContentRepository;
use crate::constants::MODULES_DIR;
use crate::domain::{DomainError, TopicData};

/// The four URL segments that address one question set:
/// `module/subject/topicFolder/topicFile`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicLocator {
    pub module: String,
    pub subject: String,
    pub topic_folder: String,
    pub topic_file: String,
}

impl TopicLocator {
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Result<Self, DomainError> {
        let [module, subject, topic_folder, topic_file] = segments else {
            return Err(DomainError::InvalidSlug);
        };
        Ok(Self {
            module: validate_segment(module.as_ref())?.to_string(),
            subject: validate_segment(subject.as_ref())?.to_string(),
            topic_folder: validate_segment(topic_folder.as_ref())?.to_string(),
            topic_file: validate_segment(topic_file.as_ref())?.to_string(),
        })
    }

    /// Check a locator that arrived already split, e.g. from URL path params.
    pub fn validated(self) -> Result<Self, DomainError> {
        Self::from_segments(&[
            self.module,
            self.subject,
            self.topic_folder,
            self.topic_file,
        ])
    }

    /// Path of the question file relative to the modules root.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.module)
            .join(&self.subject)
            .join(&self.topic_folder)
            .join(format!("{}.json", self.topic_file))
    }

    /// Public URL the file is served under.
    pub fn url_path(&self) -> String {
        format!(
            "/{MODULES_DIR}/{}/{}/{}/{}.json",
            self.module, self.subject, self.topic_folder, self.topic_file
        )
    }
}

impl FromStr for TopicLocator {
    type Err = DomainError;

    /// Accepts `HEM/Pathology/anemia/anemia`, with or without surrounding slashes.
    fn from_str(slug: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = slug.trim_matches('/').split('/').collect();
        Self::from_segments(&segments)
    }
}

impl fmt::Display for TopicLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.module, self.subject, self.topic_folder, self.topic_file
        )
    }
}

pub struct TopicLoader<R: ContentRepository> {
    repository: R,
}

impl<R: ContentRepository> TopicLoader<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Fetch a question set and make sure it can be played
    pub fn load(&self, locator: &TopicLocator) -> Result<TopicData, DomainError> {
        debug!(%locator, "Loading topic");
        let topic = self.repository.read_topic_data(locator)?.validate()?;
        info!(
            %locator,
            questions = topic.questions.len(),
            "Loaded topic"
        );
        Ok(topic)
    }
}
