// src/application/directory_scanner.rs
use std::sync::Arc;

use crate::application::TopicLocator;
use crate::domain::{DomainError, TopicData, TopicInfo};
use tracing::debug;

/// Read access to the Module/Subject/Topic content tree.
///
/// Listing methods return the names of immediate subdirectories only, sorted.
/// An absent directory is reported as [`DomainError::PathNotFound`].
pub trait ContentRepository {
    fn list_modules(&self) -> Result<Vec<String>, DomainError>;

    fn list_subjects(&self, module: &str) -> Result<Vec<String>, DomainError>;

    fn list_topics(&self, module: &str, subject: &str) -> Result<Vec<String>, DomainError>;

    /// Parse `info.json` of one topic folder
    fn read_topic_info(
        &self,
        module: &str,
        subject: &str,
        topic_folder: &str,
    ) -> Result<TopicInfo, DomainError>;

    /// Parse the question-set file a locator points at
    fn read_topic_data(&self, locator: &TopicLocator) -> Result<TopicData, DomainError>;
}

impl<R: ContentRepository + ?Sized> ContentRepository for Arc<R> {
    fn list_modules(&self) -> Result<Vec<String>, DomainError> {
        (**self).list_modules()
    }

    fn list_subjects(&self, module: &str) -> Result<Vec<String>, DomainError> {
        (**self).list_subjects(module)
    }

    fn list_topics(&self, module: &str, subject: &str) -> Result<Vec<String>, DomainError> {
        (**self).list_topics(module, subject)
    }

    fn read_topic_info(
        &self,
        module: &str,
        subject: &str,
        topic_folder: &str,
    ) -> Result<TopicInfo, DomainError> {
        (**self).read_topic_info(module, subject, topic_folder)
    }

    fn read_topic_data(&self, locator: &TopicLocator) -> Result<TopicData, DomainError> {
        (**self).read_topic_data(locator)
    }
}

/// Reject segments that would leave the directory they are joined onto.
pub fn validate_segment(segment: &str) -> Result<&str, DomainError> {
    let bad = segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(|c: char| matches!(c, '/' | '\\' | '\0'));
    if bad {
        return Err(DomainError::InvalidSegment(segment.to_string()));
    }
    Ok(segment)
}

pub struct DirectoryScanner<R: ContentRepository> {
    repository: R,
}

impl<R: ContentRepository> DirectoryScanner<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn modules(&self) -> Result<Vec<String>, DomainError> {
        self.repository.list_modules()
    }

    pub fn subjects(&self, module: Option<&str>) -> Result<Vec<String>, DomainError> {
        let module = required(module).ok_or(DomainError::MissingParameter(
            "Module parameter is required",
        ))?;
        self.repository.list_subjects(validate_segment(module)?)
    }

    pub fn topics(
        &self,
        module: Option<&str>,
        subject: Option<&str>,
    ) -> Result<Vec<String>, DomainError> {
        let (Some(module), Some(subject)) = (required(module), required(subject)) else {
            return Err(DomainError::MissingParameter(
                "Module and subject parameters are required",
            ));
        };
        self.repository
            .list_topics(validate_segment(module)?, validate_segment(subject)?)
    }

    /// List one level below the root plus zero, one or two segments.
    ///
    /// A subject without a module is a missing parameter.
    pub fn scan(
        &self,
        module: Option<&str>,
        subject: Option<&str>,
    ) -> Result<Vec<String>, DomainError> {
        debug!(?module, ?subject, "Scanning content directory");
        match (required(module), required(subject)) {
            (None, None) => self.modules(),
            (Some(_), None) => self.subjects(module),
            _ => self.topics(module, subject),
        }
    }
}

/// Empty query values count as absent.
fn required(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::MockContentRepository;

    fn repository() -> MockContentRepository {
        MockContentRepository::builder()
            .with_topic_folder("HEM", "Pathology", "anemia")
            .with_topic_folder("HEM", "Pathology", "leukemia")
            .with_topic_folder("HEM", "Physiology", "clotting")
            .with_module("CARDIO")
            .build()
    }

    #[test]
    fn given_no_segments_when_scanning_then_lists_modules() {
        let scanner = DirectoryScanner::new(repository());

        let result = scanner.scan(None, None).unwrap();

        assert_eq!(result, vec!["CARDIO", "HEM"]);
    }

    #[test]
    fn given_module_when_scanning_then_lists_subjects() {
        let scanner = DirectoryScanner::new(repository());

        let result = scanner.scan(Some("HEM"), None).unwrap();

        assert_eq!(result, vec!["Pathology", "Physiology"]);
    }

    #[test]
    fn given_module_and_subject_when_scanning_then_lists_topics() {
        let scanner = DirectoryScanner::new(repository());

        let result = scanner.scan(Some("HEM"), Some("Pathology")).unwrap();

        assert_eq!(result, vec!["anemia", "leukemia"]);
    }

    #[test]
    fn given_missing_module_when_listing_subjects_then_reports_missing_parameter() {
        let scanner = DirectoryScanner::new(repository());

        let result = scanner.subjects(None);

        assert!(matches!(
            result,
            Err(DomainError::MissingParameter("Module parameter is required"))
        ));
    }

    #[test]
    fn given_empty_subject_when_listing_topics_then_reports_missing_parameter() {
        let scanner = DirectoryScanner::new(repository());

        let result = scanner.topics(Some("HEM"), Some(""));

        assert!(matches!(result, Err(DomainError::MissingParameter(_))));
    }

    #[test]
    fn given_subject_without_module_when_scanning_then_reports_missing_parameter() {
        let scanner = DirectoryScanner::new(repository());

        let result = scanner.scan(None, Some("Pathology"));

        assert!(matches!(result, Err(DomainError::MissingParameter(_))));
    }

    #[test]
    fn given_unknown_module_when_listing_subjects_then_reports_not_found() {
        let scanner = DirectoryScanner::new(repository());

        let result = scanner.subjects(Some("NEURO"));

        assert!(matches!(result, Err(DomainError::PathNotFound(_))));
    }

    #[test]
    fn given_parent_segment_when_listing_subjects_then_rejects() {
        let scanner = DirectoryScanner::new(repository());

        let result = scanner.subjects(Some(".."));

        assert!(matches!(result, Err(DomainError::InvalidSegment(_))));
    }

    #[test]
    fn given_segment_with_separator_when_validating_then_rejects() {
        assert!(validate_segment("HEM/../../etc").is_err());
        assert!(validate_segment("a\\b").is_err());
        assert_eq!(validate_segment("Internal Medicine").unwrap(), "Internal Medicine");
    }
}
