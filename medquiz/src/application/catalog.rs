// src/application/catalog.rs
use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};

use crate::application::ContentRepository;
use crate::domain::{CatalogEntry, Difficulty, TopicInfo};

/// Builds the topic catalog by walking module → subject → topic and reading
/// each topic's `info.json`.
pub struct CatalogBuilder<R: ContentRepository> {
    repository: R,
}

impl<R: ContentRepository> CatalogBuilder<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Never fails: unreadable branches are logged and left out.
    pub fn build(&self) -> Vec<CatalogEntry> {
        let mut entries = Vec::new();

        let modules = match self.repository.list_modules() {
            Ok(modules) => modules,
            Err(e) => {
                error!(error = %e, "Failed to scan modules directory");
                return entries;
            }
        };

        for module in &modules {
            let subjects = match self.repository.list_subjects(module) {
                Ok(subjects) => subjects,
                Err(e) => {
                    warn!(%module, error = %e, "Failed to scan subjects");
                    continue;
                }
            };

            for subject in &subjects {
                let topics = match self.repository.list_topics(module, subject) {
                    Ok(topics) => topics,
                    Err(e) => {
                        warn!(%module, %subject, error = %e, "Failed to scan topics");
                        continue;
                    }
                };

                for topic_folder in &topics {
                    match self.repository.read_topic_info(module, subject, topic_folder) {
                        Ok(info) => {
                            debug!(%module, %subject, %topic_folder, "Discovered topic");
                            entries.push(CatalogEntry::new(module, subject, topic_folder, info));
                        }
                        Err(e) => {
                            warn!(%module, %subject, %topic_folder, error = %e, "Failed to load topic info");
                        }
                    }
                }
            }
        }

        info!(topics = entries.len(), modules = modules.len(), "Catalog built");
        entries
    }
}

/// Practice-page filters. Unset fields match everything; set fields AND together.
#[derive(Debug, Clone, Default)]
pub struct TopicFilter {
    /// Case-insensitive substring of title or subject
    pub search: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub exam_type: Option<String>,
    pub subject: Option<String>,
    pub year: Option<u32>,
}

impl TopicFilter {
    pub fn matches(&self, info: &TopicInfo) -> bool {
        let search_ok = match self.search.as_deref().map(str::to_lowercase) {
            Some(term) if !term.is_empty() => {
                info.title.to_lowercase().contains(&term)
                    || info.subject.to_lowercase().contains(&term)
            }
            _ => true,
        };

        search_ok
            && self.difficulty.map_or(true, |d| info.difficulty == Some(d))
            && self
                .exam_type
                .as_ref()
                .map_or(true, |e| info.exam_type.contains(e))
            && self.subject.as_ref().map_or(true, |s| &info.subject == s)
            && self.year.map_or(true, |y| info.year == y)
    }

    pub fn apply<'a>(&self, entries: &'a [CatalogEntry]) -> Vec<&'a CatalogEntry> {
        entries.iter().filter(|e| self.matches(&e.info)).collect()
    }
}

/// Exam types across all entries, in first-seen order.
pub fn unique_exam_types(entries: &[CatalogEntry]) -> Vec<String> {
    let mut seen = Vec::new();
    for exam in entries.iter().flat_map(|e| e.info.exam_type.iter()) {
        if !seen.contains(exam) {
            seen.push(exam.clone());
        }
    }
    seen
}

/// Subjects across all entries, sorted.
pub fn unique_subjects(entries: &[CatalogEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.info.subject.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
