// src/application/structure_generator.rs
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::application::ContentRepository;
use crate::domain::{ContentStructure, DomainError};
use crate::infrastructure::index_file;

/// Body returned by a successful generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub message: String,
    pub structure: ContentStructure,
    pub output_path: String,
}

/// Flattens the content tree into the structure index file.
pub struct StructureGenerator<R: ContentRepository> {
    repository: R,
    output: PathBuf,
}

impl<R: ContentRepository> StructureGenerator<R> {
    pub fn new(repository: R, output: impl Into<PathBuf>) -> Self {
        Self {
            repository,
            output: output.into(),
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Public URL of the index, e.g. `/mst.json`.
    pub fn public_path(&self) -> String {
        let name = self
            .output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("/{name}")
    }

    /// Walk modules, subjects and topic folders.
    ///
    /// A missing root fails. A subject or module that disappears between
    /// listing and reading is skipped.
    pub fn build_structure(&self) -> Result<ContentStructure, DomainError> {
        let mut structure = ContentStructure::new();

        for module in self.repository.list_modules()? {
            let subjects = match self.repository.list_subjects(&module) {
                Ok(subjects) => subjects,
                Err(e) if e.is_not_found() => {
                    debug!(%module, "Module vanished during scan");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let mut by_subject = BTreeMap::new();
            for subject in subjects {
                match self.repository.list_topics(&module, &subject) {
                    Ok(topics) => {
                        by_subject.insert(subject, topics);
                    }
                    Err(e) if e.is_not_found() => {
                        debug!(%module, %subject, "Subject vanished during scan");
                    }
                    Err(e) => return Err(e),
                }
            }
            structure.insert(module, by_subject);
        }

        Ok(structure)
    }

    /// Build the structure and persist it as the index file
    pub fn generate(&self) -> Result<GenerationReport, DomainError> {
        let structure = self.build_structure()?;
        index_file::write_index(&self.output, &structure)?;

        let output_path = self.public_path();
        info!(
            modules = structure.len(),
            output = %self.output.display(),
            "Structure index generated"
        );

        let message = format!("{} generated successfully", output_path.trim_start_matches('/'));
        Ok(GenerationReport {
            message,
            structure,
            output_path,
        })
    }

    /// Previously generated index, if any.
    pub fn read_index(&self) -> Result<Option<ContentStructure>, DomainError> {
        index_file::read_index(&self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::MockContentRepository;
    use tempfile::TempDir;

    fn repository() -> MockContentRepository {
        MockContentRepository::builder()
            .with_topic_folder("HEM", "Pathology", "anemia")
            .with_topic_folder("HEM", "Pathology", "leukemia")
            .with_topic_folder("CARDIO", "Anatomy", "heart")
            .with_subject("CARDIO", "Physiology")
            .with_module("NEURO")
            .build()
    }

    #[test]
    fn given_tree_when_building_structure_then_nests_three_levels() {
        let temp_dir = TempDir::new().unwrap();
        let generator = StructureGenerator::new(repository(), temp_dir.path().join("mst.json"));

        let structure = generator.build_structure().unwrap();

        assert_eq!(
            structure["HEM"]["Pathology"],
            vec!["anemia".to_string(), "leukemia".to_string()]
        );
        assert!(structure["CARDIO"]["Physiology"].is_empty());
        assert!(structure["NEURO"].is_empty());
        assert_eq!(structure.len(), 3);
    }

    #[test]
    fn given_tree_when_generating_then_writes_index_and_reports_public_path() {
        // Arrange
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("mst.json");
        let generator = StructureGenerator::new(repository(), &output);

        // Act
        let report = generator.generate().unwrap();

        // Assert
        assert_eq!(report.output_path, "/mst.json");
        assert_eq!(report.message, "mst.json generated successfully");
        let written = generator.read_index().unwrap().unwrap();
        assert_eq!(written, report.structure);
    }

    #[test]
    fn given_missing_root_when_generating_then_fails_without_writing() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("mst.json");
        let repo = MockContentRepository::builder().without_root().build();
        let generator = StructureGenerator::new(repo, &output);

        let result = generator.generate();

        assert!(matches!(result, Err(DomainError::PathNotFound(_))));
        assert!(!output.exists());
    }

    #[test]
    fn given_no_index_when_reading_then_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let generator = StructureGenerator::new(repository(), temp_dir.path().join("mst.json"));

        assert!(generator.read_index().unwrap().is_none());
    }
}
