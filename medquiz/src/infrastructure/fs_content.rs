// src/infrastructure/fs_content.rs
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::application::{ContentRepository, TopicLocator};
use crate::constants::TOPIC_INFO_FILE;
use crate::domain::{DomainError, TopicData, TopicInfo};

/// Content tree on the local filesystem, rooted at the `Modules` directory.
#[derive(Debug, Clone)]
pub struct FsContentRepository {
    root: PathBuf,
}

impl FsContentRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        debug!(root = %root.display(), "Using content directory");
        Self { root }
    }

    /// Names of the immediate subdirectories of `dir`, sorted. Files are ignored.
    fn list_dirs(&self, dir: &Path) -> Result<Vec<String>, DomainError> {
        let meta = std::fs::metadata(dir).map_err(|e| DomainError::from_io(dir, e))?;
        if !meta.is_dir() {
            return Err(DomainError::PathNotFound(dir.to_path_buf()));
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) => names.push(name.to_string()),
                None => warn!(path = %entry.path().display(), "Skipping non UTF-8 directory name"),
            }
        }

        trace!(dir = %dir.display(), count = names.len(), "Listed directories");
        Ok(names)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DomainError> {
    let content = std::fs::read_to_string(path).map_err(|e| DomainError::from_io(path, e))?;
    serde_json::from_str(&content).map_err(|e| DomainError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

impl ContentRepository for FsContentRepository {
    fn list_modules(&self) -> Result<Vec<String>, DomainError> {
        self.list_dirs(&self.root)
    }

    fn list_subjects(&self, module: &str) -> Result<Vec<String>, DomainError> {
        self.list_dirs(&self.root.join(module))
    }

    fn list_topics(&self, module: &str, subject: &str) -> Result<Vec<String>, DomainError> {
        self.list_dirs(&self.root.join(module).join(subject))
    }

    fn read_topic_info(
        &self,
        module: &str,
        subject: &str,
        topic_folder: &str,
    ) -> Result<TopicInfo, DomainError> {
        let path = self
            .root
            .join(module)
            .join(subject)
            .join(topic_folder)
            .join(TOPIC_INFO_FILE);
        read_json(&path)
    }

    fn read_topic_data(&self, locator: &TopicLocator) -> Result<TopicData, DomainError> {
        let path = self.root.join(locator.relative_path());
        read_json(&path).map_err(|e| match e {
            DomainError::PathNotFound(_) => DomainError::TopicNotFound(locator.url_path()),
            other => other,
        })
    }
}
