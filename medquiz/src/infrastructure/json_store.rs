use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::application::KeyValueStore;

/// Key/value store kept as one JSON object on disk.
///
/// Every `set` rewrites the whole file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileStore {
    /// Load the store from file, or start empty if the file doesn't exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read study data file {}", path.display()))?;
            serde_json::from_str(&content).with_context(|| {
                format!(
                    "Failed to parse study data JSON in {} (delete it to start fresh)",
                    path.display()
                )
            })?
        } else {
            Map::new()
        };

        debug!(path = %path.display(), keys = values.len(), "Opened study data store");
        Ok(Self { path, values })
    }

    fn save(&self) -> Result<()> {
        let json =
            serde_json::to_string_pretty(&self.values).context("Failed to serialize study data")?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir).context("Failed to create study data directory")?;

        let mut tmp = NamedTempFile::new_in(dir).context("Failed to create temp file")?;
        tmp.write_all(json.as_bytes())
            .context("Failed to write study data")?;
        tmp.persist(&self.path)
            .context("Failed to replace study data file")?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.save()
    }
}
