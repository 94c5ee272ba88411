// src/infrastructure/index_file.rs
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::{ContentStructure, DomainError};

/// Write the structure index as pretty JSON.
///
/// The file is written to a sibling temp file and renamed into place, so
/// readers never observe a half-written index.
pub fn write_index(path: &Path, structure: &ContentStructure) -> Result<(), DomainError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| DomainError::Io {
        path: parent.to_path_buf(),
        source: e,
    })?;

    let json = serde_json::to_string_pretty(structure).map_err(|e| DomainError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let io_err = |e: std::io::Error| DomainError::Io {
        path: path.to_path_buf(),
        source: e,
    };
    let mut tmp = NamedTempFile::new_in(parent).map_err(io_err)?;
    tmp.write_all(json.as_bytes()).map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    debug!(path = %path.display(), bytes = json.len(), "Wrote structure index");
    Ok(())
}

/// Read a previously written index. A missing file is `None`.
pub fn read_index(path: &Path) -> Result<Option<ContentStructure>, DomainError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(DomainError::from_io(path, e)),
    };
    let structure = serde_json::from_str(&content).map_err(|e| DomainError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(Some(structure))
}
