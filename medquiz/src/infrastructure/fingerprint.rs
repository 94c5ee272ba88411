use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

/// SHA256 over the shape of a directory tree.
///
/// Every entry contributes its relative path, kind, size and modification time,
/// so adding, removing, renaming or rewriting anything below `root` changes the
/// result. A missing root hashes like an empty tree.
pub fn tree_fingerprint(root: impl AsRef<Path>) -> String {
    let root = root.as_ref();
    let mut hasher = Sha256::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        hasher.update(relative.to_string_lossy().as_bytes());
        hasher.update([if entry.file_type().is_dir() { b'd' } else { b'f' }]);

        if let Ok(meta) = entry.metadata() {
            hasher.update(meta.len().to_le_bytes());
            let modified = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map_or(0, |d| d.as_nanos());
            hasher.update(modified.to_le_bytes());
        }
        hasher.update([0u8]);
    }

    // Convert to lowercase hex string
    format!("{:x}", hasher.finalize())
}
