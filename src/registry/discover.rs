//! Candidate role-file discovery: recursive walk with the merged output and
//! the schema document excluded.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{RegistryError, INDEX_FILE, SCHEMA_FILE};

/// Collect every candidate `.json` role source under `root`.
///
/// Traversal is sorted by file name so merge concatenation order is stable
/// across runs on an unchanged tree. A missing or unreadable root (or any
/// unreadable entry under it) is an error; there is no partial-skip policy
/// for unreadable files.
pub fn discover_role_files(root: &Path) -> Result<Vec<PathBuf>, RegistryError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|err| RegistryError::Walk {
            path: root.to_path_buf(),
            source: err,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().map_or(true, |ext| ext != "json") {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name == INDEX_FILE || name == SCHEMA_FILE {
            continue;
        }
        files.push(entry.path().to_path_buf());
    }
    Ok(files)
}
