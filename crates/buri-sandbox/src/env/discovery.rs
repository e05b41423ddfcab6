//! Locate the interpreter of an isolated environment under a directory.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::EnvError;

/// File names a venv interpreter can have (POSIX `bin/python`, Windows `Scripts\python.exe`).
const INTERPRETER_NAMES: &[&str] = &["python", "python.exe"];

/// Directories holding installed packages; they may carry nested interpreters
/// that do not belong to the environment itself.
const PACKAGE_STORAGE_MARKER: &str = "site-packages";

/// Walk `root` for a venv interpreter.
///
/// Returns `Ok(None)` when there is none (or `root` does not exist) and
/// `AmbiguousEnvironment` when more than one is found. Symlinks are not followed.
pub fn discover_interpreter(root: &Path) -> Result<Option<PathBuf>, EnvError> {
    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_package_storage(e))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            // A missing root just means there is no environment yet.
            Err(e) if e.depth() == 0 && !root.exists() => None,
            Err(e) => {
                tracing::warn!(
                    "Skipping unreadable entry {} while searching {}: {}",
                    e.path().map(|p| p.display().to_string()).unwrap_or_default(),
                    root.display(),
                    e
                );
                None
            }
        })
        .filter(|e| !e.file_type().is_dir())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|name| INTERPRETER_NAMES.contains(&name))
        })
        .map(DirEntry::into_path)
        .collect();

    tracing::debug!(root = %root.display(), candidates = ?found, "interpreter search");

    match found.len() {
        0 | 1 => Ok(found.pop()),
        _ => {
            found.sort();
            Err(EnvError::AmbiguousEnvironment {
                root: root.to_path_buf(),
                paths: found,
            })
        }
    }
}

fn is_package_storage(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_string_lossy()
            .contains(PACKAGE_STORAGE_MARKER)
}
