//! Pure artifact path rules, no filesystem access.
//!
//! The stat-based checks live in `crate::infra::fs`; everything here can run
//! before any I/O so a traversal attempt never reaches the filesystem.

use std::path::{Path, PathBuf};

use crate::domain::error::PathError;

/// Returns `true` if any `/`- or `\`-separated segment of `path` is exactly `..`.
#[must_use]
pub fn has_traversal_segment(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| segment == "..")
}

/// Reject declared paths that try to climb out of the workspace (CWE-22).
///
/// # Errors
///
/// Returns [`PathError::DirectoryTraversal`] if the path has a `..` segment.
pub fn check_declared_path(path: &str) -> Result<(), PathError> {
    if has_traversal_segment(path) {
        return Err(PathError::DirectoryTraversal(path.to_string()));
    }
    Ok(())
}

/// Join a declared path onto the workspace root. Absolute paths pass through.
#[must_use]
pub fn resolve_artifact_path(workspace: &Path, path: &str) -> PathBuf {
    let declared = Path::new(path);
    if declared.is_absolute() {
        declared.to_path_buf()
    } else {
        workspace.join(declared)
    }
}
