//! Filesystem infrastructure: implements `ArtifactFiles` and streamed hashing.

use std::io::Read;
use std::path::{Path, PathBuf};

use agent_metadata_common::Digest;
use anyhow::{Context, Result};
use sha2::{Digest as _, Sha256};

use crate::application::ports::ArtifactFiles;
use crate::domain::error::PathError;
use crate::domain::path::{check_declared_path, resolve_artifact_path};

/// Production filesystem implementation of `ArtifactFiles`.
pub struct LocalFs;

impl ArtifactFiles for LocalFs {
    fn validate_binary_path(&self, workspace: &Path, declared: &str) -> Result<PathBuf, PathError> {
        validate_binary_path(workspace, declared)
    }
}

/// Traversal is rejected before any stat; then the resolved path must be a
/// readable, non-empty regular file.
///
/// # Errors
///
/// Returns the first [`PathError`] that applies.
pub fn validate_binary_path(workspace: &Path, declared: &str) -> Result<PathBuf, PathError> {
    check_declared_path(declared)?;

    let resolved = resolve_artifact_path(workspace, declared);
    let shown = resolved.display().to_string();
    let metadata = std::fs::metadata(&resolved).map_err(|_| PathError::NotFound(shown.clone()))?;
    if metadata.is_dir() {
        return Err(PathError::IsDirectory(shown));
    }
    if metadata.len() == 0 {
        return Err(PathError::EmptyFile(shown));
    }
    // Readable, not just present.
    std::fs::File::open(&resolved).map_err(|_| PathError::NotFound(shown))?;

    Ok(resolved)
}

/// SHA-256 digest and byte length of a file.
///
/// Reads the file in 64 KB chunks to avoid loading large binaries into memory.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn sha256_file(path: &Path) -> Result<(Digest, u64)> {
    let mut file =
        std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 65536];
    let mut size = 0u64;
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("reading {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        size += n as u64;
    }
    let hash: [u8; 32] = hasher.finalize().into();
    Ok((Digest::from_sha256(&hash), size))
}
