//! Diff-aware file writes.

use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::warn;

use super::{BuildError, BuildResult};

/// Hex SHA-256 digest of a byte slice.
pub fn content_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Writes `bytes` to `path` only when the content differs.
///
/// Returns `true` when a physical write happened. This is the
/// load-bearing optimization of the whole pipeline: unchanged files keep
/// their modification state, so downstream commits stay minimal and
/// remote branches see no churn. A digest-comparison failure degrades to
/// an unconditional overwrite.
pub async fn write_if_changed(path: &Path, bytes: &[u8]) -> BuildResult<bool> {
    match fs::read(path).await {
        Ok(existing) => {
            if content_digest(&existing) == content_digest(bytes) {
                return Ok(false);
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!(path = %path.display(), error = %e, "digest comparison failed, overwriting");
        }
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(|source| BuildError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, bytes).await.map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

/// Removes a file, treating an absent file as already removed.
pub async fn remove_if_present(path: &Path) -> BuildResult<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(BuildError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
