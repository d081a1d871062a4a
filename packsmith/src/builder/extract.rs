//! Archive extraction for miscellaneous bundles.

use std::path::Path;
use std::process::Command;

use super::{BuildError, BuildResult};

/// Extracts bundle archives into branch directories.
///
/// A trait so tests can substitute a recording extractor and the shell
/// dependency stays at the edge.
pub trait ArchiveExtractor: Send + Sync {
    /// Extract `archive` (tar.gz) into `dest`, creating it as needed.
    fn extract(&self, archive: &Path, dest: &Path) -> BuildResult<()>;
}

/// Shell-based extractor using the system `tar`, the same tool the
/// archives are produced with.
#[derive(Debug, Default)]
pub struct ShellTarExtractor;

impl ShellTarExtractor {
    /// Create a new shell-based extractor.
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveExtractor for ShellTarExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> BuildResult<()> {
        std::fs::create_dir_all(dest).map_err(|source| BuildError::Io {
            path: dest.to_path_buf(),
            source,
        })?;
        let output = Command::new("tar")
            .arg("-xzf")
            .arg(archive)
            .arg("-C")
            .arg(dest)
            .output()
            .map_err(|e| BuildError::Extract {
                archive: archive.to_path_buf(),
                reason: format!("failed to run tar: {}", e),
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BuildError::Extract {
                archive: archive.to_path_buf(),
                reason: format!("tar extraction failed: {}", stderr.trim()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Builds a small tar.gz fixture with the system tar.
    fn make_archive(dir: &Path) -> std::path::PathBuf {
        let content_dir = dir.join("content");
        std::fs::create_dir_all(content_dir.join("sub")).unwrap();
        std::fs::write(content_dir.join("sub/file.txt"), b"payload").unwrap();
        let archive = dir.join("bundle.tar.gz");
        let status = Command::new("tar")
            .arg("-czf")
            .arg(&archive)
            .arg("-C")
            .arg(&content_dir)
            .arg(".")
            .status()
            .unwrap();
        assert!(status.success());
        archive
    }

    #[test]
    fn test_extract_round_trip() {
        let dir = TempDir::new().unwrap();
        let archive = make_archive(dir.path());
        let dest = dir.path().join("out");

        ShellTarExtractor::new().extract(&archive, &dest).unwrap();
        let extracted = std::fs::read(dest.join("sub/file.txt")).unwrap();
        assert_eq!(extracted, b"payload");
    }

    #[test]
    fn test_extract_invalid_archive_fails() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("broken.tar.gz");
        std::fs::write(&archive, b"not an archive").unwrap();
        let err = ShellTarExtractor::new().extract(&archive, &dir.path().join("out"));
        assert!(matches!(err, Err(BuildError::Extract { .. })));
    }
}
