//! Comparison of a materialized tree against a reference catalog.
//!
//! Partitions the reference paths into `matching` (provided by the pack)
//! and `missing` (not yet textured), after removing entries matched by
//! the exclusion rule set. Separately computes `unused` - pack files the
//! reference no longer lists, usually leftovers from a removed release.
//!
//! The two partitioning passes share only read access to the immutable
//! input sets and run concurrently.

mod rules;

pub use rules::ExclusionRules;

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;

use thiserror::Error;
use walkdir::WalkDir;

/// Result type for validation operations.
pub type ValidateResult<T> = Result<T, ValidateError>;

/// Errors from validation.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// An exclusion pattern failed to compile.
    #[error("invalid exclusion rule {pattern}: {source}")]
    InvalidRule {
        /// The offending pattern.
        pattern: String,
        /// Compiler diagnostics.
        source: regex::Error,
    },

    /// Reading the materialized tree or writing the report failed.
    #[error("validation I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of one comparison run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonReport {
    /// Reference entries the pack provides.
    pub matching: BTreeSet<String>,
    /// Reference entries the pack does not provide.
    pub missing: BTreeSet<String>,
    /// Pack files the reference does not list (and no rule excludes).
    pub unused: BTreeSet<String>,
    /// Reference entries considered, after exclusions.
    pub total: usize,
}

impl ComparisonReport {
    /// `matching/total` with a percentage, e.g. `312/350 (89.1%)`.
    pub fn matching_summary(&self) -> String {
        Self::ratio(self.matching.len(), self.total)
    }

    /// `missing/total` with a percentage.
    pub fn missing_summary(&self) -> String {
        Self::ratio(self.missing.len(), self.total)
    }

    fn ratio(count: usize, total: usize) -> String {
        let percent = if total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / total as f64
        };
        format!("{}/{} ({:.1}%)", count, total, percent)
    }

    /// Renders the flat text report.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "matching: {}", self.matching_summary());
        let _ = writeln!(out, "missing:  {}", self.missing_summary());
        let _ = writeln!(out, "unused:   {}", self.unused.len());
        let _ = writeln!(out);
        let _ = writeln!(out, "== missing ==");
        for path in &self.missing {
            let _ = writeln!(out, "{}", path);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "== unused ==");
        for path in &self.unused {
            let _ = writeln!(out, "{}", path);
        }
        out
    }

    /// Writes the flat text report to a file.
    pub fn write_report(&self, path: &Path) -> ValidateResult<()> {
        std::fs::write(path, self.render())?;
        Ok(())
    }
}

/// Compares a pack's texture paths against a reference catalog.
///
/// The reference partition and the unused scan are independent; they run
/// on both sides of a `rayon::join`.
pub fn compare_textures(
    pack_files: &BTreeSet<String>,
    reference_files: &BTreeSet<String>,
    rules: &ExclusionRules,
) -> ComparisonReport {
    let (partition, unused) = rayon::join(
        || {
            let mut matching = BTreeSet::new();
            let mut missing = BTreeSet::new();
            for path in reference_files {
                if rules.is_excluded(path) {
                    continue;
                }
                if pack_files.contains(path) {
                    matching.insert(path.clone());
                } else {
                    missing.insert(path.clone());
                }
            }
            (matching, missing)
        },
        || {
            pack_files
                .iter()
                .filter(|p| !reference_files.contains(*p) && !rules.is_excluded(p))
                .cloned()
                .collect::<BTreeSet<String>>()
        },
    );
    let (matching, missing) = partition;
    let total = matching.len() + missing.len();
    ComparisonReport {
        matching,
        missing,
        unused,
        total,
    }
}

/// Collects the relative texture paths of a materialized branch tree.
///
/// Only `.png` files are compared; manifests, models and block states
/// have no counterpart in the reference texture catalog.
pub fn scan_tree(root: &Path) -> ValidateResult<BTreeSet<String>> {
    let mut files = BTreeSet::new();
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("png") {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            // Git internals and the branch-root icon are not pack content.
            let relative = relative.to_string_lossy().replace('\\', "/");
            if relative.starts_with(".git/") || relative == "pack.png" {
                continue;
            }
            files.insert(relative);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn set(paths: &[&str]) -> BTreeSet<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_disjoint_sets_no_exclusions() {
        let pack = set(&["a.png", "b.png"]);
        let reference = set(&["c.png", "d.png"]);
        let report = compare_textures(&pack, &reference, &ExclusionRules::none());

        assert_eq!(report.missing, reference);
        assert!(report.matching.is_empty());
        assert_eq!(report.unused, pack);
    }

    #[test]
    fn test_identical_sets_fully_match() {
        let files = set(&["a.png", "b.png"]);
        let report = compare_textures(&files, &files, &ExclusionRules::none());

        assert!(report.missing.is_empty());
        assert!(report.unused.is_empty());
        assert_eq!(report.matching.len(), 2);
        assert_eq!(report.matching_summary(), "2/2 (100.0%)");
    }

    #[test]
    fn test_excluded_entries_leave_both_partitions() {
        let pack = set(&["assets/minecraft/textures/block/stone.png"]);
        let reference = set(&[
            "assets/minecraft/textures/block/stone.png",
            "assets/minecraft/textures/particle/flame.png",
        ]);
        let rules = ExclusionRules::default_rules("_e").unwrap();
        let report = compare_textures(&pack, &reference, &rules);

        assert_eq!(report.total, 1);
        assert!(report.missing.is_empty());
        assert_eq!(report.matching_summary(), "1/1 (100.0%)");
    }

    #[test]
    fn test_excluded_pack_files_are_not_unused() {
        let pack = set(&["assets/minecraft/textures/block/stone_e.png"]);
        let reference = set(&[]);
        let rules = ExclusionRules::default_rules("_e").unwrap();
        let report = compare_textures(&pack, &reference, &rules);
        assert!(report.unused.is_empty());
    }

    #[test]
    fn test_empty_reference_summary() {
        let report = compare_textures(&set(&[]), &set(&[]), &ExclusionRules::none());
        assert_eq!(report.matching_summary(), "0/0 (0.0%)");
    }

    #[test]
    fn test_render_lists_sections() {
        let report = compare_textures(
            &set(&["extra.png"]),
            &set(&["wanted.png"]),
            &ExclusionRules::none(),
        );
        let text = report.render();
        assert!(text.contains("== missing ==\nwanted.png"));
        assert!(text.contains("== unused ==\nextra.png"));
    }

    #[test]
    fn test_scan_tree_collects_relative_png_paths() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("assets/minecraft/textures/block")).unwrap();
        std::fs::create_dir_all(root.join(".git/objects")).unwrap();
        std::fs::write(root.join("assets/minecraft/textures/block/stone.png"), b"x").unwrap();
        std::fs::write(root.join("pack.mcmeta"), b"{}").unwrap();
        std::fs::write(root.join("pack.png"), b"x").unwrap();
        std::fs::write(root.join(".git/objects/a.png"), b"x").unwrap();

        let files = scan_tree(root).unwrap();
        assert_eq!(files, set(&["assets/minecraft/textures/block/stone.png"]));
    }

    #[test]
    fn test_report_written_to_disk() {
        let dir = TempDir::new().unwrap();
        let report = compare_textures(&set(&[]), &set(&["a.png"]), &ExclusionRules::none());
        let path = dir.path().join("report.txt");
        report.write_report(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("a.png"));
    }
}
