//! Build telemetry.
//!
//! Lock-free atomic counters recorded by the materializer, with a
//! point-in-time snapshot for display by the CLI and the scheduler's
//! cycle log line.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters recorded during materialization.
#[derive(Debug, Default)]
pub struct BuildMetrics {
    files_written: AtomicU64,
    files_skipped: AtomicU64,
    branch_failures: AtomicU64,
}

impl BuildMetrics {
    /// Create zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a physical file write.
    pub fn file_written(&self) {
        self.files_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a digest-equal write skipped by the diff-aware path.
    pub fn file_skipped(&self) {
        self.files_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one branch failing within a fan-out operation.
    pub fn branch_failed(&self) {
        self.branch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            files_written: self.files_written.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
            branch_failures: self.branch_failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable copy of [`BuildMetrics`] counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Physical file writes performed.
    pub files_written: u64,
    /// Writes skipped because content was unchanged.
    pub files_skipped: u64,
    /// Branch-level failures absorbed during fan-out.
    pub branch_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = BuildMetrics::new();
        metrics.file_written();
        metrics.file_written();
        metrics.file_skipped();
        metrics.branch_failed();

        let snap = metrics.snapshot();
        assert_eq!(snap.files_written, 2);
        assert_eq!(snap.files_skipped, 1);
        assert_eq!(snap.branch_failures, 1);
    }

    #[test]
    fn test_snapshot_is_point_in_time() {
        let metrics = BuildMetrics::new();
        let before = metrics.snapshot();
        metrics.file_written();
        assert_eq!(before.files_written, 0);
        assert_eq!(metrics.snapshot().files_written, 1);
    }
}
