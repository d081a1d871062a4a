//! Propagation of branch trees to a version-control remote.
//!
//! Each branch's build directory doubles as a git working copy pushed to
//! a remote branch of the same name. The publisher tracks a small state
//! machine per branch:
//!
//! ```text
//! Uninitialized ──ensure──► Initialized ──remote ops ok──► Tracking
//!                               │  ▲
//!                               └──┘ remote failure, retried next cycle
//! ```
//!
//! Publishing is best effort by design: commit and push failures are
//! logged and absorbed, never propagated - the scheduler retries on the
//! next cycle, and one branch's failure must not block another's. Git
//! runs as a subprocess; the serialized per-branch invocations mean the
//! local repository lock is never contended.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::builder::BuildMaterializer;
use crate::pack::{Branch, Pack};

/// Result type for publish operations.
pub type PublishResult<T> = Result<T, PublishError>;

/// Errors from local repository operations.
///
/// Remote failures are absorbed, so this surface covers only local
/// faults: a git binary that cannot be spawned or a local command that
/// fails outright.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Git could not be spawned.
    #[error("failed to run git {op}: {source}")]
    Spawn {
        /// The subcommand attempted.
        op: String,
        /// Underlying fault.
        source: std::io::Error,
    },

    /// A local git command exited non-zero.
    #[error("git {op} failed: {stderr}")]
    Git {
        /// The subcommand attempted.
        op: String,
        /// Trimmed standard error from git.
        stderr: String,
    },

    /// The pack has no remote configured.
    #[error("pack {0} is not version-controlled")]
    NoRemote(String),
}

/// Remote-tracking state of one branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteState {
    /// No local repository yet.
    Uninitialized,
    /// Local repository exists; remote branch not yet confirmed.
    Initialized,
    /// Remote branch exists and is tracked.
    Tracking,
}

/// Commits and pushes branch build directories.
pub struct GitPublisher {
    materializer: Arc<BuildMaterializer>,
    states: DashMap<Uuid, RemoteState>,
}

impl GitPublisher {
    /// Create a publisher over the materializer's build directories.
    pub fn new(materializer: Arc<BuildMaterializer>) -> Self {
        Self {
            materializer,
            states: DashMap::new(),
        }
    }

    /// Current tracked state of a branch.
    pub fn state(&self, branch: &Branch) -> RemoteState {
        self.states
            .get(&branch.id)
            .map(|s| *s)
            .unwrap_or(RemoteState::Uninitialized)
    }

    async fn git(&self, dir: &Path, args: &[&str]) -> PublishResult<String> {
        let op = args.first().copied().unwrap_or("?").to_string();
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .await
            .map_err(|source| PublishError::Spawn {
                op: op.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(PublishError::Git {
                op,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Ensures the branch directory is a repository tracking its remote
    /// branch.
    ///
    /// Initializes the repository and remote on first call. When the
    /// remote branch already exists the branch transitions straight to
    /// `Tracking`; otherwise an initial commit is created, the branch is
    /// checked out with upstream set, and pushed. Remote failures leave
    /// the branch `Initialized` for the next cycle. Idempotent: a
    /// `Tracking` branch is a no-op.
    pub async fn ensure_branch(&self, pack: &Pack, branch: &Branch) -> PublishResult<()> {
        if self.state(branch) == RemoteState::Tracking {
            return Ok(());
        }
        let remote_url = pack
            .remote_url
            .as_deref()
            .ok_or_else(|| PublishError::NoRemote(pack.name.clone()))?;
        let dir = self.materializer.branch_dir(pack, branch);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| PublishError::Spawn {
                op: "init".to_string(),
                source,
            })?;

        if !dir.join(".git").exists() {
            self.git(&dir, &["init"]).await?;
            debug!(pack = %pack.name, branch = %branch.name, "repository initialized");
        }
        let remotes = self.git(&dir, &["remote"]).await?;
        if !remotes.lines().any(|r| r.trim() == "origin") {
            self.git(&dir, &["remote", "add", "origin", remote_url]).await?;
        }
        self.states.insert(branch.id, RemoteState::Initialized);

        // Everything past this point talks to the remote and is
        // absorbed on failure; the next scheduled cycle retries.
        match self.establish_tracking(pack, branch, &dir).await {
            Ok(()) => {
                self.states.insert(branch.id, RemoteState::Tracking);
                info!(pack = %pack.name, branch = %branch.name, "remote branch tracking established");
            }
            Err(e) => {
                warn!(pack = %pack.name, branch = %branch.name, error = %e, "remote setup failed, will retry next cycle");
            }
        }
        Ok(())
    }

    async fn establish_tracking(
        &self,
        pack: &Pack,
        branch: &Branch,
        dir: &Path,
    ) -> PublishResult<()> {
        let heads = self
            .git(dir, &["ls-remote", "--heads", "origin", &branch.name])
            .await?;
        if !heads.trim().is_empty() {
            // Remote branch already exists; adopt it.
            self.git(dir, &["checkout", "-B", &branch.name]).await?;
            self.git(
                dir,
                &[
                    "branch",
                    &format!("--set-upstream-to=origin/{}", branch.name),
                    &branch.name,
                ],
            )
            .await
            .ok(); // Fails until the first fetch; harmless.
            return Ok(());
        }
        self.git(dir, &["add", "-A"]).await?;
        self.git(
            dir,
            &["commit", "--allow-empty", "-m", &format!("Initial build for {}", branch.target)],
        )
        .await?;
        self.git(dir, &["checkout", "-B", &branch.name]).await?;
        self.git(dir, &["push", "-u", "origin", &branch.name]).await?;
        Ok(())
    }

    /// Stages and commits the branch's working tree, then pushes.
    ///
    /// Commits only when the tree is dirty, but always attempts the push
    /// so a previously failed push is retried even on a quiet cycle.
    /// Push failures are logged, never returned.
    pub async fn commit_branch(
        &self,
        pack: &Pack,
        branch: &Branch,
        message: Option<&str>,
    ) -> PublishResult<()> {
        if self.state(branch) != RemoteState::Tracking {
            self.ensure_branch(pack, branch).await?;
            if self.state(branch) != RemoteState::Tracking {
                warn!(pack = %pack.name, branch = %branch.name, "branch not tracking, skipping commit");
                return Ok(());
            }
        }
        let dir = self.materializer.branch_dir(pack, branch);

        self.git(&dir, &["add", "-A"]).await?;
        let status = self.git(&dir, &["status", "--porcelain"]).await?;
        if status.trim().is_empty() {
            debug!(pack = %pack.name, branch = %branch.name, "working tree clean");
        } else {
            let generated = format!("Automated build {}", Utc::now().format("%Y-%m-%d %H:%M:%S"));
            let message = message.unwrap_or(&generated);
            self.git(&dir, &["commit", "-m", message]).await?;
            info!(pack = %pack.name, branch = %branch.name, "changes committed");
        }

        if let Err(e) = self.git(&dir, &["push", "origin", &branch.name]).await {
            warn!(pack = %pack.name, branch = %branch.name, error = %e, "push failed, will retry next cycle");
        }
        Ok(())
    }

    /// Commits and pushes every branch of a pack independently.
    ///
    /// One branch's failure never blocks another's; non-version-
    /// controlled packs are skipped silently.
    pub async fn commit_pack(&self, pack: &Pack) {
        if !pack.is_version_controlled() {
            return;
        }
        for branch in &pack.branches {
            if let Err(e) = self.commit_branch(pack, branch, None).await {
                warn!(pack = %pack.name, branch = %branch.name, error = %e, "branch commit failed");
            }
        }
    }
}
