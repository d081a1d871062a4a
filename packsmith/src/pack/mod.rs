//! Packs and their build branches.
//!
//! A pack is a named content set: one required texture mapping, optional
//! model and block-state mappings, miscellaneous bundles, and an ordered
//! list of branches. Each branch targets one platform release and owns
//! one build directory, keyed by the branch id so renames never move the
//! tree on disk (or orphan the remote branch tracking it).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::version::VersionId;

/// Result type for pack operations.
pub type PackResult<T> = Result<T, PackError>;

/// Errors from constructing or mutating packs.
#[derive(Debug, Error)]
pub enum PackError {
    /// Branch names are unique within a pack.
    #[error("branch named {0} already exists in pack")]
    DuplicateBranch(String),

    /// No branch with this id exists in the pack.
    #[error("branch {0} not found in pack")]
    BranchNotFound(Uuid),
}

/// Default suffix marking emissive texture companions.
pub const DEFAULT_EMISSIVE_SUFFIX: &str = "_e";

/// A build target bound to one platform release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Stable identity; determines the on-disk build-directory name.
    pub id: Uuid,

    /// Branch name, unique within the pack. Renaming does not move the
    /// build directory.
    pub name: String,

    /// The release this branch materializes for.
    pub target: VersionId,
}

impl Branch {
    /// Create a branch with a fresh id.
    pub fn new(name: impl Into<String>, target: VersionId) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            target,
        }
    }

    /// The build-directory name for this branch, stable across renames.
    pub fn dir_name(&self) -> String {
        self.id.to_string()
    }
}

/// A named content set and its build branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pack {
    /// Stable identity.
    pub id: Uuid,

    /// Pack name, unique across the store.
    pub name: String,

    /// Manifest description; `%s` is replaced with the branch's target
    /// release at materialization time.
    pub description: String,

    /// Required texture mapping.
    pub texture_mapping: Uuid,

    /// Optional model mapping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_mapping: Option<Uuid>,

    /// Optional block-state mapping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_state_mapping: Option<Uuid>,

    /// Miscellaneous bundles extracted into matching branches.
    #[serde(default)]
    pub misc_bundles: Vec<Uuid>,

    /// Build branches, one per supported release.
    #[serde(default)]
    pub branches: Vec<Branch>,

    /// Whether emissive-texture support files are written.
    #[serde(default)]
    pub emissive_enabled: bool,

    /// Suffix naming emissive companions, e.g. `_e`.
    pub emissive_suffix: String,

    /// Remote the branch trees are pushed to; `None` for local-only packs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
}

impl Pack {
    /// Create a pack with a fresh id and no branches.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        texture_mapping: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            texture_mapping,
            model_mapping: None,
            block_state_mapping: None,
            misc_bundles: Vec::new(),
            branches: Vec::new(),
            emissive_enabled: false,
            emissive_suffix: DEFAULT_EMISSIVE_SUFFIX.to_string(),
            remote_url: None,
        }
    }

    /// Add a branch, rejecting duplicate names.
    pub fn add_branch(&mut self, branch: Branch) -> PackResult<()> {
        if self.branches.iter().any(|b| b.name == branch.name) {
            return Err(PackError::DuplicateBranch(branch.name));
        }
        self.branches.push(branch);
        Ok(())
    }

    /// Remove a branch by id, returning it.
    pub fn remove_branch(&mut self, id: Uuid) -> PackResult<Branch> {
        let idx = self
            .branches
            .iter()
            .position(|b| b.id == id)
            .ok_or(PackError::BranchNotFound(id))?;
        Ok(self.branches.remove(idx))
    }

    /// Find a branch by name.
    pub fn branch_by_name(&self, name: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.name == name)
    }

    /// The manifest description for one branch, with the `%s` placeholder
    /// substituted by the target release.
    pub fn description_for(&self, branch: &Branch) -> String {
        self.description.replace("%s", &branch.target.to_string())
    }

    /// Whether this pack publishes to a version-control remote.
    pub fn is_version_controlled(&self) -> bool {
        self.remote_url.is_some()
    }
}
