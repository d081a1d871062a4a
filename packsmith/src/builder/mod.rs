//! Pack materialization.
//!
//! The [`BuildMaterializer`] projects a pack and its mappings into one
//! concrete file tree per branch, filtered to each branch's target
//! release. Writes are diff-aware ([`write_if_changed`]): an unchanged
//! asset never touches the filesystem, which keeps the downstream
//! commit/push cycle quiet.
//!
//! Every operation fans out over the pack's branches concurrently. A
//! branch's writes for one operation complete or fail as a unit, and one
//! branch's failure never cancels the others - there is no multi-branch
//! transaction, each branch tree is independently eventually consistent.
//!
//! ```text
//! Pack + Mappings ──► BuildMaterializer ──► builds/<pack>/<branch-id>/
//!                                             assets/<ns>/textures/...
//!                                             assets/<ns>/models/...
//!                                             assets/<ns>/blockstates/...
//!                                             pack.mcmeta, pack.png
//! ```

mod extract;
mod write;

pub use extract::{ArchiveExtractor, ShellTarExtractor};
pub use write::{content_digest, remove_if_present, write_if_changed};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{BlockStateAsset, ModelAsset, TextureAsset};
use crate::model::project_document;
use crate::pack::{Branch, Pack};
use crate::store::{
    self, BlobStore, MappingStore, StoreError,
};
use crate::telemetry::BuildMetrics;
use crate::translate::DEFAULT_NAMESPACE;
use crate::version::pack_format;

/// Result type for build operations.
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors from materialization.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Filesystem fault at a specific path.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path being written or removed.
        path: PathBuf,
        /// Underlying fault.
        source: std::io::Error,
    },

    /// Persistence or blob-store fault.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Document serialization fault.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bundle archive could not be extracted.
    #[error("failed to extract {archive}: {reason}")]
    Extract {
        /// The archive being extracted.
        archive: PathBuf,
        /// Tool output or spawn failure.
        reason: String,
    },

    /// The pack references a mapping the store does not hold.
    #[error("mapping {0} not found")]
    MappingNotFound(Uuid),
}

/// Relative manifest path at the branch root.
pub const MANIFEST_FILE: &str = "pack.mcmeta";

/// Relative icon path at the branch root.
pub const ICON_FILE: &str = "pack.png";

/// Relative path of the emissive-suffix properties file.
pub const EMISSIVE_PROPERTIES_FILE: &str = "assets/minecraft/optifine/emissive.properties";

#[derive(Serialize)]
struct Manifest {
    pack: ManifestBody,
}

#[derive(Serialize)]
struct ManifestBody {
    pack_format: u32,
    description: String,
}

/// Renders the manifest bytes for one branch.
///
/// Deterministic: derived only from pack metadata and the branch's
/// target release via the pack-format table.
pub fn manifest_bytes(pack: &Pack, branch: &Branch) -> BuildResult<Vec<u8>> {
    let manifest = Manifest {
        pack: ManifestBody {
            pack_format: pack_format(branch.target),
            description: pack.description_for(branch),
        },
    };
    Ok(serde_json::to_vec_pretty(&manifest)?)
}

/// Projects packs into per-branch file trees.
pub struct BuildMaterializer {
    root: PathBuf,
    mappings: Arc<dyn MappingStore>,
    blobs: Arc<dyn BlobStore>,
    extractor: Arc<dyn ArchiveExtractor>,
    metrics: Arc<BuildMetrics>,
}

impl BuildMaterializer {
    /// Create a materializer writing under `root`, one directory per
    /// pack, one per branch beneath it.
    pub fn new(
        root: impl Into<PathBuf>,
        mappings: Arc<dyn MappingStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            root: root.into(),
            mappings,
            blobs,
            extractor: Arc::new(ShellTarExtractor::new()),
            metrics: Arc::new(BuildMetrics::new()),
        }
    }

    /// Substitute the archive extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn ArchiveExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Share a metrics handle with the caller.
    pub fn with_metrics(mut self, metrics: Arc<BuildMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Build telemetry recorded by this materializer.
    pub fn metrics(&self) -> &Arc<BuildMetrics> {
        &self.metrics
    }

    /// The build directory for one branch, keyed by branch id.
    pub fn branch_dir(&self, pack: &Pack, branch: &Branch) -> PathBuf {
        self.root.join(pack.id.to_string()).join(branch.dir_name())
    }

    async fn write_tracked(&self, path: &Path, bytes: &[u8]) -> BuildResult<u64> {
        if write_if_changed(path, bytes).await? {
            self.metrics.file_written();
            Ok(1)
        } else {
            self.metrics.file_skipped();
            Ok(0)
        }
    }

    /// Joins per-branch results, absorbing and logging failures.
    fn absorb_branch_results(
        &self,
        operation: &str,
        pack: &Pack,
        results: Vec<(&Branch, BuildResult<u64>)>,
    ) -> u64 {
        let mut written = 0;
        for (branch, result) in results {
            match result {
                Ok(n) => written += n,
                Err(e) => {
                    self.metrics.branch_failed();
                    warn!(
                        pack = %pack.name,
                        branch = %branch.name,
                        operation,
                        error = %e,
                        "branch write failed, other branches unaffected"
                    );
                }
            }
        }
        written
    }

    /// Writes a texture asset's bytes (and companion metadata) into every
    /// branch whose target release the asset covers.
    ///
    /// Returns the number of physical writes performed.
    pub async fn add_texture(&self, pack: &Pack, asset: &TextureAsset) -> BuildResult<u64> {
        let bytes = self
            .blobs
            .download(&store::texture_blob_name(asset.id))
            .await?;
        let needs_metadata = asset.outputs.iter().any(|o| o.has_companion_metadata);
        let metadata = if needs_metadata {
            Some(
                self.blobs
                    .download(&store::texture_metadata_blob_name(asset.id))
                    .await?,
            )
        } else {
            None
        };

        let futures = pack.branches.iter().map(|branch| {
            let dir = self.branch_dir(pack, branch);
            let bytes = &bytes;
            let metadata = metadata.as_deref();
            async move {
                let mut written = 0;
                if !asset.matches_version(branch.target) {
                    return Ok(written);
                }
                for output in asset.matching_outputs(branch.target) {
                    let path = dir.join(&output.path);
                    written += self.write_tracked(&path, bytes).await?;
                    if output.has_companion_metadata {
                        if let Some(meta) = metadata {
                            let meta_path = dir.join(format!("{}.mcmeta", output.path));
                            written += self.write_tracked(&meta_path, meta).await?;
                        }
                    }
                }
                Ok(written)
            }
        });
        let results = join_all(futures).await;
        let written =
            self.absorb_branch_results("add_texture", pack, pack.branches.iter().zip(results).collect());
        debug!(pack = %pack.name, asset = %asset.id, written, "texture materialized");
        Ok(written)
    }

    /// Removes a texture asset's materialized files from every branch.
    pub async fn remove_texture(&self, pack: &Pack, asset: &TextureAsset) -> BuildResult<u64> {
        let futures = pack.branches.iter().map(|branch| {
            let dir = self.branch_dir(pack, branch);
            async move {
                let mut removed = 0;
                for output in &asset.outputs {
                    if remove_if_present(&dir.join(&output.path)).await? {
                        removed += 1;
                    }
                    if output.has_companion_metadata {
                        remove_if_present(&dir.join(format!("{}.mcmeta", output.path))).await?;
                    }
                }
                Ok(removed)
            }
        });
        let results = join_all(futures).await;
        Ok(self.absorb_branch_results(
            "remove_texture",
            pack,
            pack.branches.iter().zip(results).collect(),
        ))
    }

    /// Projects a model per branch target and writes its platform JSON.
    pub async fn add_model(&self, pack: &Pack, model: &ModelAsset) -> BuildResult<u64> {
        let mapping = self
            .mappings
            .texture_mapping(pack.texture_mapping)
            .await?
            .ok_or(BuildError::MappingNotFound(pack.texture_mapping))?;

        let futures = pack.branches.iter().map(|branch| {
            let dir = self.branch_dir(pack, branch);
            let mapping = &mapping;
            async move {
                let projected =
                    project_document(&model.document, mapping, branch.target, DEFAULT_NAMESPACE);
                let bytes = serde_json::to_vec_pretty(&projected)?;
                let path = dir
                    .join("assets/minecraft/models")
                    .join(&model.sub_path)
                    .join(&model.file_name);
                self.write_tracked(&path, &bytes).await
            }
        });
        let results = join_all(futures).await;
        Ok(self.absorb_branch_results(
            "add_model",
            pack,
            pack.branches.iter().zip(results).collect(),
        ))
    }

    /// Writes a block-state's raw bytes into every branch.
    ///
    /// Block states are not version-filtered here; filtering happens at
    /// asset-selection time upstream.
    pub async fn add_block_state(&self, pack: &Pack, asset: &BlockStateAsset) -> BuildResult<u64> {
        let bytes = self
            .blobs
            .download(&store::block_state_blob_name(asset.id))
            .await?;
        let futures = pack.branches.iter().map(|branch| {
            let dir = self.branch_dir(pack, branch);
            let bytes = &bytes;
            async move {
                let path = dir.join("assets/minecraft/blockstates").join(&asset.file_name);
                self.write_tracked(&path, bytes).await
            }
        });
        let results = join_all(futures).await;
        Ok(self.absorb_branch_results(
            "add_block_state",
            pack,
            pack.branches.iter().zip(results).collect(),
        ))
    }

    /// Extracts every bundle the pack references into the branches whose
    /// target release the bundle covers.
    pub async fn add_misc(&self, pack: &Pack) -> BuildResult<()> {
        for bundle_id in &pack.misc_bundles {
            let Some(bundle) = self.mappings.misc_bundle(*bundle_id).await? else {
                warn!(pack = %pack.name, bundle = %bundle_id, "bundle record missing, skipping");
                continue;
            };
            let archive_bytes = match self.blobs.download(&store::bundle_blob_name(bundle.id)).await
            {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(pack = %pack.name, bundle = %bundle.name, error = %e, "bundle archive unavailable, skipping");
                    continue;
                }
            };

            // Stage the archive once, extract per branch.
            let staging = self.root.join(".staging");
            let archive_path = staging.join(store::bundle_blob_name(bundle.id));
            fs::create_dir_all(&staging).await.map_err(|source| BuildError::Io {
                path: staging.clone(),
                source,
            })?;
            fs::write(&archive_path, &archive_bytes)
                .await
                .map_err(|source| BuildError::Io {
                    path: archive_path.clone(),
                    source,
                })?;

            let futures = pack.branches.iter().map(|branch| {
                let dir = self.branch_dir(pack, branch);
                let archive = archive_path.clone();
                let extractor = Arc::clone(&self.extractor);
                let matches = bundle.versions.matches(branch.target);
                async move {
                    if !matches {
                        return Ok(0);
                    }
                    let archive_for_error = archive.clone();
                    tokio::task::spawn_blocking(move || extractor.extract(&archive, &dir))
                        .await
                        .map_err(|e| BuildError::Extract {
                            archive: archive_for_error,
                            reason: format!("extraction task panicked: {}", e),
                        })??;
                    Ok(1)
                }
            });
            let results = join_all(futures).await;
            self.absorb_branch_results(
                "add_misc",
                pack,
                pack.branches.iter().zip(results).collect(),
            );

            if let Err(e) = fs::remove_file(&archive_path).await {
                debug!(path = %archive_path.display(), error = %e, "staged archive cleanup failed");
            }
        }
        Ok(())
    }

    /// (Re)writes per-branch automation files: the manifest, the pack
    /// icon when present, and the emissive properties file when enabled.
    pub async fn automation(&self, pack: &Pack) -> BuildResult<u64> {
        let icon = if self.blobs.exists(&store::icon_blob_name(pack.id)).await? {
            Some(self.blobs.download(&store::icon_blob_name(pack.id)).await?)
        } else {
            None
        };

        let futures = pack.branches.iter().map(|branch| {
            let dir = self.branch_dir(pack, branch);
            let icon = icon.as_deref();
            async move {
                let mut written = 0;
                let manifest = manifest_bytes(pack, branch)?;
                written += self.write_tracked(&dir.join(MANIFEST_FILE), &manifest).await?;
                if let Some(icon_bytes) = icon {
                    written += self.write_tracked(&dir.join(ICON_FILE), icon_bytes).await?;
                }
                if pack.emissive_enabled {
                    let properties = format!("suffix.emissive={}\n", pack.emissive_suffix);
                    written += self
                        .write_tracked(&dir.join(EMISSIVE_PROPERTIES_FILE), properties.as_bytes())
                        .await?;
                }
                Ok(written)
            }
        });
        let results = join_all(futures).await;
        Ok(self.absorb_branch_results(
            "automation",
            pack,
            pack.branches.iter().zip(results).collect(),
        ))
    }

    /// Full rebuild of every branch tree for a pack: textures, models,
    /// block states, bundles, automation files.
    pub async fn build_pack(&self, pack: &Pack) -> BuildResult<()> {
        info!(pack = %pack.name, branches = pack.branches.len(), "building pack");

        let texture_mapping = self
            .mappings
            .texture_mapping(pack.texture_mapping)
            .await?
            .ok_or(BuildError::MappingNotFound(pack.texture_mapping))?;
        for asset in &texture_mapping.assets {
            if let Err(e) = self.add_texture(pack, asset).await {
                warn!(pack = %pack.name, asset = %asset.id, error = %e, "texture skipped");
            }
        }

        if let Some(id) = pack.model_mapping {
            let mapping = self
                .mappings
                .model_mapping(id)
                .await?
                .ok_or(BuildError::MappingNotFound(id))?;
            for model in &mapping.assets {
                if let Err(e) = self.add_model(pack, model).await {
                    warn!(pack = %pack.name, asset = %model.id, error = %e, "model skipped");
                }
            }
        }

        if let Some(id) = pack.block_state_mapping {
            let mapping = self
                .mappings
                .block_state_mapping(id)
                .await?
                .ok_or(BuildError::MappingNotFound(id))?;
            for state in &mapping.assets {
                if let Err(e) = self.add_block_state(pack, state).await {
                    warn!(pack = %pack.name, asset = %state.id, error = %e, "block state skipped");
                }
            }
        }

        self.add_misc(pack).await?;
        self.automation(pack).await?;

        let snapshot = self.metrics.snapshot();
        info!(
            pack = %pack.name,
            files_written = snapshot.files_written,
            files_skipped = snapshot.files_skipped,
            "pack build complete"
        );
        Ok(())
    }

    /// Deletes a branch's build directory as detached background work.
    ///
    /// Best-effort: failures are logged, never surfaced to the caller.
    /// The returned handle is only for tests that need to await the
    /// deletion.
    pub fn remove_branch_dir(&self, pack: &Pack, branch: &Branch) -> tokio::task::JoinHandle<()> {
        let dir = self.branch_dir(pack, branch);
        let pack_name = pack.name.clone();
        let branch_name = branch.name.clone();
        tokio::spawn(async move {
            match fs::remove_dir_all(&dir).await {
                Ok(()) => debug!(pack = %pack_name, branch = %branch_name, "branch directory removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(pack = %pack_name, branch = %branch_name, error = %e, "branch directory deletion failed")
                }
            }
        })
    }
}
