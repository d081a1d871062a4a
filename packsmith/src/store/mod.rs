//! Persistence and blob-storage boundaries.
//!
//! The document store and the binary blob store are external
//! collaborators; this module specifies them as traits and provides the
//! implementations the build pipeline and tests run against. Every
//! component receives its store handles at construction - there is no
//! process-wide registry of loaded packs or mappings.
//!
//! The traits use boxed futures so they stay dyn-compatible
//! (`Arc<dyn MappingStore>` is passed across the pipeline).
//!
//! "Not found" is an expected condition and surfaces as `Ok(None)`;
//! errors are reserved for genuine faults (I/O, corrupt data,
//! constraint violations).

mod blob;
mod memory;

pub use blob::{BlobStore, FsBlobStore, MemoryBlobStore};
pub use memory::MemoryStore;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{BlockStateMapping, MiscBundle, ModelMapping, TextureMapping};
use crate::pack::Pack;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from persistence and blob operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O fault in a backing store.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be decoded.
    #[error("corrupt stored document: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// A unique-name or referential constraint was violated.
    #[error("store constraint violated: {0}")]
    Constraint(String),

    /// A mapping still referenced by at least one pack cannot be deleted.
    #[error("mapping {0} is referenced by a pack")]
    MappingInUse(Uuid),

    /// A blob that must exist is absent.
    #[error("blob {0} not found")]
    BlobNotFound(String),
}

/// CRUD over mappings and miscellaneous bundles, keyed by id.
pub trait MappingStore: Send + Sync {
    /// Fetch a texture mapping.
    fn texture_mapping(&self, id: Uuid) -> BoxFuture<'_, StoreResult<Option<TextureMapping>>>;

    /// Create or replace a texture mapping.
    fn save_texture_mapping(&self, mapping: TextureMapping) -> BoxFuture<'_, StoreResult<()>>;

    /// Delete a texture mapping; fails with [`StoreError::MappingInUse`]
    /// while any pack references it.
    fn delete_texture_mapping(&self, id: Uuid) -> BoxFuture<'_, StoreResult<()>>;

    /// Fetch a model mapping.
    fn model_mapping(&self, id: Uuid) -> BoxFuture<'_, StoreResult<Option<ModelMapping>>>;

    /// Create or replace a model mapping.
    fn save_model_mapping(&self, mapping: ModelMapping) -> BoxFuture<'_, StoreResult<()>>;

    /// Fetch a block-state mapping.
    fn block_state_mapping(&self, id: Uuid)
        -> BoxFuture<'_, StoreResult<Option<BlockStateMapping>>>;

    /// Create or replace a block-state mapping.
    fn save_block_state_mapping(
        &self,
        mapping: BlockStateMapping,
    ) -> BoxFuture<'_, StoreResult<()>>;

    /// Fetch a miscellaneous bundle record.
    fn misc_bundle(&self, id: Uuid) -> BoxFuture<'_, StoreResult<Option<MiscBundle>>>;

    /// Create or replace a miscellaneous bundle record.
    fn save_misc_bundle(&self, bundle: MiscBundle) -> BoxFuture<'_, StoreResult<()>>;
}

/// CRUD over packs, keyed by id and by unique name.
pub trait PackStore: Send + Sync {
    /// Fetch a pack by id.
    fn pack(&self, id: Uuid) -> BoxFuture<'_, StoreResult<Option<Pack>>>;

    /// Fetch a pack by its unique name.
    fn pack_by_name(&self, name: &str) -> BoxFuture<'_, StoreResult<Option<Pack>>>;

    /// All stored packs.
    fn packs(&self) -> BoxFuture<'_, StoreResult<Vec<Pack>>>;

    /// Create or replace a pack, enforcing name uniqueness.
    fn save_pack(&self, pack: Pack) -> BoxFuture<'_, StoreResult<()>>;

    /// Delete a pack by id.
    fn delete_pack(&self, id: Uuid) -> BoxFuture<'_, StoreResult<()>>;

    /// Field-level partial update: replace only the bundle list.
    fn set_misc_bundles(&self, pack_id: Uuid, bundles: Vec<Uuid>)
        -> BoxFuture<'_, StoreResult<()>>;
}

/// Blob-store key for a texture asset's content.
pub fn texture_blob_name(asset_id: Uuid) -> String {
    format!("texture-{}.png", asset_id)
}

/// Blob-store key for a texture's companion metadata.
pub fn texture_metadata_blob_name(asset_id: Uuid) -> String {
    format!("texture-{}.png.mcmeta", asset_id)
}

/// Blob-store key for a block-state asset's content.
pub fn block_state_blob_name(asset_id: Uuid) -> String {
    format!("blockstate-{}.json", asset_id)
}

/// Blob-store key for a miscellaneous bundle archive.
pub fn bundle_blob_name(bundle_id: Uuid) -> String {
    format!("bundle-{}.tar.gz", bundle_id)
}

/// Blob-store key for a pack's icon.
pub fn icon_blob_name(pack_id: Uuid) -> String {
    format!("icon-{}.png", pack_id)
}
