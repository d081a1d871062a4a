//! Canonical asset records and their mappings.
//!
//! A pack never references physical files directly. Instead it references
//! [`Mapping`]s - named collections of canonical asset records - and every
//! record carries one or more [`OutputLocation`]s scoping a physical path
//! to an inclusive version range. The same logical texture can therefore
//! live at `textures/blocks/stone.png` for one version era and
//! `textures/block/stone.png` for another without duplicating content.
//!
//! Asset payloads are split by kind:
//! - texture and block-state bytes live in the blob store, keyed by asset id
//! - model documents are structured and stored inline on the record
//!
//! # Example
//!
//! ```
//! use packsmith::catalog::{OutputLocation, TextureAsset};
//! use packsmith::version::VersionRange;
//!
//! let asset = TextureAsset::new(
//!     ["stone"],
//!     vec![OutputLocation::new(
//!         "assets/minecraft/textures/block/stone.png",
//!         VersionRange::since("1.13".parse().unwrap()),
//!     )],
//! )
//! .unwrap();
//!
//! assert!(asset.names.contains("STONE"));
//! ```

mod asset;
mod mapping;

pub use asset::{
    BlockStateAsset, MiscBundle, ModelAsset, OutputLocation, TextureAsset, ENTITY_PATH_SEGMENT,
};
pub use mapping::{BlockStateMapping, Mapping, ModelMapping, TextureMapping};

use thiserror::Error;
use uuid::Uuid;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors from constructing or mutating catalog entities.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Texture and model assets must carry at least one alias.
    #[error("asset must have at least one name")]
    EmptyNames,

    /// Two output locations share a path and an overlapping version range.
    #[error("conflicting output locations for path {path}")]
    ConflictingOutputs {
        /// The duplicated path.
        path: String,
    },

    /// An asset with this id already exists in the mapping.
    #[error("asset {0} already present in mapping")]
    DuplicateAsset(Uuid),

    /// No asset with this id exists in the mapping.
    #[error("asset {0} not found in mapping")]
    AssetNotFound(Uuid),
}
