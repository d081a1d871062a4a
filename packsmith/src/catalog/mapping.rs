//! Named, owned collections of asset records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BlockStateAsset, CatalogError, CatalogResult, ModelAsset, TextureAsset};

/// A named collection of asset records.
///
/// Mappings are the unit of CRUD and of ownership by a pack: a pack
/// references a texture mapping (required) and optional model and
/// block-state mappings. Deleting a mapping is only valid while no pack
/// references it; the persistence layer enforces that guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping<A> {
    /// Stable identity.
    pub id: Uuid,

    /// Human-readable mapping name.
    pub name: String,

    /// The owned asset records.
    pub assets: Vec<A>,
}

/// Mapping of texture assets.
pub type TextureMapping = Mapping<TextureAsset>;

/// Mapping of model assets.
pub type ModelMapping = Mapping<ModelAsset>;

/// Mapping of block-state assets.
pub type BlockStateMapping = Mapping<BlockStateAsset>;

impl<A> Mapping<A> {
    /// Create an empty mapping with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            assets: Vec::new(),
        }
    }

    /// Create a mapping from a bulk import of records.
    pub fn with_assets(name: impl Into<String>, assets: Vec<A>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            assets,
        }
    }

    /// Number of assets in the mapping.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// True when the mapping holds no assets.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Identity-keyed operations shared by every asset kind.
macro_rules! impl_keyed_ops {
    ($asset:ty) => {
        impl Mapping<$asset> {
            /// Find an asset by id.
            pub fn find(&self, id: Uuid) -> Option<&$asset> {
                self.assets.iter().find(|a| a.id == id)
            }

            /// Find an asset by id, mutably.
            pub fn find_mut(&mut self, id: Uuid) -> Option<&mut $asset> {
                self.assets.iter_mut().find(|a| a.id == id)
            }

            /// Add an asset, rejecting duplicate ids.
            pub fn add(&mut self, asset: $asset) -> CatalogResult<()> {
                if self.find(asset.id).is_some() {
                    return Err(CatalogError::DuplicateAsset(asset.id));
                }
                self.assets.push(asset);
                Ok(())
            }

            /// Remove an asset by id, returning it.
            pub fn remove(&mut self, id: Uuid) -> CatalogResult<$asset> {
                let idx = self
                    .assets
                    .iter()
                    .position(|a| a.id == id)
                    .ok_or(CatalogError::AssetNotFound(id))?;
                Ok(self.assets.remove(idx))
            }
        }
    };
}

impl_keyed_ops!(TextureAsset);
impl_keyed_ops!(ModelAsset);
impl_keyed_ops!(BlockStateAsset);

impl TextureMapping {
    /// Find a texture by alias (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&TextureAsset> {
        let needle = name.trim().to_uppercase();
        self.assets.iter().find(|a| a.names.contains(&needle))
    }

    /// Find the texture owning the given internal path.
    pub fn find_by_path(&self, path: &str) -> Option<&TextureAsset> {
        self.assets
            .iter()
            .find(|a| a.outputs.iter().any(|o| o.path == path))
    }
}
