//! In-memory store backed by concurrent maps.
//!
//! Serves tests and the CLI's file-loaded workspaces. DashMap gives
//! lock-free reads and per-shard writes, so the store is safe to share
//! across the async pipeline without a global lock.

use dashmap::DashMap;
use uuid::Uuid;

use crate::catalog::{BlockStateMapping, MiscBundle, ModelMapping, TextureMapping};
use crate::pack::Pack;

use super::{BoxFuture, MappingStore, PackStore, StoreError, StoreResult};

/// In-memory implementation of [`MappingStore`] and [`PackStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    texture_mappings: DashMap<Uuid, TextureMapping>,
    model_mappings: DashMap<Uuid, ModelMapping>,
    block_state_mappings: DashMap<Uuid, BlockStateMapping>,
    misc_bundles: DashMap<Uuid, MiscBundle>,
    packs: DashMap<Uuid, Pack>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn mapping_referenced(&self, id: Uuid) -> bool {
        self.packs.iter().any(|p| {
            p.texture_mapping == id
                || p.model_mapping == Some(id)
                || p.block_state_mapping == Some(id)
        })
    }
}

impl MappingStore for MemoryStore {
    fn texture_mapping(&self, id: Uuid) -> BoxFuture<'_, StoreResult<Option<TextureMapping>>> {
        Box::pin(async move { Ok(self.texture_mappings.get(&id).map(|m| m.clone())) })
    }

    fn save_texture_mapping(&self, mapping: TextureMapping) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(async move {
            self.texture_mappings.insert(mapping.id, mapping);
            Ok(())
        })
    }

    fn delete_texture_mapping(&self, id: Uuid) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(async move {
            if self.mapping_referenced(id) {
                return Err(StoreError::MappingInUse(id));
            }
            self.texture_mappings.remove(&id);
            Ok(())
        })
    }

    fn model_mapping(&self, id: Uuid) -> BoxFuture<'_, StoreResult<Option<ModelMapping>>> {
        Box::pin(async move { Ok(self.model_mappings.get(&id).map(|m| m.clone())) })
    }

    fn save_model_mapping(&self, mapping: ModelMapping) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(async move {
            self.model_mappings.insert(mapping.id, mapping);
            Ok(())
        })
    }

    fn block_state_mapping(
        &self,
        id: Uuid,
    ) -> BoxFuture<'_, StoreResult<Option<BlockStateMapping>>> {
        Box::pin(async move { Ok(self.block_state_mappings.get(&id).map(|m| m.clone())) })
    }

    fn save_block_state_mapping(
        &self,
        mapping: BlockStateMapping,
    ) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(async move {
            self.block_state_mappings.insert(mapping.id, mapping);
            Ok(())
        })
    }

    fn misc_bundle(&self, id: Uuid) -> BoxFuture<'_, StoreResult<Option<MiscBundle>>> {
        Box::pin(async move { Ok(self.misc_bundles.get(&id).map(|b| b.clone())) })
    }

    fn save_misc_bundle(&self, bundle: MiscBundle) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(async move {
            self.misc_bundles.insert(bundle.id, bundle);
            Ok(())
        })
    }
}

impl PackStore for MemoryStore {
    fn pack(&self, id: Uuid) -> BoxFuture<'_, StoreResult<Option<Pack>>> {
        Box::pin(async move { Ok(self.packs.get(&id).map(|p| p.clone())) })
    }

    fn pack_by_name(&self, name: &str) -> BoxFuture<'_, StoreResult<Option<Pack>>> {
        let name = name.to_string();
        Box::pin(async move {
            Ok(self
                .packs
                .iter()
                .find(|p| p.name == name)
                .map(|p| p.clone()))
        })
    }

    fn packs(&self) -> BoxFuture<'_, StoreResult<Vec<Pack>>> {
        Box::pin(async move { Ok(self.packs.iter().map(|p| p.clone()).collect()) })
    }

    fn save_pack(&self, pack: Pack) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(async move {
            let name_taken = self
                .packs
                .iter()
                .any(|p| p.name == pack.name && p.id != pack.id);
            if name_taken {
                return Err(StoreError::Constraint(format!(
                    "pack name {} already in use",
                    pack.name
                )));
            }
            self.packs.insert(pack.id, pack);
            Ok(())
        })
    }

    fn delete_pack(&self, id: Uuid) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(async move {
            self.packs.remove(&id);
            Ok(())
        })
    }

    fn set_misc_bundles(
        &self,
        pack_id: Uuid,
        bundles: Vec<Uuid>,
    ) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(async move {
            match self.packs.get_mut(&pack_id) {
                Some(mut pack) => {
                    pack.misc_bundles = bundles;
                    Ok(())
                }
                None => Err(StoreError::Constraint(format!("pack {} not found", pack_id))),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_fetch_texture_mapping() {
        let store = MemoryStore::new();
        let mapping = TextureMapping::new("vanilla");
        let id = mapping.id;
        store.save_texture_mapping(mapping).await.unwrap();
        assert!(store.texture_mapping(id).await.unwrap().is_some());
        assert!(store.texture_mapping(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_mapping_guarded_by_pack_reference() {
        let store = MemoryStore::new();
        let mapping = TextureMapping::new("vanilla");
        let mapping_id = mapping.id;
        store.save_texture_mapping(mapping).await.unwrap();
        let pack = Pack::new("Demo", "desc", mapping_id);
        store.save_pack(pack).await.unwrap();

        let err = store.delete_texture_mapping(mapping_id).await;
        assert!(matches!(err, Err(StoreError::MappingInUse(_))));
    }

    #[tokio::test]
    async fn test_pack_name_uniqueness() {
        let store = MemoryStore::new();
        store
            .save_pack(Pack::new("Demo", "a", Uuid::new_v4()))
            .await
            .unwrap();
        let err = store.save_pack(Pack::new("Demo", "b", Uuid::new_v4())).await;
        assert!(matches!(err, Err(StoreError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_partial_update_of_misc_bundles() {
        let store = MemoryStore::new();
        let pack = Pack::new("Demo", "a", Uuid::new_v4());
        let pack_id = pack.id;
        store.save_pack(pack).await.unwrap();

        let bundles = vec![Uuid::new_v4()];
        store.set_misc_bundles(pack_id, bundles.clone()).await.unwrap();
        let stored = store.pack(pack_id).await.unwrap().unwrap();
        assert_eq!(stored.misc_bundles, bundles);
    }

    #[tokio::test]
    async fn test_pack_by_name() {
        let store = MemoryStore::new();
        store
            .save_pack(Pack::new("Demo", "a", Uuid::new_v4()))
            .await
            .unwrap();
        assert!(store.pack_by_name("Demo").await.unwrap().is_some());
        assert!(store.pack_by_name("Other").await.unwrap().is_none());
    }
}
