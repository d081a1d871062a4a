//! Workspace loading shared across CLI commands.
//!
//! A workspace is a single JSON document holding packs, mappings and
//! bundle records; asset content lives in a blob directory next to it.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use packsmith::catalog::{BlockStateMapping, MiscBundle, ModelMapping, TextureMapping};
use packsmith::pack::Pack;
use packsmith::store::{MappingStore, MemoryStore, PackStore};

use crate::error::CliError;

/// On-disk workspace document.
#[derive(Debug, Deserialize)]
pub struct WorkspaceFile {
    #[serde(default)]
    pub texture_mappings: Vec<TextureMapping>,
    #[serde(default)]
    pub model_mappings: Vec<ModelMapping>,
    #[serde(default)]
    pub block_state_mappings: Vec<BlockStateMapping>,
    #[serde(default)]
    pub misc_bundles: Vec<MiscBundle>,
    #[serde(default)]
    pub packs: Vec<Pack>,
}

/// Loads a workspace document into an in-memory store.
///
/// Mappings load before packs so referential guards hold from the start.
pub async fn load_store(path: &Path) -> Result<Arc<MemoryStore>, CliError> {
    let raw = tokio::fs::read(path).await?;
    let file: WorkspaceFile = serde_json::from_slice(&raw)?;

    let store = Arc::new(MemoryStore::new());
    for mapping in file.texture_mappings {
        store.save_texture_mapping(mapping).await?;
    }
    for mapping in file.model_mappings {
        store.save_model_mapping(mapping).await?;
    }
    for mapping in file.block_state_mappings {
        store.save_block_state_mapping(mapping).await?;
    }
    for bundle in file.misc_bundles {
        store.save_misc_bundle(bundle).await?;
    }
    for pack in file.packs {
        store.save_pack(pack).await?;
    }
    Ok(store)
}

/// Narrows the pack list to one named pack, or returns all of them.
pub fn select_packs(packs: Vec<Pack>, name: Option<&str>) -> Result<Vec<Pack>, CliError> {
    let Some(name) = name else {
        return Ok(packs);
    };
    let selected: Vec<Pack> = packs.into_iter().filter(|p| p.name == name).collect();
    if selected.is_empty() {
        return Err(CliError::Usage(format!("no pack named {}", name)));
    }
    Ok(selected)
}
