//! Slot canonicalization (import) and per-version projection.

use std::collections::BTreeMap;

use tracing::warn;
use uuid::Uuid;

use crate::catalog::TextureMapping;
use crate::translate;
use crate::version::VersionId;

use super::{ModelDocument, ModelError, ModelResult};

/// Parses an uploaded model document and canonicalizes its texture slots.
///
/// Every slot holding an authoring reference is resolved against the
/// active texture mapping and replaced with the owning asset's id.
/// Back-references (`#slot`) pass through. An unresolvable reference is
/// a hard error: the model is rejected rather than stored with a
/// dangling texture.
///
/// An explicit `"ambientocclusion": true` equals the platform default
/// and is normalized away, so a later projection serializes it as
/// absent.
pub fn import_document(
    raw: &[u8],
    mapping: &TextureMapping,
    default_namespace: &str,
) -> ModelResult<ModelDocument> {
    let mut document: ModelDocument = serde_json::from_slice(raw)?;
    if document.ambient_occlusion == Some(true) {
        document.ambient_occlusion = None;
    }
    let mut canonical = BTreeMap::new();
    for (slot, reference) in &document.textures {
        if reference.starts_with('#') {
            canonical.insert(slot.clone(), reference.clone());
            continue;
        }
        let internal = translate::to_internal(reference, default_namespace);
        let asset = translate::resolve(mapping, &internal)?;
        canonical.insert(slot.clone(), asset.id.to_string());
    }
    document.textures = canonical;
    Ok(document)
}

/// Projects a canonical document onto a target release.
///
/// For every slot holding an asset id, selects the output location valid
/// for the target release (non-entity variants preferred) and replaces
/// the slot with its authoring reference. A slot whose asset has no
/// location for the release is dropped with a warning - a model lacking
/// one of several texture variants for an unsupported era is expected,
/// not a build failure.
pub fn project_document(
    document: &ModelDocument,
    mapping: &TextureMapping,
    target: VersionId,
    default_namespace: &str,
) -> ModelDocument {
    let mut projected = document.clone();
    let mut textures = BTreeMap::new();
    for (slot, value) in &document.textures {
        if value.starts_with('#') {
            textures.insert(slot.clone(), value.clone());
            continue;
        }
        let Ok(asset_id) = Uuid::parse_str(value) else {
            warn!(slot = %slot, value = %value, "texture slot holds malformed asset id, dropping");
            continue;
        };
        let Some(asset) = mapping.find(asset_id) else {
            warn!(slot = %slot, asset_id = %asset_id, "texture slot references unknown asset, dropping");
            continue;
        };
        match asset.preferred_output(target) {
            Some(output) => {
                textures.insert(
                    slot.clone(),
                    translate::to_authoring(&output.path, default_namespace),
                );
            }
            None => {
                warn!(
                    slot = %slot,
                    asset_id = %asset_id,
                    target = %target,
                    "no output location for target version, skipping slot"
                );
            }
        }
    }
    projected.textures = textures;
    projected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{OutputLocation, TextureAsset};
    use crate::translate::DEFAULT_NAMESPACE;
    use crate::version::VersionRange;

    fn v(s: &str) -> VersionId {
        s.parse().unwrap()
    }

    fn mapping_with_stone() -> (TextureMapping, Uuid) {
        let mut mapping = TextureMapping::new("vanilla");
        let asset = TextureAsset::new(
            ["stone"],
            vec![OutputLocation::new(
                "assets/minecraft/textures/blocks/stone.png",
                VersionRange::new(v("1.7"), v("1.12.2")).unwrap(),
            )],
        )
        .unwrap();
        let id = asset.id;
        mapping.add(asset).unwrap();
        (mapping, id)
    }

    #[test]
    fn test_import_canonicalizes_slots() {
        let (mapping, id) = mapping_with_stone();
        let raw = br#"{"parent":"block/cube_all","textures":{"all":"blocks/stone"}}"#;
        let doc = import_document(raw, &mapping, DEFAULT_NAMESPACE).unwrap();
        assert_eq!(doc.textures["all"], id.to_string());
    }

    #[test]
    fn test_import_normalizes_default_ambient_occlusion() {
        let (mapping, _) = mapping_with_stone();
        let raw = br#"{"ambientocclusion":true,"textures":{"all":"blocks/stone"}}"#;
        let doc = import_document(raw, &mapping, DEFAULT_NAMESPACE).unwrap();
        assert_eq!(doc.ambient_occlusion, None);
        assert!(!serde_json::to_string(&doc).unwrap().contains("ambientocclusion"));

        // A non-default toggle is meaningful and survives import.
        let raw = br#"{"ambientocclusion":false,"textures":{"all":"blocks/stone"}}"#;
        let doc = import_document(raw, &mapping, DEFAULT_NAMESPACE).unwrap();
        assert_eq!(doc.ambient_occlusion, Some(false));
    }

    #[test]
    fn test_import_rejects_unknown_texture() {
        let (mapping, _) = mapping_with_stone();
        let raw = br#"{"textures":{"all":"blocks/granite"}}"#;
        let err = import_document(raw, &mapping, DEFAULT_NAMESPACE);
        assert!(matches!(err, Err(ModelError::UnresolvedTexture(_))));
    }

    #[test]
    fn test_import_passes_back_references_through() {
        let (mapping, _) = mapping_with_stone();
        let raw = br##"{"textures":{"particle":"#all","all":"blocks/stone"}}"##;
        let doc = import_document(raw, &mapping, DEFAULT_NAMESPACE).unwrap();
        assert_eq!(doc.textures["particle"], "#all");
    }

    #[test]
    fn test_project_resolves_slot_for_matching_version() {
        let (mapping, id) = mapping_with_stone();
        let doc = ModelDocument::with_parent("block/cube_all", [("all", id.to_string())]);
        let projected = project_document(&doc, &mapping, v("1.10"), DEFAULT_NAMESPACE);
        assert_eq!(projected.textures["all"], "blocks/stone");
    }

    #[test]
    fn test_project_skips_slot_outside_version_range() {
        let (mapping, id) = mapping_with_stone();
        let doc = ModelDocument::with_parent("block/cube_all", [("all", id.to_string())]);
        let projected = project_document(&doc, &mapping, v("1.16"), DEFAULT_NAMESPACE);
        assert!(projected.textures.is_empty());
        assert_eq!(projected.parent.as_deref(), Some("block/cube_all"));
    }

    #[test]
    fn test_project_drops_unknown_asset_id() {
        let (mapping, _) = mapping_with_stone();
        let doc = ModelDocument::with_parent("block/cube_all", [("all", Uuid::new_v4().to_string())]);
        let projected = project_document(&doc, &mapping, v("1.10"), DEFAULT_NAMESPACE);
        assert!(projected.textures.is_empty());
    }
}
