//! Asset record types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::ModelDocument;
use crate::version::{VersionId, VersionRange};

use super::{CatalogError, CatalogResult};

/// Path segment marking entity-rendering texture variants.
///
/// Block models should not default to entity assets, so output selection
/// deprioritizes any path containing this segment.
pub const ENTITY_PATH_SEGMENT: &str = "entity";

/// A version-range-scoped physical location for one asset's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLocation {
    /// Path relative to the branch build directory,
    /// e.g. `assets/minecraft/textures/block/stone.png`.
    pub path: String,

    /// Releases for which this location is valid.
    pub versions: VersionRange,

    /// Whether a companion metadata file (`<path>.mcmeta`) accompanies
    /// the content at this location.
    pub has_companion_metadata: bool,
}

impl OutputLocation {
    /// Create a location without companion metadata.
    pub fn new(path: impl Into<String>, versions: VersionRange) -> Self {
        Self {
            path: path.into(),
            versions,
            has_companion_metadata: false,
        }
    }

    /// Mark this location as carrying a companion metadata file.
    pub fn with_companion_metadata(mut self) -> Self {
        self.has_companion_metadata = true;
        self
    }

    /// True when any path segment is the entity marker.
    pub fn is_entity_variant(&self) -> bool {
        self.path.split('/').any(|s| s == ENTITY_PATH_SEGMENT)
    }
}

/// Checks the output-location invariant shared by all asset kinds.
///
/// Overlapping version ranges are permitted only when the paths differ;
/// the same path appearing twice in one overlapping window is a conflict.
fn validate_outputs(outputs: &[OutputLocation]) -> CatalogResult<()> {
    for (i, a) in outputs.iter().enumerate() {
        for b in &outputs[i + 1..] {
            if a.path == b.path && a.versions.overlaps(&b.versions) {
                return Err(CatalogError::ConflictingOutputs {
                    path: a.path.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Normalizes asset aliases: trimmed and upper-cased.
fn normalize_names<I, S>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names
        .into_iter()
        .map(|n| n.into().trim().to_uppercase())
        .filter(|n| !n.is_empty())
        .collect()
}

/// A canonical texture record.
///
/// The pixel payload lives in the blob store under the asset id; this
/// record carries identity, aliases, and the version-scoped locations
/// the bytes are written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureAsset {
    /// Stable identity, unique within the owning mapping.
    pub id: Uuid,

    /// Case-normalized aliases; never empty.
    pub names: BTreeSet<String>,

    /// Version-scoped physical locations.
    pub outputs: Vec<OutputLocation>,
}

impl TextureAsset {
    /// Create a texture asset with a fresh id.
    pub fn new<I, S>(names: I, outputs: Vec<OutputLocation>) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = normalize_names(names);
        if names.is_empty() {
            return Err(CatalogError::EmptyNames);
        }
        validate_outputs(&outputs)?;
        Ok(Self {
            id: Uuid::new_v4(),
            names,
            outputs,
        })
    }

    /// True when any output location covers the given release.
    pub fn matches_version(&self, version: VersionId) -> bool {
        self.outputs.iter().any(|o| o.versions.matches(version))
    }

    /// All output locations covering the given release.
    pub fn matching_outputs(&self, version: VersionId) -> impl Iterator<Item = &OutputLocation> {
        self.outputs
            .iter()
            .filter(move |o| o.versions.matches(version))
    }

    /// The output location a model slot should reference for a release.
    ///
    /// Prefers a non-entity variant; falls back to any matching location.
    /// Returns `None` when no location covers the release.
    pub fn preferred_output(&self, version: VersionId) -> Option<&OutputLocation> {
        self.matching_outputs(version)
            .find(|o| !o.is_entity_variant())
            .or_else(|| self.matching_outputs(version).next())
    }

    /// Replace this asset's output locations, revalidating the invariant.
    pub fn set_outputs(&mut self, outputs: Vec<OutputLocation>) -> CatalogResult<()> {
        validate_outputs(&outputs)?;
        self.outputs = outputs;
        Ok(())
    }

    /// Replace this asset's aliases.
    pub fn rename<I, S>(&mut self, names: I) -> CatalogResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = normalize_names(names);
        if names.is_empty() {
            return Err(CatalogError::EmptyNames);
        }
        self.names = names;
        Ok(())
    }
}

/// A canonical 3-D model record.
///
/// The document is structured (texture slots hold asset ids after import)
/// and is projected to its platform JSON shape per target version at
/// build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAsset {
    /// Stable identity, unique within the owning mapping.
    pub id: Uuid,

    /// Case-normalized aliases; never empty.
    pub names: BTreeSet<String>,

    /// Directory under `assets/minecraft/models/`, e.g. `block`.
    pub sub_path: String,

    /// Output file name, e.g. `stone.json`.
    pub file_name: String,

    /// The canonical model document.
    pub document: ModelDocument,
}

impl ModelAsset {
    /// Create a model asset with a fresh id.
    pub fn new<I, S>(
        names: I,
        sub_path: impl Into<String>,
        file_name: impl Into<String>,
        document: ModelDocument,
    ) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = normalize_names(names);
        if names.is_empty() {
            return Err(CatalogError::EmptyNames);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            names,
            sub_path: sub_path.into(),
            file_name: file_name.into(),
            document,
        })
    }
}

/// A canonical block-state record.
///
/// Block states hold raw JSON bytes in the blob store and are written to
/// a fixed location; version filtering happens upstream at asset
/// selection, not per file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStateAsset {
    /// Stable identity, unique within the owning mapping.
    pub id: Uuid,

    /// Output file name under `assets/minecraft/blockstates/`.
    pub file_name: String,
}

impl BlockStateAsset {
    /// Create a block-state asset with a fresh id.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
        }
    }
}

/// A miscellaneous archive bundle.
///
/// Bundles are tar.gz archives in the blob store whose contents are
/// extracted wholesale into every branch directory matching the bundle's
/// version range (licenses, sounds, language files and the like).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiscBundle {
    /// Stable identity.
    pub id: Uuid,

    /// Human-readable bundle name.
    pub name: String,

    /// Releases whose branches receive this bundle.
    pub versions: VersionRange,
}

impl MiscBundle {
    /// Create a bundle with a fresh id.
    pub fn new(name: impl Into<String>, versions: VersionRange) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            versions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> VersionId {
        s.parse().unwrap()
    }

    fn range(min: &str, max: &str) -> VersionRange {
        VersionRange::new(v(min), v(max)).unwrap()
    }

    #[test]
    fn test_names_are_case_normalized() {
        let asset = TextureAsset::new(["stone", " Cobble "], vec![]).unwrap();
        assert!(asset.names.contains("STONE"));
        assert!(asset.names.contains("COBBLE"));
    }

    #[test]
    fn test_empty_names_rejected() {
        let err = TextureAsset::new(Vec::<String>::new(), vec![]);
        assert!(matches!(err, Err(CatalogError::EmptyNames)));
    }

    #[test]
    fn test_overlapping_ranges_same_path_rejected() {
        let outputs = vec![
            OutputLocation::new("assets/minecraft/textures/block/stone.png", range("1.7", "1.12")),
            OutputLocation::new("assets/minecraft/textures/block/stone.png", range("1.10", "1.16")),
        ];
        let err = TextureAsset::new(["stone"], outputs);
        assert!(matches!(err, Err(CatalogError::ConflictingOutputs { .. })));
    }

    #[test]
    fn test_overlapping_ranges_different_paths_allowed() {
        // Platform-convention fork: one era uses blocks/, the next block/.
        let outputs = vec![
            OutputLocation::new("assets/minecraft/textures/blocks/stone.png", range("1.7", "1.12.2")),
            OutputLocation::new(
                "assets/minecraft/textures/block/stone.png",
                VersionRange::since(v("1.13")),
            ),
        ];
        assert!(TextureAsset::new(["stone"], outputs).is_ok());
    }

    #[test]
    fn test_matches_version_across_outputs() {
        let asset = TextureAsset::new(
            ["stone"],
            vec![OutputLocation::new(
                "assets/minecraft/textures/blocks/stone.png",
                range("1.7", "1.12.2"),
            )],
        )
        .unwrap();
        assert!(asset.matches_version(v("1.10")));
        assert!(!asset.matches_version(v("1.16")));
    }

    #[test]
    fn test_preferred_output_skips_entity_variant() {
        let asset = TextureAsset::new(
            ["bed"],
            vec![
                OutputLocation::new("assets/minecraft/textures/entity/bed/red.png", range("1.13", "1.20")),
                OutputLocation::new("assets/minecraft/textures/block/bed_red.png", range("1.13", "1.20")),
            ],
        )
        .unwrap();
        let preferred = asset.preferred_output(v("1.16")).unwrap();
        assert_eq!(preferred.path, "assets/minecraft/textures/block/bed_red.png");
    }

    #[test]
    fn test_preferred_output_falls_back_to_entity_variant() {
        let asset = TextureAsset::new(
            ["bed"],
            vec![OutputLocation::new(
                "assets/minecraft/textures/entity/bed/red.png",
                range("1.13", "1.20"),
            )],
        )
        .unwrap();
        assert!(asset.preferred_output(v("1.16")).is_some());
        assert!(asset.preferred_output(v("1.7")).is_none());
    }

    #[test]
    fn test_set_outputs_revalidates() {
        let mut asset = TextureAsset::new(["stone"], vec![]).unwrap();
        let bad = vec![
            OutputLocation::new("a.png", range("1.7", "1.12")),
            OutputLocation::new("a.png", range("1.12", "1.13")),
        ];
        assert!(asset.set_outputs(bad).is_err());
    }

    #[test]
    fn test_entity_segment_detection_is_per_segment() {
        let loc = OutputLocation::new(
            "assets/minecraft/textures/block/entityish.png",
            VersionRange::any(),
        );
        assert!(!loc.is_entity_variant());
    }
}
