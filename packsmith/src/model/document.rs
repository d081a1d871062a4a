//! The typed model document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A platform model document.
///
/// Optional fields are omitted from serialized output when absent, so a
/// projected document is byte-comparable with one written by authoring
/// tools. Texture slot values are authoring references on the wire and
/// asset ids in canonical (post-import) form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    /// Parent model reference, e.g. `block/cube_all`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Ambient-occlusion toggle. Import normalizes an explicit `true`
    /// (the platform default) to `None`, so only `false` survives to
    /// serialized output.
    #[serde(
        rename = "ambientocclusion",
        skip_serializing_if = "Option::is_none"
    )]
    pub ambient_occlusion: Option<bool>,

    /// Texture slots, keyed by slot name (`all`, `side`, `particle`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub textures: BTreeMap<String, String>,

    /// Item-frame / GUI transform block, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<Value>,

    /// Cuboid geometry, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Value>,

    /// GUI lighting mode (`front`/`side`).
    #[serde(rename = "gui_light", skip_serializing_if = "Option::is_none")]
    pub gui_light: Option<String>,

    /// Item override predicates, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Value>,
}

impl ModelDocument {
    /// A document inheriting from a parent with the given texture slots.
    pub fn with_parent<I, K, V>(parent: impl Into<String>, textures: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            parent: Some(parent.into()),
            textures: textures
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Self::default()
        }
    }
}
