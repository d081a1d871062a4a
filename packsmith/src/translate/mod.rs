//! Bidirectional translation between authoring texture references and
//! internal paths.
//!
//! Model documents reference textures the way the platform's authoring
//! tools write them: `block/stone` or `namespace:block/stone`. The
//! catalog stores the canonical internal path instead:
//! `assets/<namespace>/textures/block/stone.png`. This module is the
//! single source of truth for that transform and its exact inverse.
//!
//! References beginning with `#` are back-references to another slot in
//! the same document and pass through both directions untouched.
//!
//! # Example
//!
//! ```
//! use packsmith::translate;
//!
//! let internal = translate::to_internal("block/stone", "minecraft");
//! assert_eq!(internal, "assets/minecraft/textures/block/stone.png");
//! assert_eq!(translate::to_authoring(&internal, "minecraft"), "block/stone");
//! ```

use thiserror::Error;

use crate::catalog::{TextureAsset, TextureMapping};

/// Default namespace reinstated only when a reference is namespaced
/// differently.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Marker prefix for intra-document back-references.
const BACK_REFERENCE: char = '#';

/// Result type for translation operations.
pub type TranslateResult<T> = Result<T, TranslateError>;

/// Errors from resolving internal paths against a mapping.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// No asset in the active texture mapping owns this path.
    ///
    /// This is a hard error during model import: a model cannot be
    /// stored referencing a texture absent from the active mapping.
    #[error("no asset in mapping owns path {path}")]
    AssetNotFound {
        /// The unresolved internal path.
        path: String,
    },
}

/// Converts an authoring texture reference to its internal path.
///
/// `block/stone` becomes `assets/<default>/textures/block/stone.png`;
/// `foo:block/stone` becomes `assets/foo/textures/block/stone.png`.
/// Back-references (`#side`) pass through unresolved.
pub fn to_internal(authoring: &str, default_namespace: &str) -> String {
    if authoring.starts_with(BACK_REFERENCE) {
        return authoring.to_string();
    }
    match authoring.split_once(':') {
        Some((namespace, rest)) => format!("assets/{}/textures/{}.png", namespace, rest),
        None => format!("assets/{}/textures/{}.png", default_namespace, authoring),
    }
}

/// Converts an internal path back to its authoring reference.
///
/// Exact inverse of [`to_internal`]: strips `assets/<ns>/textures/`,
/// drops the `.png` extension, and reinstates the `namespace:` prefix
/// only when the namespace differs from the default. Paths not following
/// the convention (and back-references) are returned unchanged.
pub fn to_authoring(internal: &str, default_namespace: &str) -> String {
    if internal.starts_with(BACK_REFERENCE) {
        return internal.to_string();
    }
    let parsed = internal
        .strip_prefix("assets/")
        .and_then(|rest| rest.split_once('/'))
        .and_then(|(namespace, rest)| {
            rest.strip_prefix("textures/")
                .and_then(|r| r.strip_suffix(".png"))
                .map(|r| (namespace, r))
        });
    match parsed {
        Some((namespace, reference)) if namespace == default_namespace => reference.to_string(),
        Some((namespace, reference)) => format!("{}:{}", namespace, reference),
        None => internal.to_string(),
    }
}

/// Resolves an internal path to the owning asset record.
///
/// Fails with [`TranslateError::AssetNotFound`] when no asset in the
/// mapping lists the path among its output locations.
pub fn resolve<'a>(mapping: &'a TextureMapping, internal: &str) -> TranslateResult<&'a TextureAsset> {
    mapping
        .find_by_path(internal)
        .ok_or_else(|| TranslateError::AssetNotFound {
            path: internal.to_string(),
        })
}
