//! Structured model documents: import and version projection.
//!
//! A model document arrives from authoring tools with texture slots
//! holding authoring references (`block/stone`). Import canonicalizes
//! every slot to the owning asset's id; projection does the reverse per
//! target release, selecting the output location valid for that release
//! and serializing the document to its platform JSON shape.
//!
//! The document is a typed tree with an explicit omit-if-absent policy
//! per optional field rather than a dynamic JSON round-trip. Geometry
//! payloads (`elements`, `display`) are carried opaquely - editing
//! geometry is out of scope.

mod document;
mod project;

pub use document::ModelDocument;
pub use project::{import_document, project_document};

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors from importing or projecting model documents.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The document is not valid JSON or not a model document.
    #[error("malformed model document: {0}")]
    Json(#[from] serde_json::Error),

    /// A texture slot references an asset absent from the active mapping.
    ///
    /// Raised during import only; aborts that single asset's processing.
    #[error(transparent)]
    UnresolvedTexture(#[from] crate::translate::TranslateError),
}
