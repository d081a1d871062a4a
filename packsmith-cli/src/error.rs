//! CLI error type.

use thiserror::Error;

/// Errors surfaced to the CLI user.
#[derive(Debug, Error)]
pub enum CliError {
    /// Bad workspace document or command arguments.
    #[error("{0}")]
    Usage(String),

    /// The workspace file could not be decoded.
    #[error("malformed workspace file: {0}")]
    Workspace(#[from] serde_json::Error),

    #[error(transparent)]
    Build(#[from] packsmith::builder::BuildError),

    #[error(transparent)]
    Validate(#[from] packsmith::validate::ValidateError),

    #[error(transparent)]
    Store(#[from] packsmith::store::StoreError),

    #[error(transparent)]
    Publish(#[from] packsmith::publish::PublishError),

    #[error(transparent)]
    Reference(#[from] packsmith::reference::ReferenceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
