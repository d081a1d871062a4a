//! CLI command implementations.

pub mod build;
pub mod common;
pub mod daemon;
pub mod validate;
