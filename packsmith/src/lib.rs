//! Packsmith - Versioned resource-pack building and publishing
//!
//! This library materializes content packs into per-release build trees,
//! validates them against platform reference catalogs, and publishes the
//! results to version-control remotes on a daily cycle.
//!
//! The pipeline, end to end:
//!
//! ```text
//! catalog (mappings, assets)
//!    │
//!    ▼
//! builder ──── blob store (texture/model/bundle content)
//!    │
//!    ▼
//! per-branch build trees ──► validate ──► comparison reports
//!    │
//!    ▼
//! publish (git) ◄── scheduler (daily flush)
//! ```

pub mod builder;
pub mod catalog;
pub mod model;
pub mod pack;
pub mod publish;
pub mod reference;
pub mod scheduler;
pub mod store;
pub mod telemetry;
pub mod translate;
pub mod validate;
pub mod version;
