//! Platform release identifiers and version ranges.
//!
//! Every asset in a pack carries one or more output locations, each scoped
//! to an inclusive range of platform releases. This module is the single
//! source of truth for release identity and ordering:
//!
//! - [`VersionId`] - an ordered release identifier with a `Latest` sentinel
//! - [`VersionRange`] - an inclusive interval with membership/overlap tests
//! - [`pack_format`] - the release → manifest pack-format lookup table
//!
//! Ordering is by release ordinal, not lexical string value: release
//! `1.10` is newer than `1.9` even though it sorts earlier as a string.
//!
//! # Example
//!
//! ```
//! use packsmith::version::{VersionId, VersionRange};
//!
//! let range = VersionRange::new("1.7".parse()?, VersionId::Latest)?;
//! assert!(range.matches("1.12.2".parse()?));
//! # Ok::<(), packsmith::version::VersionError>(())
//! ```

mod format;
mod range;

pub use format::pack_format;
pub use range::VersionRange;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// Errors from parsing or constructing versions and ranges.
#[derive(Debug, Error)]
pub enum VersionError {
    /// The string is not a recognized release identifier.
    #[error("invalid version identifier: {0}")]
    InvalidVersion(String),

    /// Range constructed with min greater than max.
    #[error("empty version range: {min} > {max}")]
    EmptyRange {
        /// Lower bound supplied.
        min: VersionId,
        /// Upper bound supplied.
        max: VersionId,
    },
}

/// An ordered platform release identifier.
///
/// Releases follow the `1.<minor>[.<patch>]` convention; `Latest` is the
/// open-ended sentinel used as the upper bound of ranges that should track
/// every future release. The derived ordering compares `(minor, patch)`
/// numerically and places `Latest` after every concrete release.
///
/// # Example
///
/// ```
/// use packsmith::version::VersionId;
///
/// let v9: VersionId = "1.9".parse().unwrap();
/// let v10: VersionId = "1.10".parse().unwrap();
/// assert!(v10 > v9);
/// assert!(VersionId::Latest > v10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VersionId {
    /// A concrete release, e.g. `1.16.5` (minor 16, patch 5).
    Release {
        /// Minor release line.
        minor: u16,
        /// Patch within the minor line (0 when absent).
        patch: u16,
    },
    /// Sentinel that matches any release at or after the newest known one.
    Latest,
}

impl VersionId {
    /// Create a concrete release identifier.
    pub fn release(minor: u16, patch: u16) -> Self {
        Self::Release { minor, patch }
    }

    /// Returns true for the `Latest` sentinel.
    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }

    /// The minor release line, if this is a concrete release.
    pub fn minor(&self) -> Option<u16> {
        match self {
            Self::Release { minor, .. } => Some(*minor),
            Self::Latest => None,
        }
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release { minor, patch: 0 } => write!(f, "1.{}", minor),
            Self::Release { minor, patch } => write!(f, "1.{}.{}", minor, patch),
            Self::Latest => write!(f, "latest"),
        }
    }
}

impl FromStr for VersionId {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("latest") {
            return Ok(Self::Latest);
        }
        let invalid = || VersionError::InvalidVersion(s.to_string());
        let rest = s.strip_prefix("1.").ok_or_else(invalid)?;
        let mut parts = rest.splitn(2, '.');
        let minor = parts
            .next()
            .and_then(|p| p.parse::<u16>().ok())
            .ok_or_else(invalid)?;
        let patch = match parts.next() {
            Some(p) => p.parse::<u16>().map_err(|_| invalid())?,
            None => 0,
        };
        Ok(Self::Release { minor, patch })
    }
}

impl TryFrom<String> for VersionId {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersionId> for String {
    fn from(value: VersionId) -> Self {
        value.to_string()
    }
}
