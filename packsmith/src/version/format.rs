//! Release → pack-format lookup table.
//!
//! Each platform release expects a specific `pack_format` integer in the
//! pack manifest; loading a pack whose format does not match produces a
//! warning in the platform UI. The table below follows the published
//! format history.

use super::VersionId;

/// Pack format written for open-ended branches targeting `Latest`.
const LATEST_PACK_FORMAT: u32 = 34;

/// Returns the manifest `pack_format` integer for a target release.
///
/// Releases older than the first resource-pack-aware release (1.6) are
/// collapsed onto format 1, matching platform behavior.
///
/// # Example
///
/// ```
/// use packsmith::version::{pack_format, VersionId};
///
/// assert_eq!(pack_format("1.12.2".parse().unwrap()), 3);
/// assert_eq!(pack_format("1.16.5".parse().unwrap()), 6);
/// assert_eq!(pack_format(VersionId::Latest), 34);
/// ```
pub fn pack_format(version: VersionId) -> u32 {
    let (minor, patch) = match version {
        VersionId::Release { minor, patch } => (minor, patch),
        VersionId::Latest => return LATEST_PACK_FORMAT,
    };
    match (minor, patch) {
        (0..=8, _) => 1,
        (9..=10, _) => 2,
        (11..=12, _) => 3,
        (13..=14, _) => 4,
        (15, _) | (16, 0..=1) => 5,
        (16, _) => 6,
        (17, _) => 7,
        (18, _) => 8,
        (19, 0..=2) => 9,
        (19, 3) => 12,
        (19, _) => 13,
        (20, 0..=1) => 15,
        (20, 2) => 18,
        (20, 3..=4) => 22,
        (20, _) => 32,
        _ => LATEST_PACK_FORMAT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(s: &str) -> u32 {
        pack_format(s.parse().unwrap())
    }

    #[test]
    fn test_format_boundaries() {
        assert_eq!(fmt("1.8.9"), 1);
        assert_eq!(fmt("1.9"), 2);
        assert_eq!(fmt("1.12.2"), 3);
        assert_eq!(fmt("1.13"), 4);
        assert_eq!(fmt("1.16.1"), 5);
        assert_eq!(fmt("1.16.2"), 6);
        assert_eq!(fmt("1.19.2"), 9);
        assert_eq!(fmt("1.19.3"), 12);
        assert_eq!(fmt("1.20.4"), 22);
    }

    #[test]
    fn test_latest_uses_newest_format() {
        assert_eq!(pack_format(VersionId::Latest), 34);
        assert_eq!(fmt("1.21"), 34);
    }

    #[test]
    fn test_pre_resource_pack_releases_collapse_to_one() {
        assert_eq!(fmt("1.0"), 1);
        assert_eq!(fmt("1.6.4"), 1);
    }
}
