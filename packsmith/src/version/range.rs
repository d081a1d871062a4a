//! Inclusive version ranges.

use serde::{Deserialize, Serialize};

use super::{VersionError, VersionId, VersionResult};

/// An inclusive interval over platform releases.
///
/// A range with `max == VersionId::Latest` is open-ended and tracks every
/// future release. Ranges attached to a published output location are
/// treated as immutable; widening one is modeled as adding a new output
/// location instead.
///
/// # Example
///
/// ```
/// use packsmith::version::{VersionId, VersionRange};
///
/// let range = VersionRange::new("1.7".parse()?, "1.12.2".parse()?)?;
/// assert!(range.matches("1.10".parse()?));
/// assert!(!range.matches("1.16".parse()?));
/// # Ok::<(), packsmith::version::VersionError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionRange {
    /// Lower bound (inclusive).
    pub min: VersionId,
    /// Upper bound (inclusive); `Latest` for open-ended ranges.
    pub max: VersionId,
}

impl VersionRange {
    /// Create a range, rejecting inverted bounds.
    pub fn new(min: VersionId, max: VersionId) -> VersionResult<Self> {
        if min > max {
            return Err(VersionError::EmptyRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Open-ended range from `min` through every future release.
    pub fn since(min: VersionId) -> Self {
        Self {
            min,
            max: VersionId::Latest,
        }
    }

    /// Range covering exactly one release.
    pub fn only(version: VersionId) -> Self {
        Self {
            min: version,
            max: version,
        }
    }

    /// Range covering every release.
    pub fn any() -> Self {
        Self {
            min: VersionId::release(0, 0),
            max: VersionId::Latest,
        }
    }

    /// Membership test: `min <= version <= max`.
    pub fn matches(&self, version: VersionId) -> bool {
        self.min <= version && version <= self.max
    }

    /// Overlap test: true when either endpoint of one range falls inside
    /// the other.
    pub fn overlaps(&self, other: &VersionRange) -> bool {
        self.matches(other.min)
            || self.matches(other.max)
            || other.matches(self.min)
            || other.matches(self.max)
    }
}

impl std::fmt::Display for VersionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
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
    fn test_new_rejects_inverted_bounds() {
        let err = VersionRange::new(v("1.13"), v("1.7"));
        assert!(matches!(err, Err(VersionError::EmptyRange { .. })));
    }

    #[test]
    fn test_matches_is_inclusive_on_both_ends() {
        let r = range("1.7", "1.12.2");
        assert!(r.matches(v("1.7")));
        assert!(r.matches(v("1.12.2")));
        assert!(r.matches(v("1.9")));
        assert!(!r.matches(v("1.6.4")));
        assert!(!r.matches(v("1.13")));
    }

    #[test]
    fn test_since_matches_all_future_releases() {
        let r = VersionRange::since(v("1.13"));
        assert!(r.matches(v("1.13")));
        assert!(r.matches(v("1.21.4")));
        assert!(r.matches(VersionId::Latest));
        assert!(!r.matches(v("1.12.2")));
    }

    #[test]
    fn test_overlaps_partial() {
        assert!(range("1.7", "1.12").overlaps(&range("1.10", "1.16")));
        assert!(range("1.10", "1.16").overlaps(&range("1.7", "1.12")));
    }

    #[test]
    fn test_overlaps_containment_both_directions() {
        let outer = range("1.7", "1.20");
        let inner = range("1.12", "1.13");
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_disjoint_ranges_do_not_overlap() {
        assert!(!range("1.7", "1.12.2").overlaps(&range("1.13", "1.16")));
    }

    #[test]
    fn test_single_version_range() {
        let r = VersionRange::only(v("1.14.4"));
        assert!(r.matches(v("1.14.4")));
        assert!(!r.matches(v("1.14.3")));
        assert!(!r.matches(v("1.15")));
    }
}
