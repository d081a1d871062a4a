//! Release-manifest parsing and version selection.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::version::VersionId;

/// Oldest release considered for validation; resource packs predating
/// this are not materialized by any pack.
pub const RELEASE_FLOOR: &str = "2013-07-01T00:00:00Z";

/// Release channel of a manifest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseKind {
    /// Full release.
    Release,
    /// Pre-release or snapshot build.
    Snapshot,
    /// Historical alpha/beta builds, never selected.
    #[serde(other)]
    Legacy,
}

/// One entry of the release manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    /// Release identifier as the manifest spells it.
    pub id: String,

    /// Release channel.
    #[serde(rename = "type")]
    pub kind: ReleaseKind,

    /// Publication timestamp.
    #[serde(rename = "releaseTime")]
    pub release_time: DateTime<Utc>,

    /// Per-version document locator.
    pub url: String,
}

/// The release manifest: every version the platform ever published.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionManifest {
    /// All published versions, newest first.
    pub versions: Vec<ManifestEntry>,
}

/// Selects the versions worth validating against.
///
/// Policy: every full release at or after [`RELEASE_FLOOR`], collapsed
/// to the highest patch per minor line, ordered oldest first - plus the
/// newest snapshot appended when it is newer than the newest full
/// release.
///
/// The snapshot special case mirrors launcher behavior rather than any
/// invariant of ours; it is a policy worth revisiting.
pub fn select_versions(manifest: &VersionManifest) -> Vec<ManifestEntry> {
    let floor: DateTime<Utc> = RELEASE_FLOOR
        .parse()
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut per_minor: Vec<(VersionId, ManifestEntry)> = Vec::new();
    for entry in &manifest.versions {
        if entry.kind != ReleaseKind::Release || entry.release_time < floor {
            continue;
        }
        let Ok(version) = entry.id.parse::<VersionId>() else {
            continue;
        };
        match per_minor
            .iter_mut()
            .find(|(v, _)| v.minor() == version.minor())
        {
            Some(slot) if slot.0 < version => *slot = (version, entry.clone()),
            Some(_) => {}
            None => per_minor.push((version, entry.clone())),
        }
    }
    per_minor.sort_by_key(|(v, _)| *v);

    let newest_release_time = per_minor
        .iter()
        .map(|(_, e)| e.release_time)
        .max()
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let newest_snapshot = manifest
        .versions
        .iter()
        .filter(|e| e.kind == ReleaseKind::Snapshot)
        .max_by_key(|e| e.release_time)
        .filter(|e| e.release_time > newest_release_time);

    let mut selected: Vec<ManifestEntry> = per_minor.into_iter().map(|(_, e)| e).collect();
    if let Some(snapshot) = newest_snapshot {
        selected.push(snapshot.clone());
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, kind: ReleaseKind, time: &str) -> ManifestEntry {
        ManifestEntry {
            id: id.to_string(),
            kind,
            release_time: time.parse().unwrap(),
            url: format!("https://example.com/{}.json", id),
        }
    }

    #[test]
    fn test_collapses_to_highest_patch_per_minor() {
        let manifest = VersionManifest {
            versions: vec![
                entry("1.12.2", ReleaseKind::Release, "2017-09-18T08:39:46Z"),
                entry("1.12.1", ReleaseKind::Release, "2017-08-03T12:40:39Z"),
                entry("1.12", ReleaseKind::Release, "2017-06-02T13:50:27Z"),
                entry("1.11.2", ReleaseKind::Release, "2016-12-21T09:29:12Z"),
            ],
        };
        let selected = select_versions(&manifest);
        let ids: Vec<&str> = selected.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1.11.2", "1.12.2"]);
    }

    #[test]
    fn test_floor_excludes_early_releases() {
        let manifest = VersionManifest {
            versions: vec![
                entry("1.5.2", ReleaseKind::Release, "2013-04-25T15:45:00Z"),
                entry("1.7.10", ReleaseKind::Release, "2014-05-14T17:29:23Z"),
            ],
        };
        let selected = select_versions(&manifest);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "1.7.10");
    }

    #[test]
    fn test_newer_snapshot_is_appended() {
        let manifest = VersionManifest {
            versions: vec![
                entry("24w14a", ReleaseKind::Snapshot, "2024-04-03T11:49:39Z"),
                entry("1.20.4", ReleaseKind::Release, "2023-12-07T12:56:20Z"),
            ],
        };
        let selected = select_versions(&manifest);
        let ids: Vec<&str> = selected.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1.20.4", "24w14a"]);
    }

    #[test]
    fn test_older_snapshot_is_dropped() {
        let manifest = VersionManifest {
            versions: vec![
                entry("1.20.4", ReleaseKind::Release, "2023-12-07T12:56:20Z"),
                entry("23w31a", ReleaseKind::Snapshot, "2023-08-01T10:03:13Z"),
            ],
        };
        let selected = select_versions(&manifest);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "1.20.4");
    }

    #[test]
    fn test_legacy_channels_never_selected() {
        let raw = r#"{"versions":[
            {"id":"b1.8.1","type":"old_beta","releaseTime":"2011-09-19T22:00:00+00:00","url":"https://example.com/b181.json"}
        ]}"#;
        let manifest: VersionManifest = serde_json::from_str(raw).unwrap();
        assert_eq!(manifest.versions[0].kind, ReleaseKind::Legacy);
        assert!(select_versions(&manifest).is_empty());
    }

    #[test]
    fn test_selection_is_oldest_first() {
        let manifest = VersionManifest {
            versions: vec![
                entry("1.16.5", ReleaseKind::Release, "2021-01-14T16:05:32Z"),
                entry("1.13.2", ReleaseKind::Release, "2018-10-22T11:41:07Z"),
                entry("1.20.1", ReleaseKind::Release, "2023-06-12T13:25:51Z"),
            ],
        };
        let ids: Vec<String> = select_versions(&manifest)
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["1.13.2", "1.16.5", "1.20.1"]);
    }
}
