//! Reference asset catalogs.
//!
//! A reference catalog is the authoritative list of asset paths a given
//! platform release ships, used by the validation engine to grade a
//! materialized tree. Catalogs come from an external release-manifest
//! service; this module specifies that boundary as traits
//! ([`HttpClient`], [`CatalogSource`]) so tests inject fixtures instead
//! of the network.
//!
//! Results are cached by `(version, edition, catalog format)` - the
//! format component invalidates older cache entries whenever the parsing
//! logic changes shape.

mod manifest;

pub use manifest::{select_versions, ManifestEntry, ReleaseKind, VersionManifest, RELEASE_FLOOR};

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::store::BoxFuture;

/// Result type for reference-catalog operations.
pub type ReferenceResult<T> = Result<T, ReferenceError>;

/// Errors from fetching or decoding reference catalogs.
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body could not be decoded.
    #[error("malformed catalog document: {0}")]
    Json(#[from] serde_json::Error),

    /// The manifest does not list the requested release.
    #[error("version {version} not found in {edition} manifest")]
    VersionNotFound {
        /// The edition searched.
        edition: Edition,
        /// The requested release identifier.
        version: String,
    },
}

/// Bump when the catalog parsing logic changes shape; stale cache
/// entries keyed under older formats are simply never hit again.
pub const CATALOG_FORMAT_VERSION: u32 = 3;

/// The two supported platform editions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edition {
    /// The desktop edition.
    Java,
    /// The cross-platform edition.
    Bedrock,
}

impl Edition {
    /// The release-manifest endpoint for this edition.
    pub fn manifest_url(&self) -> &'static str {
        match self {
            Edition::Java => "https://launchermeta.mojang.com/mc/game/version_manifest.json",
            Edition::Bedrock => "https://mcversions.net/api/bedrock/version_manifest.json",
        }
    }
}

impl std::fmt::Display for Edition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edition::Java => write!(f, "java"),
            Edition::Bedrock => write!(f, "bedrock"),
        }
    }
}

/// Cache key for one catalog lookup.
pub fn catalog_cache_key(version: &str, edition: Edition) -> String {
    format!("{}-{}-v{}", version, edition, CATALOG_FORMAT_VERSION)
}

/// The authoritative asset list for one release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceCatalog {
    /// The edition this catalog belongs to.
    pub edition: Edition,
    /// The release identifier as the manifest spells it.
    pub version: String,
    /// Expected asset paths, relative to a pack root.
    pub paths: BTreeSet<String>,
    /// Stable locator for the release's raw package.
    pub download_url: String,
}

/// Trait for HTTP transport, injected for testability.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET, returning the response body.
    fn get(&self, url: &str) -> BoxFuture<'_, ReferenceResult<Vec<u8>>>;
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client with a 30 second timeout.
    pub fn new() -> ReferenceResult<Self> {
        Self::with_timeout(30)
    }

    /// Creates a client with a custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> ReferenceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ReferenceError::Http(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> BoxFuture<'_, ReferenceResult<Vec<u8>>> {
        let url = url.to_string();
        Box::pin(async move {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| ReferenceError::Http(format!("request failed: {}", e)))?;
            if !response.status().is_success() {
                return Err(ReferenceError::Http(format!(
                    "HTTP {} from {}",
                    response.status(),
                    url
                )));
            }
            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| ReferenceError::Http(format!("failed to read response: {}", e)))
        })
    }
}

/// Source of reference catalogs.
pub trait CatalogSource: Send + Sync {
    /// The catalog for one release of one edition.
    fn catalog(
        &self,
        edition: Edition,
        version: &str,
    ) -> BoxFuture<'_, ReferenceResult<Arc<ReferenceCatalog>>>;
}

#[derive(Deserialize)]
struct VersionDocument {
    #[serde(default)]
    objects: std::collections::BTreeMap<String, serde_json::Value>,
    downloads: Downloads,
}

#[derive(Deserialize)]
struct Downloads {
    client: DownloadLocator,
}

#[derive(Deserialize)]
struct DownloadLocator {
    url: String,
}

/// Catalog source backed by the release-manifest service.
pub struct HttpCatalogSource {
    http: Arc<dyn HttpClient>,
    cache: DashMap<String, Arc<ReferenceCatalog>>,
}

impl HttpCatalogSource {
    /// Create a source over the given transport.
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            cache: DashMap::new(),
        }
    }

    async fn fetch(&self, edition: Edition, version: &str) -> ReferenceResult<ReferenceCatalog> {
        let manifest_bytes = self.http.get(edition.manifest_url()).await?;
        let manifest: VersionManifest = serde_json::from_slice(&manifest_bytes)?;
        let entry = manifest
            .versions
            .iter()
            .find(|e| e.id == version)
            .ok_or_else(|| ReferenceError::VersionNotFound {
                edition,
                version: version.to_string(),
            })?;

        let document_bytes = self.http.get(&entry.url).await?;
        let document: VersionDocument = serde_json::from_slice(&document_bytes)?;
        Ok(ReferenceCatalog {
            edition,
            version: version.to_string(),
            paths: document.objects.into_keys().collect(),
            download_url: document.downloads.client.url,
        })
    }
}

impl CatalogSource for HttpCatalogSource {
    fn catalog(
        &self,
        edition: Edition,
        version: &str,
    ) -> BoxFuture<'_, ReferenceResult<Arc<ReferenceCatalog>>> {
        let version = version.to_string();
        Box::pin(async move {
            let key = catalog_cache_key(&version, edition);
            if let Some(cached) = self.cache.get(&key) {
                debug!(key = %key, "reference catalog cache hit");
                return Ok(Arc::clone(&cached));
            }
            let catalog = Arc::new(self.fetch(edition, &version).await?);
            self.cache.insert(key, Arc::clone(&catalog));
            Ok(catalog)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport serving canned bodies and counting requests.
    struct FixtureClient {
        requests: AtomicUsize,
    }

    impl HttpClient for FixtureClient {
        fn get(&self, url: &str) -> BoxFuture<'_, ReferenceResult<Vec<u8>>> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let body = if url.ends_with("version_manifest.json") {
                r#"{"versions":[
                    {"id":"1.12.2","type":"release","releaseTime":"2017-09-18T08:39:46+00:00","url":"https://example.com/1.12.2.json"}
                ]}"#
                .to_string()
            } else {
                r#"{
                    "objects":{"assets/minecraft/textures/block/stone.png":{}},
                    "downloads":{"client":{"url":"https://example.com/client.jar"}}
                }"#
                .to_string()
            };
            Box::pin(async move { Ok(body.into_bytes()) })
        }
    }

    #[tokio::test]
    async fn test_catalog_fetch_and_parse() {
        let client = Arc::new(FixtureClient {
            requests: AtomicUsize::new(0),
        });
        let source = HttpCatalogSource::new(Arc::clone(&client) as Arc<dyn HttpClient>);

        let catalog = source.catalog(Edition::Java, "1.12.2").await.unwrap();
        assert_eq!(catalog.version, "1.12.2");
        assert_eq!(catalog.download_url, "https://example.com/client.jar");
        assert!(catalog
            .paths
            .contains("assets/minecraft/textures/block/stone.png"));
    }

    #[tokio::test]
    async fn test_catalog_is_cached_by_version_and_edition() {
        let client = Arc::new(FixtureClient {
            requests: AtomicUsize::new(0),
        });
        let source = HttpCatalogSource::new(Arc::clone(&client) as Arc<dyn HttpClient>);

        source.catalog(Edition::Java, "1.12.2").await.unwrap();
        source.catalog(Edition::Java, "1.12.2").await.unwrap();
        // Two requests for the first lookup (manifest + document), none
        // for the second.
        assert_eq!(client.requests.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_version_is_an_error() {
        let client = Arc::new(FixtureClient {
            requests: AtomicUsize::new(0),
        });
        let source = HttpCatalogSource::new(client as Arc<dyn HttpClient>);
        let err = source.catalog(Edition::Java, "1.99").await;
        assert!(matches!(err, Err(ReferenceError::VersionNotFound { .. })));
    }

    #[test]
    fn test_cache_key_includes_format_version() {
        let key = catalog_cache_key("1.12.2", Edition::Java);
        assert_eq!(key, format!("1.12.2-java-v{}", CATALOG_FORMAT_VERSION));
    }
}
