//! On-disk JSON cache with TTL and format version tags.
//!
//! Each entry records the version tag it was written with. Bumping a tag
//! invalidates only the entries written under it, so raw page caches survive
//! parser changes while parsed results do not.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::types::WikiPage;
use super::{WikiError, WikiSource};

/// Version tag for raw search results and page markup.
pub const RAW_CACHE_VERSION: &str = "raw-v1";

/// Longest accepted entry lifetime, one hundred years.
pub const MAX_TTL_HOURS: u64 = 24 * 365 * 100;

/// Maximum length of the sanitized part of a cache file name.
const MAX_KEY_LEN: usize = 80;

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether caching is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Cache directory.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
    /// Entry lifetime in hours.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".volumewiki-cache")
}

fn default_ttl_hours() -> u64 {
    24 * 7
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            dir: default_cache_dir(),
            ttl_hours: default_ttl_hours(),
        }
    }
}

/// Sanitize request parameters into a file-name-safe, length-capped key.
///
/// Non-alphanumerics collapse to `_`. Keys longer than the cap are cut and
/// suffixed with a hash of the full input so distinct requests stay distinct.
pub fn cache_key(raw: &str) -> String {
    let mut sanitized = String::with_capacity(raw.len());
    for c in raw.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            sanitized.push(c);
        } else if !sanitized.ends_with('_') {
            sanitized.push('_');
        }
    }
    let sanitized = sanitized.trim_matches('_');

    if sanitized.len() <= MAX_KEY_LEN && !sanitized.is_empty() {
        return sanitized.to_string();
    }

    let digest = format!("{:x}", Sha256::digest(raw.as_bytes()));
    let head: String = sanitized.chars().take(MAX_KEY_LEN).collect();
    format!("{}-{}", head.trim_end_matches('_'), &digest[..16])
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    version: String,
    stored_at: DateTime<Utc>,
    value: T,
}

/// JSON files under a directory, one per key, grouped by namespace.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
    ttl: Duration,
}

impl DiskCache {
    /// Create a cache rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    /// Build a cache from configuration, or `None` when caching is disabled.
    pub fn from_config(config: &CacheConfig) -> Option<Self> {
        config.enabled.then(|| {
            let hours = i64::try_from(config.ttl_hours.min(MAX_TTL_HOURS)).unwrap_or_default();
            let ttl = Duration::try_hours(hours).unwrap_or_else(|| Duration::days(36_500));
            Self::new(&config.dir, ttl)
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, namespace: &str, key: &str) -> PathBuf {
        self.dir
            .join(namespace)
            .join(format!("{}.json", cache_key(key)))
    }

    /// Read an entry. Missing, stale, mismatched-version and unreadable entries are misses.
    pub async fn get<T: DeserializeOwned>(
        &self,
        namespace: &str,
        key: &str,
        version: &str,
    ) -> Option<T> {
        let path = self.path_for(namespace, key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read cache entry {:?}: {}", path, e);
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Discarding corrupt cache entry {:?}: {}", path, e);
                return None;
            }
        };

        if entry.version != version {
            debug!(
                "Cache version mismatch for {:?}: {} != {}",
                path, entry.version, version
            );
            return None;
        }

        if Utc::now() - entry.stored_at > self.ttl {
            debug!("Cache entry expired: {:?}", path);
            return None;
        }

        Some(entry.value)
    }

    /// Write an entry, replacing any previous one.
    pub async fn put<T: Serialize>(
        &self,
        namespace: &str,
        key: &str,
        version: &str,
        value: &T,
    ) -> Result<(), WikiError> {
        let path = self.path_for(namespace, key);
        let entry = CacheEntry {
            version: version.to_string(),
            stored_at: Utc::now(),
            value,
        };
        let bytes = serde_json::to_vec(&entry)
            .map_err(|e| WikiError::Cache(format!("Failed to serialize entry: {}", e)))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| WikiError::Cache(format!("Failed to create {:?}: {}", parent, e)))?;
        }

        // Write to a sibling file first so readers never see a partial entry.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| WikiError::Cache(format!("Failed to write {:?}: {}", tmp, e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| WikiError::Cache(format!("Failed to write {:?}: {}", path, e)))?;

        Ok(())
    }

    /// Write an entry, logging instead of failing.
    pub async fn put_or_warn<T: Serialize>(
        &self,
        namespace: &str,
        key: &str,
        version: &str,
        value: &T,
    ) {
        if let Err(e) = self.put(namespace, key, version, value).await {
            warn!("{}", e);
        }
    }
}

/// A `WikiSource` that keeps raw search results and pages on disk.
pub struct CachedWikiSource<S> {
    inner: S,
    cache: DiskCache,
}

impl<S: WikiSource> CachedWikiSource<S> {
    pub fn new(inner: S, cache: DiskCache) -> Self {
        Self { inner, cache }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: WikiSource> WikiSource for CachedWikiSource<S> {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<String>, WikiError> {
        let key = format!("{}_{}", query, limit);
        if let Some(titles) = self.cache.get("search", &key, RAW_CACHE_VERSION).await {
            debug!("Search cache hit: '{}'", query);
            return Ok(titles);
        }

        let titles = self.inner.search(query, limit).await?;
        self.cache
            .put_or_warn("search", &key, RAW_CACHE_VERSION, &titles)
            .await;
        Ok(titles)
    }

    async fn fetch_page(&self, title: &str) -> Result<Option<WikiPage>, WikiError> {
        if let Some(page) = self
            .cache
            .get::<Option<WikiPage>>("page", title, RAW_CACHE_VERSION)
            .await
        {
            debug!("Page cache hit: '{}'", title);
            return Ok(page);
        }

        let page = self.inner.fetch_page(title).await?;
        self.cache
            .put_or_warn("page", title, RAW_CACHE_VERSION, &page)
            .await;
        Ok(page)
    }
}
