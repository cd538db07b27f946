//! Wiki page access.
//!
//! This module provides the `WikiSource` trait the page selector fetches
//! through, a MediaWiki API client implementing it, and an on-disk cache
//! wrapper.

mod cache;
mod mediawiki;
mod types;

pub use cache::{
    cache_key, CacheConfig, CachedWikiSource, DiskCache, MAX_TTL_HOURS, RAW_CACHE_VERSION,
};
pub use mediawiki::{MediaWikiClient, MediaWikiConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the wiki.
#[derive(Debug, Error)]
pub enum WikiError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit exceeded and the retry budget is spent.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Cache read or write failed.
    #[error("Cache error: {0}")]
    Cache(String),
}

/// Source of wiki pages.
///
/// Implementations are expected to follow redirects and handle their own
/// rate limiting and retries.
#[async_trait]
pub trait WikiSource: Send + Sync {
    /// Full-text search, returning page titles in relevance order.
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<String>, WikiError>;

    /// Fetch a page's markup by title. `Ok(None)` means the page does not exist.
    async fn fetch_page(&self, title: &str) -> Result<Option<WikiPage>, WikiError>;
}
