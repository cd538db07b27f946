//! Mock wiki source for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::wiki::{WikiError, WikiPage, WikiSource};

/// A recorded wiki request for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedWikiQuery {
    Search { query: String, limit: u32 },
    FetchPage { title: String },
}

/// Mock implementation of the WikiSource trait.
///
/// Provides controllable behavior for testing:
/// - Serve pages from memory, following configured redirects
/// - Return fixed search results
/// - Track requests for assertions
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// use volumewiki_core::testing::{fixtures, MockWikiSource};
///
/// let source = MockWikiSource::new();
/// source.set_search_results(vec!["Naruto".to_string()]).await;
/// source.add_page("List of Naruto chapters", &fixtures::volume_section("Volume list", 2, 1..=3)).await;
/// ```
#[derive(Debug)]
pub struct MockWikiSource {
    /// Pages by exact title.
    pages: Arc<RwLock<HashMap<String, WikiPage>>>,
    /// Redirects from title to target title.
    redirects: Arc<RwLock<HashMap<String, String>>>,
    /// Titles returned by every search.
    search_results: Arc<RwLock<Vec<String>>>,
    /// Recorded requests.
    queries: Arc<RwLock<Vec<RecordedWikiQuery>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<WikiError>>>,
    next_page_id: AtomicU64,
}

impl Default for MockWikiSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWikiSource {
    /// Create a new empty mock wiki.
    pub fn new() -> Self {
        Self {
            pages: Arc::new(RwLock::new(HashMap::new())),
            redirects: Arc::new(RwLock::new(HashMap::new())),
            search_results: Arc::new(RwLock::new(Vec::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            next_page_id: AtomicU64::new(1000),
        }
    }

    // =========================================================================
    // Content Configuration
    // =========================================================================

    /// Add a page with an automatically assigned page id. Returns the id.
    pub async fn add_page(&self, title: &str, markup: &str) -> u64 {
        let page_id = self.next_page_id.fetch_add(1, Ordering::Relaxed);
        self.pages.write().await.insert(
            title.to_string(),
            WikiPage {
                page_id,
                title: title.to_string(),
                markup: markup.to_string(),
            },
        );
        page_id
    }

    /// Make `from` resolve to the page titled `to`.
    pub async fn add_redirect(&self, from: &str, to: &str) {
        self.redirects
            .write()
            .await
            .insert(from.to_string(), to.to_string());
    }

    /// Set the titles every search returns.
    pub async fn set_search_results(&self, titles: Vec<String>) {
        *self.search_results.write().await = titles;
    }

    // =========================================================================
    // Query Recording
    // =========================================================================

    /// Get all recorded requests.
    pub async fn recorded_queries(&self) -> Vec<RecordedWikiQuery> {
        self.queries.read().await.clone()
    }

    /// Titles passed to `fetch_page`, in call order.
    pub async fn fetched_titles(&self) -> Vec<String> {
        self.queries
            .read()
            .await
            .iter()
            .filter_map(|q| match q {
                RecordedWikiQuery::FetchPage { title } => Some(title.clone()),
                RecordedWikiQuery::Search { .. } => None,
            })
            .collect()
    }

    /// Number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.queries
            .read()
            .await
            .iter()
            .filter(|q| matches!(q, RecordedWikiQuery::Search { .. }))
            .count()
    }

    /// Clear recorded requests.
    pub async fn clear_recorded(&self) {
        self.queries.write().await.clear();
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: WikiError) {
        *self.next_error.write().await = Some(error);
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<WikiError> {
        self.next_error.write().await.take()
    }

    /// Record a request.
    async fn record(&self, query: RecordedWikiQuery) {
        self.queries.write().await.push(query);
    }
}

#[async_trait]
impl WikiSource for MockWikiSource {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<String>, WikiError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(RecordedWikiQuery::Search {
            query: query.to_string(),
            limit,
        })
        .await;

        Ok(self
            .search_results
            .read()
            .await
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn fetch_page(&self, title: &str) -> Result<Option<WikiPage>, WikiError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(RecordedWikiQuery::FetchPage {
            title: title.to_string(),
        })
        .await;

        let target = self
            .redirects
            .read()
            .await
            .get(title)
            .cloned()
            .unwrap_or_else(|| title.to_string());

        Ok(self.pages.read().await.get(&target).cloned())
    }
}
