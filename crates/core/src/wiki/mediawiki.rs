//! MediaWiki API client.
//!
//! Wikimedia asks clients for:
//! - a descriptive User-Agent with contact info
//! - serialized requests, backing off on 429 / 503

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use super::types::WikiPage;
use super::{WikiError, WikiSource};

/// MediaWiki API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaWikiConfig {
    /// API endpoint (default: https://en.wikipedia.org/w/api.php).
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// User-Agent string.
    /// Format: "AppName/Version ( contact )"
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Minimum delay between requests in milliseconds.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_ms: u64,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Retries on throttling and transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay for exponential backoff in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Number of full-text search results to consider.
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
}

fn default_api_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_user_agent() -> String {
    format!(
        "VolumeWiki/{} ( https://github.com/lelloman/volumewiki )",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_rate_limit() -> u64 {
    200
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    500
}

fn default_search_limit() -> u32 {
    10
}

impl Default for MediaWikiConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            user_agent: default_user_agent(),
            rate_limit_ms: default_rate_limit(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
            search_limit: default_search_limit(),
        }
    }
}

/// MediaWiki API client.
pub struct MediaWikiClient {
    client: Client,
    api_url: String,
    last_request: Arc<Mutex<Option<Instant>>>,
    rate_limit: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

impl MediaWikiClient {
    /// Create a new MediaWiki client.
    pub fn new(config: MediaWikiConfig) -> Result<Self, WikiError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url,
            last_request: Arc::new(Mutex::new(None)),
            rate_limit: Duration::from_millis(config.rate_limit_ms),
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// Wait for rate limit if needed.
    async fn wait_for_rate_limit(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.rate_limit {
                let wait_time = self.rate_limit - elapsed;
                debug!("MediaWiki rate limit: waiting {:?}", wait_time);
                sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }

    /// GET the API with retries on throttling and transient failures.
    async fn get_json<T: DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, WikiError> {
        let mut pairs: Vec<(&str, &str)> = vec![("format", "json"), ("formatversion", "2")];
        pairs.extend_from_slice(params);

        let mut attempt = 0;
        loop {
            self.wait_for_rate_limit().await;

            let result = self.client.get(&self.api_url).query(&pairs).send().await;
            let response = match result {
                Ok(response) => response,
                Err(e) if attempt < self.max_retries && is_retryable_error(&e) => {
                    warn!("MediaWiki request failed (attempt {}): {}", attempt + 1, e);
                    sleep(backoff_delay(self.retry_delay, attempt)).await;
                    attempt += 1;
                    continue;
                }
                Err(e) => return Err(WikiError::Http(e)),
            };

            let status = response.status();
            if status.is_success() {
                return response.json::<T>().await.map_err(|e| {
                    WikiError::Parse(format!("Failed to parse API response: {}", e))
                });
            }

            if attempt < self.max_retries && is_retryable_status(status) {
                warn!(
                    "MediaWiki returned {} (attempt {}), backing off",
                    status,
                    attempt + 1
                );
                sleep(backoff_delay(self.retry_delay, attempt)).await;
                attempt += 1;
                continue;
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!("MediaWiki rate limit exceeded");
                return Err(WikiError::RateLimitExceeded);
            }

            let body = response.text().await.unwrap_or_default();
            return Err(WikiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
    }
}

#[async_trait]
impl WikiSource for MediaWikiClient {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<String>, WikiError> {
        debug!("MediaWiki search: query='{}', limit={}", query, limit);

        let limit = limit.clamp(1, 500).to_string();
        let response: SearchResponse = self
            .get_json(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("srprop", ""),
            ])
            .await?;

        if let Some(error) = response.error {
            return Err(error.into());
        }

        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    async fn fetch_page(&self, title: &str) -> Result<Option<WikiPage>, WikiError> {
        debug!("MediaWiki fetch page: title='{}'", title);

        let response: ParseResponse = self
            .get_json(&[
                ("action", "parse"),
                ("page", title),
                ("prop", "wikitext"),
                ("redirects", "1"),
            ])
            .await?;

        match (response.parse, response.error) {
            (Some(page), _) => Ok(Some(page.into())),
            (None, Some(error)) if error.is_missing_page() => {
                debug!("MediaWiki page not found: '{}'", title);
                Ok(None)
            }
            (None, Some(error)) => Err(error.into()),
            (None, None) => Err(WikiError::Parse(
                "Parse response carried neither page nor error".to_string(),
            )),
        }
    }
}

/// Exponential backoff with a small deterministic jitter.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let scale = 1u32 << attempt.min(8);
    let jitter = Duration::from_millis(u64::from((attempt * 17 + 31) % 97));
    base.saturating_mul(scale) + jitter
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}

// ============================================================================
// MediaWiki API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    info: String,
}

impl ApiError {
    fn is_missing_page(&self) -> bool {
        matches!(self.code.as_str(), "missingtitle" | "invalidtitle" | "nosuchpageid")
    }
}

impl From<ApiError> for WikiError {
    fn from(error: ApiError) -> Self {
        WikiError::Api {
            status: 200,
            message: format!("{}: {}", error.code, error.info),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ParseResponse {
    #[serde(default)]
    parse: Option<ParsedPage>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ParsedPage {
    title: String,
    #[serde(rename = "pageid")]
    page_id: u64,
    #[serde(default)]
    wikitext: String,
}

impl From<ParsedPage> for WikiPage {
    fn from(page: ParsedPage) -> Self {
        WikiPage {
            page_id: page.page_id,
            title: page.title,
            markup: page.wikitext,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_page() {
        let json = r#"{"parse":{"title":"List of Naruto chapters","pageid":1234,"wikitext":"==Manga=="}}"#;
        let response: ParseResponse = serde_json::from_str(json).unwrap();
        let page: WikiPage = response.parse.unwrap().into();

        assert_eq!(page.page_id, 1234);
        assert_eq!(page.title, "List of Naruto chapters");
        assert_eq!(page.markup, "==Manga==");
    }

    #[test]
    fn test_parse_response_missing_title() {
        let json = r#"{"error":{"code":"missingtitle","info":"The page you specified doesn't exist."}}"#;
        let response: ParseResponse = serde_json::from_str(json).unwrap();

        assert!(response.parse.is_none());
        assert!(response.error.unwrap().is_missing_page());
    }

    #[test]
    fn test_search_response() {
        let json = r#"{"batchcomplete":true,"query":{"searchinfo":{"totalhits":2},"search":[{"ns":0,"title":"Demon Slayer (manga)"},{"ns":0,"title":"Demon Slayer"}]}}"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        let titles: Vec<String> = response
            .query
            .unwrap()
            .search
            .into_iter()
            .map(|h| h.title)
            .collect();

        assert_eq!(titles, vec!["Demon Slayer (manga)", "Demon Slayer"]);
    }

    #[test]
    fn test_api_error_conversion() {
        let error = ApiError {
            code: "ratelimited".to_string(),
            info: "Slow down".to_string(),
        };
        match WikiError::from(error) {
            WikiError::Api { message, .. } => assert_eq!(message, "ratelimited: Slow down"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_backoff_grows() {
        let base = Duration::from_millis(100);
        assert!(backoff_delay(base, 1) > backoff_delay(base, 0));
        assert!(backoff_delay(base, 2) > backoff_delay(base, 1));
        assert!(backoff_delay(base, 0) >= base);
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::FORBIDDEN));
    }

    #[test]
    fn test_default_config() {
        let config = MediaWikiConfig::default();
        assert_eq!(config.api_url, "https://en.wikipedia.org/w/api.php");
        assert_eq!(config.search_limit, 10);
        assert!(config.user_agent.starts_with("VolumeWiki/"));
    }

    #[test]
    fn test_client_builds() {
        assert!(MediaWikiClient::new(MediaWikiConfig::default()).is_ok());
    }
}
