use serde::{Deserialize, Serialize};

use crate::selector::SelectorConfig;
use crate::wiki::{CacheConfig, MediaWikiConfig};

/// Root configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Wiki API access.
    #[serde(default)]
    pub wiki: MediaWikiConfig,
    /// On-disk cache for raw pages and parsed series.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Page selection.
    #[serde(default)]
    pub selector: SelectorConfig,
}
