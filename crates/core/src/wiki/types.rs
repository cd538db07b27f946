//! Types exchanged with the wiki.

use serde::{Deserialize, Serialize};

/// A fetched wiki page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WikiPage {
    /// Page ID assigned by the wiki.
    pub page_id: u64,
    /// Canonical title (after redirects).
    pub title: String,
    /// Raw wiki markup.
    pub markup: String,
}
