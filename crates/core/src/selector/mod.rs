//! Source page selection.
//!
//! Ranks full-text search results against the query, derives the page
//! titles most likely to hold the volume list, and probes them in order,
//! keeping whichever parses into the most volumes.

mod candidates;
mod scoring;

pub use candidates::candidate_titles;
pub use scoring::{normalize_title, rank_candidates, score_candidate};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bibliography::{
    parse_sections, series_title_from_page, total_volume_count, transclusion_target, Section,
};
use crate::wiki::{WikiError, WikiPage, WikiSource};

/// Page selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Stop probing once a page yields at least this many volumes.
    #[serde(default = "default_early_exit_volumes")]
    pub early_exit_volumes: usize,
}

fn default_early_exit_volumes() -> usize {
    10
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            early_exit_volumes: default_early_exit_volumes(),
        }
    }
}

/// The page chosen for a query, with its transclusions inlined, and its parsed sections.
#[derive(Debug, Clone)]
pub struct SelectedPage {
    pub page: WikiPage,
    pub sections: Vec<Section>,
}

impl SelectedPage {
    pub fn total_volumes(&self) -> usize {
        total_volume_count(&self.sections)
    }
}

/// Picks the page that best describes a series' volumes.
#[derive(Debug, Clone)]
pub struct PageSelector {
    config: SelectorConfig,
    search_limit: u32,
}

impl PageSelector {
    pub fn new(config: SelectorConfig, search_limit: u32) -> Self {
        Self {
            config,
            search_limit,
        }
    }

    /// Search for `query` and probe candidate pages.
    ///
    /// Returns `Ok(None)` when the search finds nothing or no candidate
    /// parses into any section. Fetch errors propagate.
    pub async fn select_page(
        &self,
        source: &dyn WikiSource,
        query: &str,
    ) -> Result<Option<SelectedPage>, WikiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let results = source.search(query, self.search_limit).await?;
        if results.is_empty() {
            debug!("No search results for '{}'", query);
            return Ok(None);
        }

        let mut best: Option<SelectedPage> = None;
        for title in candidate_titles(query, &results) {
            let Some(page) = source.fetch_page(&title).await? else {
                debug!("Candidate '{}' does not exist", title);
                continue;
            };
            let page = inline_transclusions(source, page).await?;

            let main_title = series_title_from_page(&page.title);
            let sections = parse_sections(&page.markup, &main_title);
            let count = total_volume_count(&sections);
            debug!(
                "Candidate '{}' -> '{}': {} sections, {} volumes",
                title,
                page.title,
                sections.len(),
                count
            );
            if sections.is_empty() {
                continue;
            }

            let better = best.as_ref().map_or(true, |b| count > b.total_volumes());
            if better {
                best = Some(SelectedPage { page, sections });
            }
            if count >= self.config.early_exit_volumes {
                break;
            }
        }

        if let Some(selected) = &best {
            info!(
                "Selected '{}' for '{}' ({} volumes)",
                selected.page.title,
                query,
                selected.total_volumes()
            );
        }
        Ok(best)
    }
}

/// Replace `{{:Sub page}}` lines listing chapters or volumes with the sub page's markup.
///
/// Missing sub pages leave their line out. Only one level is expanded.
pub async fn inline_transclusions(
    source: &dyn WikiSource,
    page: WikiPage,
) -> Result<WikiPage, WikiError> {
    if !page.markup.lines().any(|l| transclusion_target(l).is_some()) {
        return Ok(page);
    }

    let mut markup = String::with_capacity(page.markup.len());
    for line in page.markup.lines() {
        match transclusion_target(line) {
            Some(target) => {
                debug!("Inlining '{}' into '{}'", target, page.title);
                if let Some(sub) = source.fetch_page(&target).await? {
                    markup.push_str(&sub.markup);
                    markup.push('\n');
                }
            }
            None => {
                markup.push_str(line);
                markup.push('\n');
            }
        }
    }

    Ok(WikiPage { markup, ..page })
}
