//! Series lookup service.
//!
//! Glues page selection, parsing and assembly together, and caches the
//! assembled results. Parsed results are tagged with [`PARSER_CACHE_VERSION`]
//! so they are dropped when extraction logic changes, while raw pages cached
//! by [`CachedWikiSource`] stay valid.

use std::sync::Arc;

use tracing::{debug, info};

use crate::bibliography::{
    assemble_all_series, assemble_series, extract_series_metadata, series_title_from_page,
    PageRef, Series, SeriesMetadata,
};
use crate::config::Config;
use crate::selector::{PageSelector, SelectedPage};
use crate::wiki::{CachedWikiSource, DiskCache, MediaWikiClient, WikiError, WikiSource};

/// Bump whenever parsing, classification or assembly output changes.
pub const PARSER_CACHE_VERSION: &str = "parser-v1";

const SERIES_NAMESPACE: &str = "series";
const ALL_SERIES_NAMESPACE: &str = "all_series";

/// Looks up series bibliographies by free-text query.
pub struct SeriesLookup {
    source: Arc<dyn WikiSource>,
    selector: PageSelector,
    cache: Option<DiskCache>,
}

impl SeriesLookup {
    /// Create a lookup without a parsed-result cache.
    pub fn new(source: Arc<dyn WikiSource>, selector: PageSelector) -> Self {
        Self {
            source,
            selector,
            cache: None,
        }
    }

    /// Cache assembled results in `cache`.
    pub fn with_cache(mut self, cache: DiskCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the MediaWiki-backed lookup described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, WikiError> {
        let client = MediaWikiClient::new(config.wiki.clone())?;
        let selector = PageSelector::new(config.selector.clone(), config.wiki.search_limit);

        match DiskCache::from_config(&config.cache) {
            Some(cache) => {
                debug!("Caching wiki responses in {:?}", cache.dir());
                let source = Arc::new(CachedWikiSource::new(client, cache.clone()));
                Ok(Self::new(source, selector).with_cache(cache))
            }
            None => Ok(Self::new(Arc::new(client), selector)),
        }
    }

    /// Main series for `query`, with other groups on the page as related series.
    ///
    /// `Ok(None)` when no page yields any volumes.
    pub async fn get_series(&self, query: &str) -> Result<Option<Series>, WikiError> {
        if let Some(cache) = &self.cache {
            if let Some(series) = cache
                .get::<Option<Series>>(SERIES_NAMESPACE, query, PARSER_CACHE_VERSION)
                .await
            {
                debug!("Series cache hit: '{}'", query);
                return Ok(series);
            }
        }

        let series = match self.select(query).await? {
            Some((selected, metadata)) => {
                let page = PageRef {
                    title: &selected.page.title,
                    page_id: selected.page.page_id,
                };
                assemble_series(page, selected.sections, &metadata)
            }
            None => None,
        };

        if let Some(series) = &series {
            info!(
                "Found '{}': {} volumes, {} related",
                series.title,
                series.total_volumes,
                series.related_series.as_ref().map_or(0, Vec::len)
            );
        }

        if let Some(cache) = &self.cache {
            cache
                .put_or_warn(SERIES_NAMESPACE, query, PARSER_CACHE_VERSION, &series)
                .await;
        }
        Ok(series)
    }

    /// Every series on the page for `query`: the main one first, then each related one.
    pub async fn get_all_series_from_page(&self, query: &str) -> Result<Vec<Series>, WikiError> {
        if let Some(cache) = &self.cache {
            if let Some(all) = cache
                .get::<Vec<Series>>(ALL_SERIES_NAMESPACE, query, PARSER_CACHE_VERSION)
                .await
            {
                debug!("All-series cache hit: '{}'", query);
                return Ok(all);
            }
        }

        let all = match self.select(query).await? {
            Some((selected, metadata)) => {
                let page = PageRef {
                    title: &selected.page.title,
                    page_id: selected.page.page_id,
                };
                assemble_all_series(page, selected.sections, &metadata)
            }
            None => Vec::new(),
        };

        if let Some(cache) = &self.cache {
            cache
                .put_or_warn(ALL_SERIES_NAMESPACE, query, PARSER_CACHE_VERSION, &all)
                .await;
        }
        Ok(all)
    }

    async fn select(
        &self,
        query: &str,
    ) -> Result<Option<(SelectedPage, SeriesMetadata)>, WikiError> {
        let Some(selected) = self.selector.select_page(self.source.as_ref(), query).await? else {
            return Ok(None);
        };

        let mut metadata = extract_series_metadata(&selected.page.markup);
        if metadata == SeriesMetadata::default() {
            metadata = self.metadata_from_series_page(&selected.page.title).await?;
        }
        Ok(Some((selected, metadata)))
    }

    /// List pages rarely carry the infobox; the series article usually does.
    async fn metadata_from_series_page(
        &self,
        list_title: &str,
    ) -> Result<SeriesMetadata, WikiError> {
        let series_title = series_title_from_page(list_title);
        let candidates = [series_title.clone(), format!("{} (manga)", series_title)];

        for title in candidates {
            if title.eq_ignore_ascii_case(list_title) {
                continue;
            }
            if let Some(page) = self.source.fetch_page(&title).await? {
                let metadata = extract_series_metadata(&page.markup);
                if metadata != SeriesMetadata::default() {
                    debug!("Series metadata from '{}'", page.title);
                    return Ok(metadata);
                }
            }
        }
        Ok(SeriesMetadata::default())
    }
}
