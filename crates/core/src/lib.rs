pub mod bibliography;
pub mod config;
pub mod lookup;
pub mod selector;
pub mod testing;
pub mod wiki;

pub use bibliography::{
    MediaType, RelatedSeries, SearchCandidate, Section, Series, SeriesRelationship, Volume,
};
pub use config::{
    load_config, load_config_from_env_or_defaults, load_config_from_str, validate_config, Config,
    ConfigError,
};
pub use lookup::{SeriesLookup, PARSER_CACHE_VERSION};
pub use selector::{PageSelector, SelectedPage, SelectorConfig};
pub use wiki::{
    CacheConfig, CachedWikiSource, DiskCache, MediaWikiClient, MediaWikiConfig, WikiError,
    WikiPage, WikiSource,
};
