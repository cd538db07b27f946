use super::{types::Config, ConfigError};
use crate::wiki::MAX_TTL_HOURS;

/// Validate configuration
/// Currently validates:
/// - Wiki API URL is http(s)
/// - User-Agent is set
/// - Timeout and search limit are usable
/// - Early exit threshold is not 0
/// - Cache TTL is not 0 and not above [`MAX_TTL_HOURS`] when caching is enabled
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let wiki = &config.wiki;
    if !(wiki.api_url.starts_with("http://") || wiki.api_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "wiki.api_url must be an http(s) URL, got '{}'",
            wiki.api_url
        )));
    }
    if wiki.user_agent.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "wiki.user_agent cannot be empty".to_string(),
        ));
    }
    if wiki.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "wiki.timeout_secs cannot be 0".to_string(),
        ));
    }
    if !(1..=500).contains(&wiki.search_limit) {
        return Err(ConfigError::ValidationError(
            "wiki.search_limit must be between 1 and 500".to_string(),
        ));
    }

    if config.selector.early_exit_volumes == 0 {
        return Err(ConfigError::ValidationError(
            "selector.early_exit_volumes cannot be 0".to_string(),
        ));
    }

    if config.cache.enabled && config.cache.ttl_hours == 0 {
        return Err(ConfigError::ValidationError(
            "cache.ttl_hours cannot be 0 when the cache is enabled".to_string(),
        ));
    }
    if config.cache.enabled && config.cache.ttl_hours > MAX_TTL_HOURS {
        return Err(ConfigError::ValidationError(format!(
            "cache.ttl_hours cannot exceed {}",
            MAX_TTL_HOURS
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_bad_api_url_fails() {
        let mut config = Config::default();
        config.wiki.api_url = "en.wikipedia.org/w/api.php".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_search_limit_bounds() {
        let mut config = Config::default();
        config.wiki.search_limit = 0;
        assert!(validate_config(&config).is_err());
        config.wiki.search_limit = 501;
        assert!(validate_config(&config).is_err());
        config.wiki.search_limit = 50;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_zero_ttl_only_matters_when_enabled() {
        let mut config = Config::default();
        config.cache.ttl_hours = 0;
        assert!(validate_config(&config).is_err());
        config.cache.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_huge_ttl_fails() {
        let mut config = Config::default();
        config.cache.ttl_hours = 3_000_000_000_000;
        assert!(validate_config(&config).is_err());
        config.cache.ttl_hours = MAX_TTL_HOURS;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_early_exit_zero_fails() {
        let mut config = Config::default();
        config.selector.early_exit_volumes = 0;
        assert!(validate_config(&config).is_err());
    }
}
