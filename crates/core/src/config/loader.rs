use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

const ENV_PREFIX: &str = "VOLUMEWIKI_";

/// `VOLUMEWIKI_WIKI__RATE_LIMIT_MS=500` overrides `wiki.rate_limit_ms`.
fn with_env(figment: Figment, prefix: &str) -> Figment {
    figment.merge(Env::prefixed(prefix).split("__"))
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    figment
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(with_env(Figment::new().merge(Toml::file(path)), ENV_PREFIX))
}

/// Load defaults with environment variable overrides, for running without a file
pub fn load_config_from_env_or_defaults() -> Result<Config, ConfigError> {
    extract(with_env(
        Figment::from(Serialized::defaults(Config::default())),
        ENV_PREFIX,
    ))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.wiki.api_url, "https://en.wikipedia.org/w/api.php");
        assert_eq!(config.wiki.rate_limit_ms, 200);
        assert!(config.cache.enabled);
        assert_eq!(config.selector.early_exit_volumes, 10);
    }

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[wiki]
rate_limit_ms = 1000
search_limit = 5

[cache]
enabled = false
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.wiki.rate_limit_ms, 1000);
        assert_eq!(config.wiki.search_limit, 5);
        assert_eq!(config.wiki.max_retries, 3);
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_load_config_from_str_bad_type() {
        let toml = r#"
[selector]
early_exit_volumes = "ten"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[cache]
dir = "/tmp/volumewiki"
ttl_hours = 12
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.cache.dir, PathBuf::from("/tmp/volumewiki"));
        assert_eq!(config.cache.ttl_hours, 12);
    }

    #[test]
    fn test_env_overrides_nested_keys() {
        std::env::set_var("VWTEST_ENV_A_WIKI__RATE_LIMIT_MS", "750");
        std::env::set_var("VWTEST_ENV_A_SELECTOR__EARLY_EXIT_VOLUMES", "3");

        let figment = with_env(
            Figment::from(Serialized::defaults(Config::default())),
            "VWTEST_ENV_A_",
        );
        let config = extract(figment).unwrap();

        std::env::remove_var("VWTEST_ENV_A_WIKI__RATE_LIMIT_MS");
        std::env::remove_var("VWTEST_ENV_A_SELECTOR__EARLY_EXIT_VOLUMES");

        assert_eq!(config.wiki.rate_limit_ms, 750);
        assert_eq!(config.selector.early_exit_volumes, 3);
        assert_eq!(config.wiki.max_retries, 3);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[cache]\nttl_hours = 12\n").unwrap();
        std::env::set_var("VWTEST_ENV_B_CACHE__TTL_HOURS", "48");

        let figment = with_env(Figment::new().merge(Toml::file(temp_file.path())), "VWTEST_ENV_B_");
        let config = extract(figment).unwrap();
        std::env::remove_var("VWTEST_ENV_B_CACHE__TTL_HOURS");

        assert_eq!(config.cache.ttl_hours, 48);
    }
}
