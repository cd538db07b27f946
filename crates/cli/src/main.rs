use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use volumewiki_core::{
    load_config, load_config_from_env_or_defaults, validate_config, Config, SeriesLookup,
};

/// Config file picked up from the working directory when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "volumewiki.toml";

/// Look up manga and light novel volume lists on Wikipedia.
#[derive(Debug, Parser)]
#[command(name = "volumewiki", version, about)]
struct Cli {
    /// Series title to look up.
    query: String,

    /// Print every series found on the page instead of only the main one.
    #[arg(long)]
    all: bool,

    /// Configuration file.
    #[arg(long, env = "VOLUMEWIKI_CONFIG")]
    config: Option<PathBuf>,

    /// Bypass the on-disk cache.
    #[arg(long)]
    no_cache: bool,

    /// Print JSON on a single line.
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = resolve_config(cli.config.as_deref())?;
    validate_config(&config).context("Configuration validation failed")?;
    if cli.no_cache {
        config.cache.enabled = false;
    }
    debug!("Wiki API: {}", config.wiki.api_url);

    let lookup = SeriesLookup::from_config(&config).context("Failed to create wiki client")?;

    let output = if cli.all {
        let all = lookup
            .get_all_series_from_page(&cli.query)
            .await
            .with_context(|| format!("Lookup failed for '{}'", cli.query))?;
        info!("Found {} series for '{}'", all.len(), cli.query);
        serde_json::to_value(all)?
    } else {
        let series = lookup
            .get_series(&cli.query)
            .await
            .with_context(|| format!("Lookup failed for '{}'", cli.query))?;
        if series.is_none() {
            info!("No series found for '{}'", cli.query);
        }
        serde_json::to_value(series)?
    };

    let json = if cli.compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    println!("{}", json);

    Ok(())
}

fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        info!("Loading configuration from {:?}", path);
        return load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path));
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        info!("Loading configuration from {:?}", default_path);
        return load_config(default_path)
            .with_context(|| format!("Failed to load config from {:?}", default_path));
    }

    debug!("No config file, using defaults");
    load_config_from_env_or_defaults().context("Failed to load config from environment")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from(["volumewiki", "Naruto", "--all", "--no-cache", "--compact"]);
        assert_eq!(cli.query, "Naruto");
        assert!(cli.all);
        assert!(cli.no_cache);
        assert!(cli.compact);
    }

    #[test]
    fn test_cli_explicit_config() {
        let cli = Cli::parse_from(["volumewiki", "Naruto", "--config", "/etc/volumewiki.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/volumewiki.toml")));
        assert!(!cli.all);
    }

    #[test]
    fn test_cli_requires_query() {
        assert!(Cli::try_parse_from(["volumewiki"]).is_err());
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let result = resolve_config(Some(Path::new("/nonexistent/volumewiki.toml")));
        assert!(result.is_err());
    }
}
