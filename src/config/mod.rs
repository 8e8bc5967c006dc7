mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Environment variable overriding `tmdb.api_key`
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

/// Environment variable overriding `tmdb.base_url`
pub const BASE_URL_ENV: &str = "TMDB_API_BASE_URL";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./reelshelf.toml",
        "~/.config/reelshelf/config.toml",
        "/etc/reelshelf/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.tmdb.api_key = key;
        }
    }
    if let Ok(url) = std::env::var(BASE_URL_ENV) {
        if !url.trim().is_empty() {
            config.tmdb.base_url = url;
        }
    }
}

/// Validate configuration
///
/// A missing API key is not rejected here; the API client refuses to start
/// without one, so `validate` can still be run against a partial file.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.search.results_per_page == 0 {
        anyhow::bail!("search.results_per_page cannot be 0");
    }

    if config.search.max_pages_per_query == 0 {
        anyhow::bail!("search.max_pages_per_query cannot be 0");
    }

    let kinds = [
        ("poster", &config.images.poster),
        ("backdrop", &config.images.backdrop),
        ("logo", &config.images.logo),
        ("profile", &config.images.profile),
    ];
    for (kind, sizes) in kinds {
        if !sizes.sizes.contains(&sizes.default) {
            anyhow::bail!(
                "Default {} size '{}' is not in its size catalogue",
                kind,
                sizes.default
            );
        }
    }

    if config.tmdb.api_key.trim().is_empty() {
        tracing::warn!("No TMDB API key configured (set {})", API_KEY_ENV);
    }

    Ok(())
}
