pub mod persist;
mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;
    expand_paths(&mut config);

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./scenestream.toml",
        "~/.config/scenestream/config.toml",
        "/etc/scenestream/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    tracing::warn!("No config file found, using defaults");
    Ok(Config::default())
}

fn expand_paths(config: &mut Config) {
    let raw = config.server.db_path.to_string_lossy().into_owned();
    config.server.db_path = shellexpand::tilde(&raw).into_owned().into();
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if let Some(base) = &config.server.base_url {
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            anyhow::bail!("Server base_url must start with http:// or https://: {}", base);
        }
    }

    config
        .transcode
        .to_policy()
        .context("Invalid [transcode] section")?;
    config
        .streaming
        .to_options()
        .context("Invalid [streaming] section")?;

    Ok(())
}
