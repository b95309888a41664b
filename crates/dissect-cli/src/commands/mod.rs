//! CLI subcommands.

pub mod batch;
pub mod compile;
pub mod config;
pub mod evaluate;

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use tracing::debug;

use dissect_core::models::config::DissectConfig;

/// Location of the user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dissect")
        .join("config.json")
}

/// Load configuration from an explicit path, the user config file, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<DissectConfig> {
    if let Some(path) = config_path {
        return DissectConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        Ok(DissectConfig::from_file(&default_path)?)
    } else {
        Ok(DissectConfig::default())
    }
}

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}
