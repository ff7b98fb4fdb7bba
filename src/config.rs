use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_CAPACITY;

/// Placeholder shown instead of secret values.
pub const DEFAULT_MASK: &str = "••••••••";

/// Config file path (~/.config/envedit/config.toml).
pub fn config_path() -> Option<PathBuf> {
    let config_dir = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(std::env::var_os("HOME")?).join(".config"),
    };
    Some(config_dir.join("envedit").join("config.toml"))
}

/// Top-level config structure.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Changes kept per editing session before the oldest is dropped.
    #[serde(default = "default_max_changes")]
    pub max_changes: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_changes: default_max_changes(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Hide values of secret keys unless `--reveal` is given.
    #[serde(default = "default_true")]
    pub mask_secrets: bool,
    #[serde(default = "default_mask")]
    pub mask: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            mask_secrets: true,
            mask: default_mask(),
        }
    }
}

fn default_max_changes() -> usize {
    DEFAULT_CAPACITY
}

fn default_true() -> bool {
    true
}

fn default_mask() -> String {
    DEFAULT_MASK.to_string()
}

/// Load the config file, returning defaults if it doesn't exist.
pub fn load() -> Config {
    match config_path() {
        Some(path) => load_from(&path),
        None => Config::default(),
    }
}

/// Load config from a specific path, returning defaults on missing/invalid files.
pub fn load_from(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), "failed to parse config: {e}");
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}
