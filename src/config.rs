//! # Configuration Module
//!
//! This module provides configuration support for licensetag, allowing
//! default placeholder values, the extension list, the exclusion set, and
//! the freshness window to live in a `.licensetag.toml` file instead of
//! being repeated on every invocation.
//!
//! Configuration can be specified via the `--config` flag, the
//! `LICENSETAG_CONFIG` environment variable, or a `.licensetag.toml` in the
//! target folder. Command-line flags always take precedence over the file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::verbose_log;

/// The default config file name.
pub const DEFAULT_CONFIG_FILENAME: &str = ".licensetag.toml";

/// Environment variable for specifying the config file path.
pub const CONFIG_ENV_VAR: &str = "LICENSETAG_CONFIG";

/// Placeholder names accepted in the `[placeholders]` table.
///
/// `filename` and `last_modified` are injected per file at render time and
/// cannot be configured.
const KNOWN_PLACEHOLDERS: [&str; 7] = [
  "author",
  "authoremail",
  "project",
  "projecturl",
  "year",
  "version",
  "creationdate",
];

/// Main configuration struct for licensetag.
///
/// Every field is optional; the command line supplies defaults for whatever
/// the file leaves out.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
  /// Default placeholder values for template rendering.
  #[serde(default)]
  pub placeholders: HashMap<String, String>,

  /// File suffixes to consider (e.g. `[".c", ".py"]`).
  #[serde(default)]
  pub extensions: Option<Vec<String>>,

  /// Directory names excluded from recursion.
  #[serde(default, rename = "exclude-dirs")]
  pub exclude_dirs: Option<Vec<String>>,

  /// Freshness window for the bookkeeping-field updater, in minutes.
  #[serde(default, rename = "max-age-minutes")]
  pub max_age_minutes: Option<u64>,
}

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("Failed to read config file '{path}': {source}")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The config file contains invalid TOML.
  #[error("Failed to parse config file '{path}': {source}")]
  ParseError { path: PathBuf, source: toml::de::Error },

  /// A placeholder key is not one the templates understand.
  #[error("Unknown placeholder '{name}' (known: {known})", known = KNOWN_PLACEHOLDERS.join(", "))]
  UnknownPlaceholder { name: String },
}

impl Config {
  /// Load configuration from a file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read, is not valid TOML, or
  /// names a placeholder the templates do not understand.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    verbose_log!("Loading config from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
      path: path.to_path_buf(),
      source: e,
    })?;

    config.validate()?;

    verbose_log!("Loaded {} placeholder defaults", config.placeholders.len());

    Ok(config)
  }

  fn validate(&self) -> Result<(), ConfigError> {
    for name in self.placeholders.keys() {
      if !KNOWN_PLACEHOLDERS.contains(&name.as_str()) {
        return Err(ConfigError::UnknownPlaceholder { name: name.clone() });
      }
    }
    Ok(())
  }
}

/// Discover the configuration file path.
///
/// The configuration file is discovered in the following order:
/// 1. Path specified via `--config` flag (passed as `explicit_path`)
/// 2. Path specified via the `LICENSETAG_CONFIG` environment variable
/// 3. `.licensetag.toml` in the target folder
pub fn discover_config_path(explicit_path: Option<&Path>, folder: &Path) -> Option<PathBuf> {
  if let Some(path) = explicit_path {
    if path.exists() {
      verbose_log!("Using explicit config path: {}", path.display());
      return Some(path.to_path_buf());
    }
    verbose_log!("Explicit config path does not exist: {}", path.display());
    return None;
  }

  if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
    let path = PathBuf::from(&env_path);
    if path.exists() {
      verbose_log!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
      return Some(path);
    }
    verbose_log!("{} path does not exist: {}", CONFIG_ENV_VAR, env_path);
  }

  let folder_config = folder.join(DEFAULT_CONFIG_FILENAME);
  if folder_config.exists() {
    verbose_log!("Using folder config: {}", folder_config.display());
    return Some(folder_config);
  }

  verbose_log!("No config file found");
  None
}

/// Load configuration from the discovered path, if any.
///
/// # Errors
///
/// Returns an error if a config file was found but could not be loaded.
pub fn load_config(explicit_path: Option<&Path>, folder: &Path, no_config: bool) -> Result<Option<Config>> {
  if no_config {
    verbose_log!("Config file discovery disabled (--no-config)");
    return Ok(None);
  }

  match discover_config_path(explicit_path, folder) {
    Some(path) => {
      let config = Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))?;
      Ok(Some(config))
    }
    None => Ok(None),
  }
}
