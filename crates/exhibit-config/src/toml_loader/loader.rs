//! Core TOML config loading: read from path or platform default.

use crate::schema::ExhibitConfig;
use exhibit_common::ConfigError;
use std::path::Path;
use tracing::{debug, info};

use super::paths::default_config_path;

/// Load config from a specific TOML file path.
///
/// Missing fields fall back to serde defaults. Values are not validated here.
pub fn load_from_path(path: &Path) -> Result<ExhibitConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config = parse_str(&content)?;
    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Parse a TOML document into a config.
pub fn parse_str(content: &str) -> Result<ExhibitConfig, ConfigError> {
    toml::from_str(content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))
}

/// Load config from the platform-specific default path, or defaults if
/// there is no file there. A relay host commonly runs without one.
pub fn load_default() -> Result<ExhibitConfig, ConfigError> {
    let path = match default_config_path() {
        Ok(path) => path,
        Err(e) => {
            debug!("{e}, using built-in defaults");
            return Ok(ExhibitConfig::default());
        }
    };

    match load_from_path(&path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => {
            debug!("no config at {}, using built-in defaults", path.display());
            Ok(ExhibitConfig::default())
        }
        Err(e) => Err(e),
    }
}
