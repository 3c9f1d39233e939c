//! Config path resolution.

use exhibit_common::ConfigError;
use std::path::PathBuf;

/// Get the platform-specific default config file path.
///
/// On macOS: `~/Library/Application Support/exhibit/relay.toml`
/// On Linux: `~/.config/exhibit/relay.toml`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))?;
    Ok(config_dir.join("exhibit").join("relay.toml"))
}
