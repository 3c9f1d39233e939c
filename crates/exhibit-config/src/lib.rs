//! Exhibit relay configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then environment variables. The binary applies CLI flags on top and
//! validates the result before binding. Every section uses serde defaults
//! so partial files work.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use exhibit_config::{load_config, config_to_json};
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod env;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    ExhibitConfig, HeartbeatConfig, LoggingConfig, RelayConfig, RosterConfig, ServerConfig,
};

use std::path::Path;

use exhibit_common::ConfigError;

/// Load the file and environment layers.
///
/// With an explicit `path` the file must exist. Without one, the platform
/// default path is used if present and defaults otherwise. Validation is
/// left to the caller so CLI overrides can be applied first.
pub fn load_config(path: Option<&Path>) -> Result<ExhibitConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    env::apply_process_env(&mut config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &ExhibitConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
