//! Full configuration validation.
//!
//! Checks numeric ranges and cross-field constraints, collecting every
//! problem into a single `ConfigError`.

mod helpers;

#[cfg(test)]
mod tests;

use crate::schema::ExhibitConfig;
use exhibit_common::ConfigError;

use helpers::validate_range;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &ExhibitConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push("server.host must not be empty".into());
    }
    validate_range(&mut errors, "server.port", u32::from(config.server.port), 1, 65535);

    validate_range(&mut errors, "relay.send_queue", config.relay.send_queue, 1, 65536);
    validate_range(&mut errors, "roster.debounce_ms", config.roster.debounce_ms, 0, 60_000);

    let heartbeat = &config.heartbeat;
    validate_range(&mut errors, "heartbeat.interval_secs", heartbeat.interval_secs, 0, 3600);
    if heartbeat.enabled() && heartbeat.timeout_secs <= heartbeat.interval_secs {
        errors.push(format!(
            "heartbeat.timeout_secs = {} must exceed heartbeat.interval_secs = {}",
            heartbeat.timeout_secs, heartbeat.interval_secs
        ));
    }

    if config.logging.level.trim().is_empty() {
        errors.push("logging.level must not be empty".into());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
