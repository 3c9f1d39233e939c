//! Environment variable overrides.
//!
//! | Variable | Field |
//! |---|---|
//! | `EXHIBIT_HOST` | `server.host` |
//! | `EXHIBIT_PORT`, then `PORT` | `server.port` |
//! | `EXHIBIT_ROSTER_DEBOUNCE_MS` | `roster.debounce_ms` |
//! | `EXHIBIT_TRUST_CLIENT_IDS` | `relay.trust_client_ids` |

use std::str::FromStr;

use crate::schema::ExhibitConfig;
use exhibit_common::ConfigError;

pub const HOST_VAR: &str = "EXHIBIT_HOST";
pub const PORT_VAR: &str = "EXHIBIT_PORT";
pub const FALLBACK_PORT_VAR: &str = "PORT";
pub const DEBOUNCE_VAR: &str = "EXHIBIT_ROSTER_DEBOUNCE_MS";
pub const TRUST_IDS_VAR: &str = "EXHIBIT_TRUST_CLIENT_IDS";

/// Apply overrides from the process environment.
pub fn apply_process_env(config: &mut ExhibitConfig) -> Result<(), ConfigError> {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply overrides from any key lookup. Empty values are treated as unset.
pub fn apply_overrides<F>(config: &mut ExhibitConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = get(HOST_VAR) {
        config.server.host = host.trim().to_string();
    }

    if let Some(raw) = get(PORT_VAR) {
        config.server.port = parse_var(PORT_VAR, &raw)?;
    } else if let Some(raw) = get(FALLBACK_PORT_VAR) {
        config.server.port = parse_var(FALLBACK_PORT_VAR, &raw)?;
    }

    if let Some(raw) = get(DEBOUNCE_VAR) {
        config.roster.debounce_ms = parse_var(DEBOUNCE_VAR, &raw)?;
    }

    if let Some(raw) = get(TRUST_IDS_VAR) {
        config.relay.trust_client_ids = parse_bool(TRUST_IDS_VAR, &raw)?;
    }

    Ok(())
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ConfigError::ParseError(format!("{key}={raw:?}: {e}")))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::ParseError(format!(
            "{key}={raw:?}: expected true or false"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn apply(vars: &[(&str, &str)]) -> Result<ExhibitConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut config = ExhibitConfig::default();
        apply_overrides(&mut config, |key| map.get(key).cloned())?;
        Ok(config)
    }

    #[test]
    fn no_vars_leaves_defaults() {
        let config = apply(&[]).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn exhibit_port_overrides() {
        let config = apply(&[(PORT_VAR, "9000")]).unwrap();
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn plain_port_is_fallback() {
        let config = apply(&[(FALLBACK_PORT_VAR, "7000")]).unwrap();
        assert_eq!(config.server.port, 7000);

        let config = apply(&[(FALLBACK_PORT_VAR, "7000"), (PORT_VAR, "9000")]).unwrap();
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn invalid_port_names_variable() {
        let err = apply(&[(PORT_VAR, "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(err.to_string().contains(PORT_VAR));

        assert!(apply(&[(PORT_VAR, "70000")]).is_err());
    }

    #[test]
    fn empty_value_is_ignored() {
        let config = apply(&[(PORT_VAR, "  "), (HOST_VAR, "")]).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn host_and_debounce_override() {
        let config = apply(&[(HOST_VAR, " 127.0.0.1 "), (DEBOUNCE_VAR, "0")]).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.roster.debounce_ms, 0);
    }

    #[test]
    fn trust_ids_accepts_common_spellings() {
        assert!(apply(&[(TRUST_IDS_VAR, "true")]).unwrap().relay.trust_client_ids);
        assert!(apply(&[(TRUST_IDS_VAR, "YES")]).unwrap().relay.trust_client_ids);
        assert!(!apply(&[(TRUST_IDS_VAR, "0")]).unwrap().relay.trust_client_ids);
        assert!(apply(&[(TRUST_IDS_VAR, "maybe")]).is_err());
    }
}
