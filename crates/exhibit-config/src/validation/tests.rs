use super::*;

#[test]
fn default_config_validates() {
    assert!(validate(&ExhibitConfig::default()).is_ok());
}

#[test]
fn catches_port_zero() {
    let mut config = ExhibitConfig::default();
    config.server.port = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.port"));
}

#[test]
fn catches_empty_host() {
    let mut config = ExhibitConfig::default();
    config.server.host = "  ".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.host"));
}

#[test]
fn catches_send_queue_out_of_range() {
    let mut config = ExhibitConfig::default();
    config.relay.send_queue = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("relay.send_queue"));

    config.relay.send_queue = 100_000;
    assert!(validate(&config).is_err());
}

#[test]
fn zero_debounce_is_allowed() {
    let mut config = ExhibitConfig::default();
    config.roster.debounce_ms = 0;
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_debounce_too_long() {
    let mut config = ExhibitConfig::default();
    config.roster.debounce_ms = 120_000;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("roster.debounce_ms"));
}

#[test]
fn catches_timeout_not_exceeding_interval() {
    let mut config = ExhibitConfig::default();
    config.heartbeat.interval_secs = 30;
    config.heartbeat.timeout_secs = 30;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("heartbeat.timeout_secs"));
}

#[test]
fn disabled_heartbeat_ignores_timeout() {
    let mut config = ExhibitConfig::default();
    config.heartbeat.interval_secs = 0;
    config.heartbeat.timeout_secs = 0;
    assert!(validate(&config).is_ok());
}

#[test]
fn collects_multiple_errors() {
    let mut config = ExhibitConfig::default();
    config.server.port = 0;
    config.relay.send_queue = 0;
    config.logging.level = String::new();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.port"));
    assert!(err.contains("relay.send_queue"));
    assert!(err.contains("logging.level"));
    assert_eq!(err.matches("; ").count(), 2);
}
