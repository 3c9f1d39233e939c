use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Reasons a single inbound event is rejected. Never fatal to the connection.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid json: {0}")]
    InvalidJson(String),

    #[error("missing field '{field}' in {event}")]
    MissingField { event: String, field: &'static str },

    #[error("invalid {event} payload: {reason}")]
    InvalidPayload { event: String, reason: String },

    #[error("unknown event: {0}")]
    UnknownEvent(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ExhibitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
