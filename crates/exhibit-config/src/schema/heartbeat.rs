use serde::{Deserialize, Serialize};

/// WebSocket liveness checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartbeatConfig {
    /// Seconds between pings. Zero disables pings and idle eviction.
    pub interval_secs: u32,
    /// Seconds of inbound silence before a connection is dropped.
    pub timeout_secs: u32,
}

impl HeartbeatConfig {
    pub fn enabled(&self) -> bool {
        self.interval_secs > 0
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_secs: 25,
            timeout_secs: 60,
        }
    }
}
