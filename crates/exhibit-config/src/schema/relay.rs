//! Fan-out and roster publishing settings.

use serde::{Deserialize, Serialize};

/// Per-connection relay behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Outbound frames buffered per connection before new ones are dropped.
    pub send_queue: u32,
    /// Use the `id` field sent by clients instead of the connection's own id.
    pub trust_client_ids: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            send_queue: 256,
            trust_client_ids: false,
        }
    }
}

/// Roster (`personUpdate`) broadcast settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Window in milliseconds over which joins and leaves are coalesced.
    pub debounce_ms: u32,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self { debounce_ms: 1000 }
    }
}
