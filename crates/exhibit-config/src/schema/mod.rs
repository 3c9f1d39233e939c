//! Configuration schema types for the exhibit relay.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod heartbeat;
mod relay;
mod server;
mod system;

pub use heartbeat::*;
pub use relay::*;
pub use server::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Root configuration for the relay process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExhibitConfig {
    pub server: ServerConfig,
    pub relay: RelayConfig,
    pub roster: RosterConfig,
    pub heartbeat: HeartbeatConfig,
    pub logging: LoggingConfig,
}
