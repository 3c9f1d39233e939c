//! Debounced `personUpdate` publishing.
//!
//! Joins and leaves only mark the roster dirty. One task waits for that,
//! sleeps for the debounce window so a burst of churn collapses into a
//! single broadcast, then sends the full roster to everyone connected.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::protocol::{self, events};
use crate::registry::{Frame, Registry};

/// Spawn the roster publisher. Runs until aborted.
pub fn spawn_roster_task(registry: Registry, debounce: Duration) -> JoinHandle<()> {
    let mut changes = registry.roster_changes();
    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            if !debounce.is_zero() {
                tokio::time::sleep(debounce).await;
            }
            // Everything that changed during the sleep is covered by this publish.
            changes.borrow_and_update();
            publish_roster(&registry).await;
        }
    })
}

/// Send the current roster to every connected participant.
pub async fn publish_roster(registry: &Registry) -> usize {
    let persons = registry.snapshot(None).await;
    let json = match protocol::encode(events::PERSON_UPDATE, &persons) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode roster");
            return 0;
        }
    };
    let delivered = registry.broadcast(Frame::from(json)).await;
    tracing::debug!(
        participants = persons.len(),
        delivered,
        "Published roster"
    );
    delivered
}
