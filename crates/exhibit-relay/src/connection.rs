//! Per-connection handler: register, greet, then pump frames both ways.

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use exhibit_common::{ParticipantId, ProtocolError};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::protocol::{self, events, Connected};
use crate::relay::{Outcome, Relay};

/// Ping cadence and the silence after which a connection counts as dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Heartbeat {
    /// `None` when pings are disabled.
    pub fn from_config(config: &exhibit_config::HeartbeatConfig) -> Option<Self> {
        config.enabled().then(|| Self {
            interval: Duration::from_secs(u64::from(config.interval_secs)),
            timeout: Duration::from_secs(u64::from(config.timeout_secs)),
        })
    }
}

/// Handle a single WebSocket connection for its whole lifetime.
///
/// Ends when the client goes away, the heartbeat times out, or `shutdown`
/// flips to `true` (or its sender is dropped).
pub async fn handle_connection(
    socket: WebSocket,
    peer: SocketAddr,
    relay: Relay,
    heartbeat: Option<Heartbeat>,
    mut shutdown: watch::Receiver<bool>,
) {
    let registry = relay.registry().clone();

    // 1. Allocate the participant.
    let id = ParticipantId::new();
    let Some((participant, mut rx)) = registry.join(id.clone()).await else {
        tracing::warn!(peer = %peer, participant = %id, "Connection id collision, closing");
        return;
    };
    tracing::info!(
        peer = %peer,
        participant = %id,
        name = %participant.name,
        "Participant joined"
    );

    // 2. Tell the client its id.
    let (mut sink, mut stream) = socket.split();
    let hello = Connected { id: id.to_string() };
    if send_event(&mut sink, events::CONNECTED, &hello).await.is_err() {
        registry.leave(&id).await;
        return;
    }

    // 3. Forwarding loop.
    let mut ping = heartbeat.map(|hb| {
        let mut interval = tokio::time::interval_at(Instant::now() + hb.interval, hb.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });
    let mut last_seen = Instant::now();

    loop {
        tokio::select! {
            // Queued frames (fan-out, roster) → this client's WebSocket
            outbound = rx.recv() => match outbound {
                Some(frame) => {
                    if sink.send(Message::Text(frame)).await.is_err() {
                        break;
                    }
                }
                None => break,
            },

            // This client's WebSocket → relay
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    last_seen = Instant::now();
                    handle_frame(&relay, &id, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                // Pings are answered by the WebSocket layer; any frame proves liveness.
                Some(Ok(_)) => last_seen = Instant::now(),
                Some(Err(e)) => {
                    tracing::debug!(participant = %id, error = %e, "WS error");
                    break;
                }
            },

            _ = stop_requested(&mut shutdown) => {
                tracing::debug!(participant = %id, "Closing for shutdown");
                break;
            }

            _ = next_tick(&mut ping) => {
                if let Some(hb) = heartbeat {
                    if last_seen.elapsed() > hb.timeout {
                        tracing::warn!(
                            participant = %id,
                            timeout_secs = hb.timeout.as_secs(),
                            "Heartbeat timeout"
                        );
                        break;
                    }
                }
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
                tracing::trace!(participant = %id, "Sent ping");
            }
        }
    }

    // 4. Cleanup. The roster task republishes once the participant is gone.
    if registry.leave(&id).await.is_some() {
        tracing::info!(peer = %peer, participant = %id, "Participant left");
    }
    let _ = sink.close().await;
}

async fn handle_frame(relay: &Relay, id: &ParticipantId, text: &str) {
    match relay.handle_text(id, text).await {
        Ok(Outcome::Forwarded(recipients)) => {
            tracing::trace!(participant = %id, recipients, "Relayed event");
        }
        Ok(Outcome::Dropped) => {}
        Err(ProtocolError::UnknownEvent(event)) => {
            tracing::debug!(participant = %id, event = %event, "Ignoring unknown event");
        }
        Err(e) => {
            tracing::warn!(participant = %id, error = %e, "Dropping malformed event");
        }
    }
}

/// Resolves once the stop flag is set or its sender is gone.
pub(crate) async fn stop_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Send one event envelope as a JSON text frame.
async fn send_event<T: Serialize>(
    sink: &mut SplitSink<WebSocket, Message>,
    event: &str,
    data: &T,
) -> Result<(), axum::Error> {
    let json = protocol::encode(event, data).map_err(axum::Error::new)?;
    sink.send(Message::Text(json.into())).await
}
