//! Inbound event handling: update the registry, then fan out to peers.

use exhibit_common::{ParticipantId, ProtocolError};

use crate::protocol::{self, ChatBroadcast, ChatMessage, ClientEvent, ModelUpdate};
use crate::registry::{Frame, Registry};

/// What became of one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Forwarded to this many peers.
    Forwarded(usize),
    /// Source no longer registered; nothing forwarded.
    Dropped,
}

/// Shared relay logic, cloned into every connection.
#[derive(Clone)]
pub struct Relay {
    registry: Registry,
    trust_client_ids: bool,
}

impl Relay {
    pub fn new(registry: Registry, trust_client_ids: bool) -> Self {
        Self {
            registry,
            trust_client_ids,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parse and handle one text frame from `sender`.
    pub async fn handle_text(
        &self,
        sender: &ParticipantId,
        text: &str,
    ) -> Result<Outcome, ProtocolError> {
        match protocol::parse_client_event(text)? {
            ClientEvent::ModelUpdate(update) => self.relay_update(sender, update).await,
            ClientEvent::ChatMessage(chat) => self.relay_chat(sender, chat).await,
        }
    }

    /// Apply a transform update and forward it to every other connection
    /// on `remoteReceiveUpdate:<source>`.
    pub async fn relay_update(
        &self,
        sender: &ParticipantId,
        mut update: ModelUpdate,
    ) -> Result<Outcome, ProtocolError> {
        let source = self.source_id(
            sender,
            update.id.as_deref(),
            protocol::events::LOCAL_MODEL_UPDATE,
        )?;

        let known = self
            .registry
            .update_transform(&source, update.transform())
            .await;
        if !known && !self.trust_client_ids {
            tracing::debug!(participant = %source, "Update from unregistered sender dropped");
            return Ok(Outcome::Dropped);
        }

        update.id = Some(source.to_string());
        let channel = protocol::remote_update_channel(source.as_str());
        self.forward(sender, &channel, &update).await
    }

    /// Forward a chat line to every other connection on
    /// `remoteReceiveChatMessage:<source>`. Nothing is stored.
    pub async fn relay_chat(
        &self,
        sender: &ParticipantId,
        chat: ChatMessage,
    ) -> Result<Outcome, ProtocolError> {
        let source = self.source_id(
            sender,
            chat.id.as_deref(),
            protocol::events::LOCAL_MODEL_CHAT_MESSAGE,
        )?;

        if !self.trust_client_ids && !self.registry.contains(&source).await {
            tracing::debug!(participant = %source, "Chat from unregistered sender dropped");
            return Ok(Outcome::Dropped);
        }

        let channel = protocol::remote_chat_channel(source.as_str());
        let body = ChatBroadcast {
            message: chat.message,
        };
        self.forward(sender, &channel, &body).await
    }

    /// The id an event is attributed to. Bound to the connection unless
    /// client ids are trusted.
    fn source_id(
        &self,
        sender: &ParticipantId,
        claimed: Option<&str>,
        event: &str,
    ) -> Result<ParticipantId, ProtocolError> {
        if self.trust_client_ids {
            return claimed
                .map(ParticipantId::from)
                .ok_or_else(|| ProtocolError::MissingField {
                    event: event.to_string(),
                    field: "id",
                });
        }
        if let Some(claimed) = claimed.filter(|c| sender != *c) {
            tracing::debug!(
                participant = %sender,
                claimed,
                "Ignoring client-supplied id"
            );
        }
        Ok(sender.clone())
    }

    async fn forward<T: serde::Serialize>(
        &self,
        sender: &ParticipantId,
        channel: &str,
        data: &T,
    ) -> Result<Outcome, ProtocolError> {
        let json = protocol::encode(channel, data).map_err(|e| ProtocolError::InvalidPayload {
            event: channel.to_string(),
            reason: e.to_string(),
        })?;
        let delivered = self.registry.fan_out(sender, Frame::from(json)).await;
        Ok(Outcome::Forwarded(delivered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::{Rotation, Vec3};
    use serde_json::Value;
    use tokio::sync::mpsc;

    fn update_text(id: Option<&str>, x: f64) -> String {
        let mut data = serde_json::json!({
            "position": {"x": x, "y": 0.9, "z": 0.0},
            "rotation": {"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0},
            "animation": "walk",
        });
        if let Some(id) = id {
            data["id"] = Value::from(id);
        }
        serde_json::json!({"event": "localModelUpdate", "data": data}).to_string()
    }

    fn chat_text(id: &str, message: &str) -> String {
        serde_json::json!({
            "event": "localModelChatMessage",
            "data": {"id": id, "message": message},
        })
        .to_string()
    }

    fn next(rx: &mut mpsc::Receiver<Frame>) -> Value {
        serde_json::from_str(rx.try_recv().unwrap().as_str()).unwrap()
    }

    async fn setup(
        trust: bool,
    ) -> (
        Relay,
        ParticipantId,
        mpsc::Receiver<Frame>,
        ParticipantId,
        mpsc::Receiver<Frame>,
    ) {
        let relay = Relay::new(Registry::new(32), trust);
        let a = ParticipantId::from("a");
        let b = ParticipantId::from("b");
        let (_, rx_a) = relay.registry().join(a.clone()).await.unwrap();
        let (_, rx_b) = relay.registry().join(b.clone()).await.unwrap();
        (relay, a, rx_a, b, rx_b)
    }

    #[tokio::test]
    async fn update_is_stored_and_forwarded_to_others_only() {
        let (relay, a, mut rx_a, _b, mut rx_b) = setup(false).await;

        let outcome = relay.handle_text(&a, &update_text(Some("a"), 3.0)).await.unwrap();
        assert_eq!(outcome, Outcome::Forwarded(1));

        let stored = relay.registry().get(&a).await.unwrap();
        assert_eq!(stored.position, Vec3 { x: 3.0, y: 0.9, z: 0.0 });
        assert_eq!(stored.rotation, Rotation::IDENTITY);

        let frame = next(&mut rx_b);
        assert_eq!(frame["event"], "remoteReceiveUpdate:a");
        assert_eq!(frame["data"]["id"], "a");
        assert_eq!(frame["data"]["position"]["x"], 3.0);
        assert_eq!(frame["data"]["animation"], "walk");
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn forwarded_update_carries_only_known_fields() {
        let (relay, a, _rx_a, _b, mut rx_b) = setup(false).await;
        let text = serde_json::json!({
            "event": "localModelUpdate",
            "data": {
                "position": {"x": 1.0, "y": 0.0, "z": 0.0},
                "rotation": [0.0, 0.0, 0.0, 1.0],
                "emote": "wave",
            },
        })
        .to_string();
        relay.handle_text(&a, &text).await.unwrap();

        let frame = next(&mut rx_b);
        let fields: Vec<&String> = frame["data"].as_object().unwrap().keys().collect();
        assert_eq!(fields, ["id", "position", "rotation"]);
        assert_eq!(frame["data"]["rotation"]["w"], 1.0);
    }

    #[tokio::test]
    async fn spoofed_id_is_rebound_to_sender() {
        let (relay, a, _rx_a, b, mut rx_b) = setup(false).await;
        let b_before = relay.registry().get(&b).await.unwrap();

        relay.handle_text(&a, &update_text(Some("b"), 9.0)).await.unwrap();

        assert_eq!(relay.registry().get(&b).await.unwrap(), b_before);
        assert_eq!(relay.registry().get(&a).await.unwrap().position.x, 9.0);
        let frame = next(&mut rx_b);
        assert_eq!(frame["event"], "remoteReceiveUpdate:a");
        assert_eq!(frame["data"]["id"], "a");
    }

    #[tokio::test]
    async fn update_without_id_uses_connection_id() {
        let (relay, a, _rx_a, _b, mut rx_b) = setup(false).await;
        relay.handle_text(&a, &update_text(None, 1.0)).await.unwrap();
        assert_eq!(next(&mut rx_b)["event"], "remoteReceiveUpdate:a");
    }

    #[tokio::test]
    async fn update_after_leave_is_dropped() {
        let (relay, a, _rx_a, _b, mut rx_b) = setup(false).await;
        relay.registry().leave(&a).await;

        let outcome = relay.handle_text(&a, &update_text(Some("a"), 1.0)).await.unwrap();
        assert_eq!(outcome, Outcome::Dropped);
        assert!(rx_b.try_recv().is_err());
        assert_eq!(relay.registry().count().await, 1);
    }

    #[tokio::test]
    async fn trusted_unknown_id_leaves_registry_but_still_forwards() {
        let (relay, a, mut rx_a, _b, mut rx_b) = setup(true).await;
        let before = relay.registry().snapshot(None).await;

        let outcome = relay
            .handle_text(&a, &update_text(Some("ghost"), 5.0))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Forwarded(1));
        assert_eq!(relay.registry().snapshot(None).await, before);
        assert_eq!(next(&mut rx_b)["event"], "remoteReceiveUpdate:ghost");
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn trusted_mode_requires_id() {
        let (relay, a, _rx_a, _b, mut rx_b) = setup(true).await;
        let err = relay.handle_text(&a, &update_text(None, 1.0)).await.unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField { field: "id", .. }));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn chat_is_forwarded_without_id() {
        let (relay, a, mut rx_a, _b, mut rx_b) = setup(false).await;

        let outcome = relay.handle_text(&a, &chat_text("a", "hello")).await.unwrap();
        assert_eq!(outcome, Outcome::Forwarded(1));

        let frame = next(&mut rx_b);
        assert_eq!(frame["event"], "remoteReceiveChatMessage:a");
        assert_eq!(frame["data"], serde_json::json!({"message": "hello"}));
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn malformed_event_changes_nothing() {
        let (relay, a, _rx_a, _b, mut rx_b) = setup(false).await;
        let before = relay.registry().snapshot(None).await;

        let bad = r#"{"event":"localModelUpdate","data":{"id":"a","position":{"x":1}}}"#;
        assert!(relay.handle_text(&a, bad).await.is_err());
        assert!(relay.handle_text(&a, "{{{").await.is_err());

        assert_eq!(relay.registry().snapshot(None).await, before);
        assert!(rx_b.try_recv().is_err());
    }
}
