//! Relay wire protocol.
//!
//! Every WebSocket text frame carries one `{"event": ..., "data": ...}`
//! envelope. Inbound events are parsed into typed payloads; anything that
//! does not fit is rejected for that frame only.

use exhibit_common::ProtocolError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::participant::{Rotation, Transform, Vec3};

/// Channel names.
pub mod events {
    /// Relay → client, once, right after the upgrade.
    pub const CONNECTED: &str = "connected";
    pub const LOCAL_MODEL_UPDATE: &str = "localModelUpdate";
    pub const LOCAL_MODEL_CHAT_MESSAGE: &str = "localModelChatMessage";
    pub const PERSON_UPDATE: &str = "personUpdate";
    /// Prefix; the full channel is `remoteReceiveUpdate:<id>`.
    pub const REMOTE_RECEIVE_UPDATE: &str = "remoteReceiveUpdate";
    /// Prefix; the full channel is `remoteReceiveChatMessage:<id>`.
    pub const REMOTE_RECEIVE_CHAT_MESSAGE: &str = "remoteReceiveChatMessage";
}

pub fn remote_update_channel(id: &str) -> String {
    format!("{}:{id}", events::REMOTE_RECEIVE_UPDATE)
}

pub fn remote_chat_channel(id: &str) -> String {
    format!("{}:{id}", events::REMOTE_RECEIVE_CHAT_MESSAGE)
}

#[derive(Debug, Deserialize)]
struct InboundEnvelope {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Serialize)]
struct OutboundEnvelope<'a, T: Serialize> {
    event: &'a str,
    data: &'a T,
}

/// `localModelUpdate` payload. Also the body of `remoteReceiveUpdate:<id>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub position: Vec3,
    pub rotation: Rotation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
}

impl ModelUpdate {
    pub fn transform(&self) -> Transform {
        Transform {
            position: self.position,
            rotation: self.rotation,
        }
    }
}

/// `localModelChatMessage` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub message: String,
}

/// Body of `remoteReceiveChatMessage:<id>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatBroadcast {
    pub message: String,
}

/// Body of the `connected` handshake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connected {
    pub id: String,
}

/// Events a client may send.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    ModelUpdate(ModelUpdate),
    ChatMessage(ChatMessage),
}

/// Parse one inbound text frame.
pub fn parse_client_event(text: &str) -> Result<ClientEvent, ProtocolError> {
    let envelope: InboundEnvelope =
        serde_json::from_str(text).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;

    match envelope.event.as_str() {
        events::LOCAL_MODEL_UPDATE => {
            let update = parse_payload(&envelope.event, envelope.data, &["position", "rotation"])?;
            Ok(ClientEvent::ModelUpdate(update))
        }
        events::LOCAL_MODEL_CHAT_MESSAGE => {
            let chat = parse_payload(&envelope.event, envelope.data, &["message"])?;
            Ok(ClientEvent::ChatMessage(chat))
        }
        other => Err(ProtocolError::UnknownEvent(other.to_string())),
    }
}

fn parse_payload<T: DeserializeOwned>(
    event: &str,
    data: Value,
    required: &[&'static str],
) -> Result<T, ProtocolError> {
    let Some(fields) = data.as_object() else {
        return Err(ProtocolError::InvalidPayload {
            event: event.to_string(),
            reason: "payload must be an object".into(),
        });
    };
    if let Some(field) = required
        .iter()
        .find(|f| fields.get(**f).map_or(true, Value::is_null))
    {
        return Err(ProtocolError::MissingField {
            event: event.to_string(),
            field: *field,
        });
    }

    serde_json::from_value(data).map_err(|e| ProtocolError::InvalidPayload {
        event: event.to_string(),
        reason: e.to_string(),
    })
}

/// Serialize an outbound envelope.
pub fn encode<T: Serialize>(event: &str, data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&OutboundEnvelope { event, data })
}
