use serde::{Deserialize, Serialize};
use std::fmt;

/// Fresh connection identifier: a v4 UUID in its 32-digit simple form.
pub fn new_connection_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Identity of one live connection and the participant bound to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new() -> Self {
        Self(new_connection_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for ParticipantId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_id_is_valid_uuid() {
        let id = new_connection_id();
        assert_eq!(id.len(), 32);
        let parsed = uuid::Uuid::parse_str(&id);
        assert!(parsed.is_ok());
        assert_eq!(parsed.unwrap().get_version_num(), 4);
    }

    #[test]
    fn connection_id_is_unique() {
        let a = new_connection_id();
        let b = new_connection_id();
        assert_ne!(a, b);
    }

    #[test]
    fn participant_id_display() {
        let id = ParticipantId::new();
        assert_eq!(id.to_string(), id.as_str());
    }

    #[test]
    fn participant_id_equality() {
        let id = ParticipantId::new();
        assert_eq!(id, id.clone());
        assert_ne!(id, ParticipantId::new());
        assert!(ParticipantId::from("abc") == *"abc");
    }

    #[test]
    fn participant_id_serializes_as_plain_string() {
        let id = ParticipantId::from("abc123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc123\"");
        let back: ParticipantId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn participant_id_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        let a = ParticipantId::new();
        set.insert(a.clone());
        set.insert(a);
        assert_eq!(set.len(), 1);
    }
}
