use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TICK_RATE: u32 = 60;
pub const DEFAULT_INPUT_RATE: u32 = 60;

/// Structured messages sent by clients as JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Move {
        dx: i32,
        dy: i32,
    },
    /// Absolute world point the entity is looking at.
    #[serde(rename = "mouse")]
    Look {
        x: f64,
        y: f64,
    },
}

/// Structured messages sent by the server. Snapshots travel as binary frames instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Init {
        id: EntityId,
        skin: String,
        #[serde(rename = "skinName")]
        skin_name: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientMessage {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ServerMessage {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        let msg = ClientMessage::from_json(r#"{"type":"move","dx":-4,"dy":0}"#).unwrap();
        assert_eq!(msg, ClientMessage::Move { dx: -4, dy: 0 });
    }

    #[test]
    fn test_parse_look() {
        let msg = ClientMessage::from_json(r#"{"type":"mouse","x":12.5,"y":-3}"#).unwrap();
        assert_eq!(msg, ClientMessage::Look { x: 12.5, y: -3.0 });
    }

    #[test]
    fn test_rejects_mistyped_fields() {
        assert!(ClientMessage::from_json(r#"{"type":"move","dx":"left","dy":0}"#).is_err());
        assert!(ClientMessage::from_json(r#"{"type":"move","dx":1.5,"dy":0}"#).is_err());
        assert!(ClientMessage::from_json(r#"{"type":"teleport","x":0,"y":0}"#).is_err());
        assert!(ClientMessage::from_json("not json").is_err());
    }

    #[test]
    fn test_init_wire_shape() {
        let msg = ServerMessage::Init {
            id: EntityId(3),
            skin: "<svg/>".into(),
            skin_name: "watcher.svg".into(),
        };
        let json = msg.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"type":"init","id":3,"skin":"<svg/>","skinName":"watcher.svg"}"#
        );
        assert_eq!(ServerMessage::from_json(&json).unwrap(), msg);
    }

    #[test]
    fn test_client_message_roundtrip() {
        let msg = ClientMessage::Look { x: 1.0, y: 2.0 };
        let json = msg.to_json().unwrap();
        assert!(json.contains(r#""type":"mouse""#));
        assert_eq!(ClientMessage::from_json(&json).unwrap(), msg);
    }
}
