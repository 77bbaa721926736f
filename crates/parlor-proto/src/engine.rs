//! Engine.IO v4 packets.
//!
//! The outer framing layer. Over WebSocket each text frame carries exactly
//! one engine packet: a single type digit followed by an optional body.
//!
//! | Type | Packet  | Body                         |
//! |------|---------|------------------------------|
//! | `0`  | open    | JSON [`Handshake`]           |
//! | `1`  | close   | none                         |
//! | `2`  | ping    | optional probe text          |
//! | `3`  | pong    | optional probe text          |
//! | `4`  | message | Socket.IO packet text        |
//! | `5`  | upgrade | none                         |
//! | `6`  | noop    | none                         |

use serde::{Deserialize, Serialize};

use crate::errors::{ProtocolError, Result};

/// Handshake body carried by the open packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    /// Engine session id (distinct from the Socket.IO id used as `local_id`).
    pub sid: String,
    /// Transports the server would upgrade to.
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Milliseconds between server pings.
    pub ping_interval: u64,
    /// Milliseconds the server waits for a pong.
    pub ping_timeout: u64,
    /// Largest payload the server accepts, in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

/// One Engine.IO packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    /// Server handshake.
    Open(Handshake),
    /// Transport close request.
    Close,
    /// Liveness probe. Servers ping, clients pong.
    Ping(Option<String>),
    /// Answer to a ping, echoing its data.
    Pong(Option<String>),
    /// Socket.IO packet text.
    Message(String),
    /// Transport upgrade marker.
    Upgrade,
    /// No operation.
    Noop,
}

impl EnginePacket {
    /// Packet type digit.
    pub fn type_char(&self) -> char {
        match self {
            Self::Open(_) => '0',
            Self::Close => '1',
            Self::Ping(_) => '2',
            Self::Pong(_) => '3',
            Self::Message(_) => '4',
            Self::Upgrade => '5',
            Self::Noop => '6',
        }
    }

    /// Encode into frame text.
    pub fn encode(&self) -> Result<String> {
        let mut out = String::new();
        out.push(self.type_char());
        match self {
            Self::Open(handshake) => out.push_str(&serde_json::to_string(handshake)?),
            Self::Ping(Some(data)) | Self::Pong(Some(data)) | Self::Message(data) => {
                out.push_str(data);
            },
            Self::Ping(None) | Self::Pong(None) | Self::Close | Self::Upgrade | Self::Noop => {},
        }
        Ok(out)
    }

    /// Decode frame text.
    pub fn decode(text: &str) -> Result<Self> {
        let mut chars = text.chars();
        let kind = chars.next().ok_or(ProtocolError::Empty)?;
        let body = chars.as_str();

        let packet = match kind {
            '0' => Self::Open(serde_json::from_str(body)?),
            '1' => Self::Close,
            '2' => Self::Ping(non_empty(body)),
            '3' => Self::Pong(non_empty(body)),
            '4' => Self::Message(body.to_owned()),
            '5' => Self::Upgrade,
            '6' => Self::Noop,
            other => return Err(ProtocolError::UnknownEngineType(other)),
        };
        Ok(packet)
    }
}

fn non_empty(body: &str) -> Option<String> {
    (!body.is_empty()).then(|| body.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_open_handshake() {
        let text = r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
        let packet = EnginePacket::decode(text).unwrap();

        let EnginePacket::Open(handshake) = packet else {
            panic!("expected open, got {packet:?}");
        };
        assert_eq!(handshake.sid, "lv_VI97HAXpY6yYWAAAC");
        assert_eq!(handshake.ping_interval, 25_000);
        assert_eq!(handshake.ping_timeout, 20_000);
        assert_eq!(handshake.max_payload, Some(1_000_000));
    }

    #[test]
    fn decode_probe_ping_keeps_data() {
        assert_eq!(EnginePacket::decode("2probe").unwrap(), EnginePacket::Ping(Some("probe".into())));
        assert_eq!(EnginePacket::decode("2").unwrap(), EnginePacket::Ping(None));
    }

    #[test]
    fn message_body_is_opaque() {
        let packet = EnginePacket::decode(r#"42["message",{"content":"hi"}]"#).unwrap();
        assert_eq!(packet, EnginePacket::Message(r#"2["message",{"content":"hi"}]"#.into()));
    }

    #[test]
    fn pong_encodes_echo() {
        insta::assert_snapshot!(EnginePacket::Pong(Some("probe".into())).encode().unwrap(), @"3probe");
        insta::assert_snapshot!(EnginePacket::Pong(None).encode().unwrap(), @"3");
    }

    #[test]
    fn rejects_empty_and_unknown() {
        assert_eq!(EnginePacket::decode(""), Err(ProtocolError::Empty));
        assert_eq!(EnginePacket::decode("9"), Err(ProtocolError::UnknownEngineType('9')));
        assert!(matches!(EnginePacket::decode("0{not json"), Err(ProtocolError::Json(_))));
    }

    #[test]
    fn multibyte_type_char_is_rejected() {
        assert_eq!(EnginePacket::decode("é1"), Err(ProtocolError::UnknownEngineType('é')));
    }
}
