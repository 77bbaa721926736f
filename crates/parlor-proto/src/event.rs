//! Chat events exchanged with the backend.
//!
//! Outbound events are what the client emits (`joinRoom`, `leaveRoom`,
//! `New message`). Inbound events are what the backend broadcasts
//! (`message`, `user-join`, `user-leave`) plus the namespace connect that
//! reveals the client's id.
//!
//! Both directions can be converted to and from [`Packet`] so the same types
//! serve the client and the simulated backend in tests.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    Packet,
    errors::{ProtocolError, Result},
};

/// Wire event names.
pub mod names {
    /// Client asks to join a room. Payload: room name.
    pub const JOIN_ROOM: &str = "joinRoom";
    /// Client asks to leave a room. Payload: room name.
    pub const LEAVE_ROOM: &str = "leaveRoom";
    /// Client sends a chat line.
    pub const NEW_MESSAGE: &str = "New message";
    /// Backend delivers a chat line.
    pub const MESSAGE: &str = "message";
    /// Backend announces an arrival.
    pub const USER_JOIN: &str = "user-join";
    /// Backend announces a departure.
    pub const USER_LEAVE: &str = "user-leave";
}

/// Payload of a `New message` emit.
///
/// The two shapes correspond to the two backend variants: room-scoped
/// backends route by `room`, legacy backends broadcast to everyone and need
/// the author name inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NewMessage {
    /// `{ room, content }`
    Room {
        /// Target room.
        room: String,
        /// Message text.
        content: String,
    },
    /// `{ content, username }`
    Legacy {
        /// Message text.
        content: String,
        /// Author display name.
        username: String,
    },
}

impl NewMessage {
    /// Message text.
    pub fn content(&self) -> &str {
        match self {
            Self::Room { content, .. } | Self::Legacy { content, .. } => content,
        }
    }
}

/// Events the client sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    /// `joinRoom`
    JoinRoom {
        /// Room to join (created on first join).
        room: String,
    },
    /// `leaveRoom`
    LeaveRoom {
        /// Room to leave.
        room: String,
    },
    /// `New message`
    NewMessage(NewMessage),
}

impl OutboundEvent {
    /// Wire event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinRoom { .. } => names::JOIN_ROOM,
            Self::LeaveRoom { .. } => names::LEAVE_ROOM,
            Self::NewMessage(_) => names::NEW_MESSAGE,
        }
    }

    /// Build the event packet.
    pub fn into_packet(self) -> Result<Packet> {
        let name = self.name();
        let arg = match self {
            Self::JoinRoom { room } | Self::LeaveRoom { room } => Value::String(room),
            Self::NewMessage(message) => serde_json::to_value(message)?,
        };
        Ok(Packet::event(name, arg))
    }

    /// Read a client event from a packet, as a backend would.
    ///
    /// Returns `None` for packets that are not client chat events.
    pub fn from_packet(packet: &Packet) -> Result<Option<Self>> {
        let Packet::Event { name, args, .. } = packet else {
            return Ok(None);
        };
        let first = args.first().cloned().unwrap_or(Value::Null);

        let event = match name.as_str() {
            names::JOIN_ROOM => Self::JoinRoom { room: payload(name, first)? },
            names::LEAVE_ROOM => Self::LeaveRoom { room: payload(name, first)? },
            names::NEW_MESSAGE => Self::NewMessage(payload(name, first)?),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

/// Payload shared by `message`, `user-join` and `user-leave`.
///
/// Fields are taken as supplied by the backend. A missing or `null`
/// `content` decodes as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    /// Display text.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    /// Author display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Author connection id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Room the event belongs to, when the backend tags it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

impl ChatPayload {
    /// Payload with only content set.
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into(), ..Self::default() }
    }

    /// Set the author fields.
    #[must_use]
    pub fn with_author(mut self, username: Option<String>, user_id: Option<String>) -> Self {
        self.username = username;
        self.user_id = user_id;
        self
    }

    /// Set the room tag.
    #[must_use]
    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }
}

/// Events the backend sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Namespace connect accepted. `sid` is the client's id.
    Connect {
        /// Connection id assigned by the backend.
        sid: Option<String>,
    },
    /// Backend closed the namespace.
    Disconnect,
    /// Namespace connect refused.
    ConnectError {
        /// Reason given by the backend.
        message: String,
    },
    /// `message`
    Message(ChatPayload),
    /// `user-join`
    UserJoin(ChatPayload),
    /// `user-leave`
    UserLeave(ChatPayload),
    /// Any other event name.
    Other {
        /// Event name.
        name: String,
    },
}

impl InboundEvent {
    /// Interpret a packet received from the backend.
    ///
    /// Acks carry no chat meaning and map to `None`.
    pub fn from_packet(packet: Packet) -> Result<Option<Self>> {
        let event = match packet {
            Packet::Connect { data, .. } => Self::Connect {
                sid: data.as_ref().and_then(|d| d.get("sid")).and_then(Value::as_str).map(str::to_owned),
            },
            Packet::Disconnect { .. } => Self::Disconnect,
            Packet::ConnectError { data, .. } => Self::ConnectError { message: error_message(data) },
            Packet::Event { name, args, .. } => {
                let first = args.into_iter().next().unwrap_or(Value::Null);
                match name.as_str() {
                    names::MESSAGE => Self::Message(chat_payload(&name, first)?),
                    names::USER_JOIN => Self::UserJoin(chat_payload(&name, first)?),
                    names::USER_LEAVE => Self::UserLeave(chat_payload(&name, first)?),
                    _ => Self::Other { name: name.clone() },
                }
            },
            Packet::Ack { .. } => return Ok(None),
        };
        Ok(Some(event))
    }

    /// Build the packet a backend would send for this event.
    pub fn into_packet(self) -> Result<Packet> {
        let packet = match self {
            Self::Connect { sid: Some(sid) } => Packet::connect_accepted(&sid),
            Self::Connect { sid: None } => Packet::connect(),
            Self::Disconnect => Packet::disconnect(),
            Self::ConnectError { message } => Packet::ConnectError {
                namespace: crate::DEFAULT_NAMESPACE.to_owned(),
                data: Some(serde_json::json!({ "message": message })),
            },
            Self::Message(payload) => Packet::event(names::MESSAGE, serde_json::to_value(payload)?),
            Self::UserJoin(payload) => {
                Packet::event(names::USER_JOIN, serde_json::to_value(payload)?)
            },
            Self::UserLeave(payload) => {
                Packet::event(names::USER_LEAVE, serde_json::to_value(payload)?)
            },
            Self::Other { name } => Packet::event(name, Value::Null),
        };
        Ok(packet)
    }
}

fn payload<T: serde::de::DeserializeOwned>(event: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| ProtocolError::InvalidPayload { event: event.to_owned(), reason: e.to_string() })
}

fn chat_payload(event: &str, value: Value) -> Result<ChatPayload> {
    // A missing argument behaves like an empty payload and is dropped later
    // by the blank-content rule.
    if value.is_null() {
        return Ok(ChatPayload::default());
    }
    payload(event, value)
}

fn error_message(data: Option<Value>) -> String {
    match data {
        Some(Value::String(message)) => message,
        Some(Value::Object(map)) => {
            if let Some(Value::String(message)) = map.get("message") {
                return message.clone();
            }
            Value::Object(map).to_string()
        },
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
