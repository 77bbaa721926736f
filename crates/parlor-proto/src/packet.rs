//! Socket.IO v5 packets.
//!
//! Carried inside an Engine.IO message packet. Layout:
//!
//! ```text
//! <type digit>[/<namespace>,][<ack id>][<json>]
//! ```
//!
//! The default namespace `/` is implicit and never written. Event packets
//! carry a JSON array whose first element is the event name.
//!
//! # Invariants
//!
//! - Namespace Elision: [`Packet::encode`] omits the namespace prefix exactly
//!   when the namespace is [`DEFAULT_NAMESPACE`], and [`Packet::decode`]
//!   restores it.
//! - Event Shape: a decoded [`Packet::Event`] always has a string name.

use serde_json::Value;

use crate::errors::{ProtocolError, Result};

/// The namespace used when a packet carries no explicit prefix.
pub const DEFAULT_NAMESPACE: &str = "/";

/// One Socket.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// Namespace connect. From the client: request. From the server: accept,
    /// with `{"sid": ...}` data.
    Connect {
        /// Target namespace.
        namespace: String,
        /// Handshake data.
        data: Option<Value>,
    },

    /// Namespace disconnect.
    Disconnect {
        /// Namespace being left.
        namespace: String,
    },

    /// Named event with JSON arguments.
    Event {
        /// Namespace the event belongs to.
        namespace: String,
        /// Acknowledgement id requested by the sender.
        id: Option<u64>,
        /// Event name.
        name: String,
        /// Event arguments.
        args: Vec<Value>,
    },

    /// Acknowledgement of an earlier event.
    Ack {
        /// Namespace of the acknowledged event.
        namespace: String,
        /// Id of the acknowledged event.
        id: u64,
        /// Acknowledgement arguments.
        args: Vec<Value>,
    },

    /// Server refused the namespace connect.
    ConnectError {
        /// Namespace that was refused.
        namespace: String,
        /// Error data (usually `{"message": ...}`).
        data: Option<Value>,
    },
}

impl Packet {
    /// Connect request for the default namespace.
    pub fn connect() -> Self {
        Self::Connect { namespace: DEFAULT_NAMESPACE.to_owned(), data: None }
    }

    /// Server accept for the default namespace assigning `sid`.
    pub fn connect_accepted(sid: &str) -> Self {
        Self::Connect {
            namespace: DEFAULT_NAMESPACE.to_owned(),
            data: Some(serde_json::json!({ "sid": sid })),
        }
    }

    /// Disconnect from the default namespace.
    pub fn disconnect() -> Self {
        Self::Disconnect { namespace: DEFAULT_NAMESPACE.to_owned() }
    }

    /// Event on the default namespace with a single argument.
    pub fn event(name: impl Into<String>, arg: Value) -> Self {
        Self::Event {
            namespace: DEFAULT_NAMESPACE.to_owned(),
            id: None,
            name: name.into(),
            args: vec![arg],
        }
    }

    /// Namespace this packet is addressed to.
    pub fn namespace(&self) -> &str {
        match self {
            Self::Connect { namespace, .. }
            | Self::Disconnect { namespace }
            | Self::Event { namespace, .. }
            | Self::Ack { namespace, .. }
            | Self::ConnectError { namespace, .. } => namespace,
        }
    }

    /// Session id carried by a server connect accept. `None` for anything
    /// else.
    pub fn connect_sid(&self) -> Option<&str> {
        match self {
            Self::Connect { data: Some(data), .. } => data.get("sid").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Packet type digit.
    pub fn type_char(&self) -> char {
        match self {
            Self::Connect { .. } => '0',
            Self::Disconnect { .. } => '1',
            Self::Event { .. } => '2',
            Self::Ack { .. } => '3',
            Self::ConnectError { .. } => '4',
        }
    }

    /// Encode into message text (without the Engine.IO `4` prefix).
    pub fn encode(&self) -> Result<String> {
        let mut out = String::new();
        out.push(self.type_char());

        let namespace = self.namespace();
        if namespace != DEFAULT_NAMESPACE {
            out.push_str(namespace);
            out.push(',');
        }

        match self {
            Self::Connect { data, .. } | Self::ConnectError { data, .. } => {
                if let Some(data) = data {
                    out.push_str(&serde_json::to_string(data)?);
                }
            },
            Self::Disconnect { .. } => {},
            Self::Event { id, name, args, .. } => {
                if let Some(id) = id {
                    out.push_str(&id.to_string());
                }
                let mut array = Vec::with_capacity(args.len() + 1);
                array.push(Value::String(name.clone()));
                array.extend(args.iter().cloned());
                out.push_str(&serde_json::to_string(&array)?);
            },
            Self::Ack { id, args, .. } => {
                out.push_str(&id.to_string());
                out.push_str(&serde_json::to_string(args)?);
            },
        }
        Ok(out)
    }

    /// Decode message text (without the Engine.IO `4` prefix).
    pub fn decode(text: &str) -> Result<Self> {
        let mut chars = text.chars();
        let kind = chars.next().ok_or(ProtocolError::Empty)?;
        let rest = chars.as_str();

        if matches!(kind, '5' | '6') {
            return Err(ProtocolError::BinaryUnsupported);
        }
        if !matches!(kind, '0'..='4') {
            return Err(ProtocolError::UnknownSocketType(kind));
        }

        let (namespace, rest) = split_namespace(rest);

        match kind {
            '0' => Ok(Self::Connect { namespace, data: parse_optional(rest)? }),
            '1' => Ok(Self::Disconnect { namespace }),
            '2' => {
                let (id, body) = split_ack_id(rest)?;
                let (name, args) = parse_event_array(body)?;
                Ok(Self::Event { namespace, id, name, args })
            },
            '3' => {
                let (id, body) = split_ack_id(rest)?;
                let id = id.ok_or_else(|| ProtocolError::Malformed("ack without id".into()))?;
                let args = match serde_json::from_str(body)? {
                    Value::Array(args) => args,
                    other => {
                        return Err(ProtocolError::Malformed(format!(
                            "ack body must be an array, got {other}"
                        )));
                    },
                };
                Ok(Self::Ack { namespace, id, args })
            },
            _ => Ok(Self::ConnectError { namespace, data: parse_optional(rest)? }),
        }
    }
}

/// Split an optional `/namespace,` prefix off the packet body.
fn split_namespace(rest: &str) -> (String, &str) {
    if !rest.starts_with('/') {
        return (DEFAULT_NAMESPACE.to_owned(), rest);
    }
    match rest.find(',') {
        Some(end) => (rest[..end].to_owned(), &rest[end + 1..]),
        None => (rest.to_owned(), ""),
    }
}

/// Split leading ack id digits off the packet body.
fn split_ack_id(rest: &str) -> Result<(Option<u64>, &str)> {
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Ok((None, rest));
    }
    let id = rest[..digits]
        .parse::<u64>()
        .map_err(|e| ProtocolError::Malformed(format!("ack id: {e}")))?;
    Ok((Some(id), &rest[digits..]))
}

fn parse_optional(body: &str) -> Result<Option<Value>> {
    if body.is_empty() { Ok(None) } else { Ok(Some(serde_json::from_str(body)?)) }
}

fn parse_event_array(body: &str) -> Result<(String, Vec<Value>)> {
    let Value::Array(mut items) = serde_json::from_str(body)? else {
        return Err(ProtocolError::Malformed("event body must be an array".into()));
    };
    if items.is_empty() {
        return Err(ProtocolError::Malformed("event without name".into()));
    }
    match items.remove(0) {
        Value::String(name) => Ok((name, items)),
        other => Err(ProtocolError::Malformed(format!("event name must be a string, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn connect_request_is_bare_digit() {
        insta::assert_snapshot!(Packet::connect().encode().unwrap(), @"0");
    }

    #[test]
    fn server_accept_exposes_sid() {
        let packet = Packet::decode(r#"0{"sid":"NwZe8u1a2WbyXhIkAAAB"}"#).unwrap();
        assert_eq!(packet.connect_sid(), Some("NwZe8u1a2WbyXhIkAAAB"));
        assert_eq!(packet.namespace(), DEFAULT_NAMESPACE);
    }

    #[test]
    fn event_encoding_puts_name_first() {
        let packet = Packet::event("joinRoom", json!("general"));
        insta::assert_snapshot!(packet.encode().unwrap(), @r#"2["joinRoom","general"]"#);
    }

    #[test]
    fn custom_namespace_and_ack_id() {
        let packet = Packet::decode(r#"2/chat,12["message",{"content":"yo"}]"#).unwrap();
        assert_eq!(packet, Packet::Event {
            namespace: "/chat".into(),
            id: Some(12),
            name: "message".into(),
            args: vec![json!({ "content": "yo" })],
        });
        insta::assert_snapshot!(packet.encode().unwrap(), @r#"2/chat,12["message",{"content":"yo"}]"#);
    }

    #[test]
    fn namespace_without_trailing_comma() {
        let packet = Packet::decode("1/admin").unwrap();
        assert_eq!(packet, Packet::Disconnect { namespace: "/admin".into() });
    }

    #[test]
    fn ack_requires_id() {
        assert!(matches!(Packet::decode("3[]"), Err(ProtocolError::Malformed(_))));
        assert_eq!(Packet::decode("37[1]").unwrap(), Packet::Ack {
            namespace: DEFAULT_NAMESPACE.into(),
            id: 7,
            args: vec![json!(1)],
        });
    }

    #[test]
    fn connect_error_keeps_data() {
        let packet = Packet::decode(r#"4{"message":"Not authorized"}"#).unwrap();
        assert_eq!(packet, Packet::ConnectError {
            namespace: DEFAULT_NAMESPACE.into(),
            data: Some(json!({ "message": "Not authorized" })),
        });
    }

    #[test]
    fn malformed_events_are_errors() {
        assert!(matches!(Packet::decode("2"), Err(ProtocolError::Json(_))));
        assert!(matches!(Packet::decode("2[]"), Err(ProtocolError::Malformed(_))));
        assert!(matches!(Packet::decode("2[42]"), Err(ProtocolError::Malformed(_))));
        assert!(matches!(Packet::decode(r#"2{"a":1}"#), Err(ProtocolError::Malformed(_))));
        assert!(matches!(
            Packet::decode("299999999999999999999999[\"x\"]"),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn binary_and_unknown_types_rejected() {
        assert_eq!(Packet::decode(r#"51-["upload",{"_placeholder":true,"num":0}]"#), Err(ProtocolError::BinaryUnsupported));
        assert_eq!(Packet::decode("7"), Err(ProtocolError::UnknownSocketType('7')));
        assert_eq!(Packet::decode(""), Err(ProtocolError::Empty));
    }
}
