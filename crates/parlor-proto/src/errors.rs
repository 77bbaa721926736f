//! Protocol error types.

use thiserror::Error;

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding wire packets.
///
/// Decoding errors are never fatal to a session. Callers log and drop the
/// offending packet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Packet text was empty.
    #[error("empty packet")]
    Empty,

    /// Leading Engine.IO type character is not a known packet type.
    #[error("unknown engine packet type {0:?}")]
    UnknownEngineType(char),

    /// Leading Socket.IO type character is not a known packet type.
    #[error("unknown socket packet type {0:?}")]
    UnknownSocketType(char),

    /// Binary event and binary ack packets carry attachments we do not read.
    #[error("binary packets are not supported")]
    BinaryUnsupported,

    /// JSON body could not be parsed or produced.
    #[error("invalid JSON: {0}")]
    Json(String),

    /// Structure of the packet is wrong (missing event name, bad ack id, ...).
    #[error("malformed packet: {0}")]
    Malformed(String),

    /// Event arguments do not match the payload shape for that event.
    #[error("invalid payload for {event:?}: {reason}")]
    InvalidPayload {
        /// Event name.
        event: String,
        /// Deserializer message.
        reason: String,
    },
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
