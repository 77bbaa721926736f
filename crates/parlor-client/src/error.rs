//! Client error types.

use parlor_proto::ProtocolError;
use thiserror::Error;

use crate::EngineState;

/// Errors from the Engine.IO session state machine.
///
/// None of these end the chat session on their own. The transport logs them
/// and drops the offending frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Frame text could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Packet is not valid in the current state.
    #[error("unexpected {packet:?} packet in state {state:?}")]
    UnexpectedPacket {
        /// State when the packet arrived.
        state: EngineState,
        /// Engine packet type digit.
        packet: char,
    },

    /// Session is closed. No further frames are accepted or produced.
    #[error("engine session closed")]
    Closed,
}

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Backend address cannot be used.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Stream error.
    #[error("stream error: {0}")]
    Stream(String),
}
