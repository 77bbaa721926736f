//! Inbound session events.
//!
//! This module defines [`SessionEvent`], the transport-side inputs of the
//! [`crate::Session`] state machine. The [`crate::Bridge`] produces them from
//! wire packets; tests and simulations may construct them directly.

use crate::ChatEvent;

/// Events processed by the Session state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Backend accepted the connection.
    Connected {
        /// Connection id assigned by the backend.
        local_id: String,
    },

    /// Connection lost or closed.
    Disconnected,

    /// Room traffic: a message, join notice or leave notice.
    Chat(ChatEvent),

    /// Transient failure reported by the transport or backend.
    Error {
        /// Error description.
        message: String,
    },
}
