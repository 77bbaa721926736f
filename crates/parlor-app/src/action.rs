//! Session side-effects.
//!
//! This module defines the [`SessionAction`] enum, which represents
//! instructions produced by the [`crate::Session`] state machine for the
//! runtime to execute.

use parlor_proto::OutboundEvent;

/// How an emitted event relates to local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Local state already reflects the event. No acknowledgement is awaited
    /// and a lost event is not detected.
    Optimistic,
}

/// Actions produced by the Session state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Render the session.
    Render,

    /// Quit the application.
    Quit,

    /// Release the connection.
    Disconnect,

    /// Send an event to the backend.
    Emit {
        /// Event to send.
        event: OutboundEvent,
        /// Delivery semantics.
        delivery: Delivery,
    },
}

impl SessionAction {
    /// Optimistic emit of `event`.
    pub fn emit(event: OutboundEvent) -> Self {
        Self::Emit { event, delivery: Delivery::Optimistic }
    }
}
