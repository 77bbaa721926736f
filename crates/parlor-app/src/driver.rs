//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the session runtime from specific I/O
//! implementations. Each front-end implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::future::Future;

use parlor_proto::Packet;

use crate::{Intent, Session};

/// Something the runtime has to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    /// The user asked for something.
    Intent(Intent),
    /// A packet arrived from the backend.
    Packet(Packet),
    /// The connection ended.
    Closed,
}

/// Abstracts I/O operations for the session runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in the terminal client and in
/// simulation.
///
/// # Implementations
///
/// - **CLI**: stdin lines for intents, a WebSocket for packets
/// - **Simulation**: scripted intents and an in-process backend
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next event.
    ///
    /// Returns `None` once the driver has nothing more to deliver (input
    /// exhausted); the runtime then shuts down.
    fn poll_event(
        &mut self,
    ) -> impl Future<Output = Result<Option<DriverEvent>, Self::Error>> + Send;

    /// Send a packet to the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the send fails. The runtime logs it and drops the
    /// packet; the session carries on.
    fn send_packet(&mut self, packet: Packet)
    -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Open the connection to the backend at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    fn connect(&mut self, url: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Whether the connection is open. The runtime drops outgoing packets
    /// while this is false.
    fn is_connected(&self) -> bool;

    /// Present the session state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, session: &Session) -> Result<(), Self::Error>;

    /// Close the connection and release resources. Must be idempotent.
    fn stop(&mut self);
}
