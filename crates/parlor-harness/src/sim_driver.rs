//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`parlor_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! Events come from two places: a script of injected events, and (when
//! attached) a [`SimBackend`] mailbox. Backend deliveries are always drained
//! first, so every scripted intent sees the effects of the previous one's
//! round trip. The driver reports end of input once both are empty.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use parlor_app::{Driver, DriverEvent, Intent, Session};
use parlor_proto::Packet;

use crate::{
    SharedSimBackend,
    invariants::{InvariantRegistry, SessionSnapshot, SystemSnapshot},
    sim_backend,
};

/// Error type for simulation driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// State shared between the driver and the test that owns it.
#[derive(Default)]
struct SharedState {
    pending_events: VecDeque<DriverEvent>,
    outgoing_packets: Vec<Packet>,
    rendered: Vec<Session>,
    connected: bool,
    stop_calls: usize,
    /// Fail the next `send_packet`.
    fail_next_send: bool,
    /// Polls left before the connection is silently lost.
    sever_after: Option<usize>,
}

/// Simulation driver for deterministic testing.
///
/// Cloning shares the underlying state, so a test can keep a handle after
/// moving the driver into a [`parlor_app::Runtime`].
#[derive(Clone)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    backend: Option<SharedSimBackend>,
    /// Backend connection id once connected.
    connection_id: Arc<Mutex<Option<String>>>,
    invariants: Option<Arc<InvariantRegistry>>,
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDriver {
    /// Create a standalone simulation driver. Packets are only captured.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SharedState::default())),
            backend: None,
            connection_id: Arc::new(Mutex::new(None)),
            invariants: None,
        }
    }

    /// Create a driver connected through `backend`.
    pub fn with_backend(backend: SharedSimBackend) -> Self {
        Self { backend: Some(backend), ..Self::new() }
    }

    /// Check invariants on every render. A violation fails the render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(Arc::new(registry));
        self
    }

    fn state(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Backend connection id. `None` before connect or without a backend.
    pub fn connection_id(&self) -> Option<String> {
        self.connection_id.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Queue a driver event.
    pub fn inject_event(&self, event: DriverEvent) {
        self.state().pending_events.push_back(event);
    }

    /// Queue a user intent.
    pub fn inject_intent(&self, intent: Intent) {
        self.inject_event(DriverEvent::Intent(intent));
    }

    /// Queue several user intents.
    pub fn inject_intents(&self, intents: impl IntoIterator<Item = Intent>) {
        let mut state = self.state();
        state.pending_events.extend(intents.into_iter().map(DriverEvent::Intent));
    }

    /// Queue a packet from the backend.
    pub fn inject_packet(&self, packet: Packet) {
        self.inject_event(DriverEvent::Packet(packet));
    }

    /// Make the next `send_packet` fail.
    pub fn fail_next_send(&self) {
        self.state().fail_next_send = true;
    }

    /// Lose the connection after `polls` more events, without reporting
    /// [`DriverEvent::Closed`].
    pub fn sever_after(&self, polls: usize) {
        self.state().sever_after = Some(polls);
    }

    /// Take all captured outgoing packets.
    pub fn take_outgoing(&self) -> Vec<Packet> {
        std::mem::take(&mut self.state().outgoing_packets)
    }

    /// Check if there are pending events to process.
    pub fn has_pending(&self) -> bool {
        !self.state().pending_events.is_empty()
    }

    /// Every session state rendered so far.
    pub fn rendered(&self) -> Vec<Session> {
        self.state().rendered.clone()
    }

    /// Last rendered session state.
    pub fn last_rendered(&self) -> Option<Session> {
        self.state().rendered.last().cloned()
    }

    /// How many times `stop` was called.
    pub fn stop_calls(&self) -> usize {
        self.state().stop_calls
    }

    fn next_backend_packet(&self) -> Option<Packet> {
        let backend = self.backend.as_ref()?;
        let id = self.connection_id()?;
        sim_backend::lock(backend).pop(&id)
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self) -> Result<Option<DriverEvent>, Self::Error> {
        {
            let mut state = self.state();
            match state.sever_after {
                Some(0) => {
                    state.connected = false;
                    state.sever_after = None;
                },
                Some(left) => state.sever_after = Some(left - 1),
                None => {},
            }
        }

        if let Some(packet) = self.next_backend_packet() {
            return Ok(Some(DriverEvent::Packet(packet)));
        }
        Ok(self.state().pending_events.pop_front())
    }

    async fn send_packet(&mut self, packet: Packet) -> Result<(), Self::Error> {
        {
            let mut state = self.state();
            if std::mem::take(&mut state.fail_next_send) {
                return Err(SimDriverError("injected send failure".into()));
            }
            if !state.connected {
                return Err(SimDriverError("send while not connected".into()));
            }
            state.outgoing_packets.push(packet.clone());
        }

        if let (Some(backend), Some(id)) = (&self.backend, self.connection_id()) {
            sim_backend::lock(backend).handle_packet(&id, &packet);
        }
        Ok(())
    }

    async fn connect(&mut self, _url: &str) -> Result<(), Self::Error> {
        if let Some(backend) = &self.backend {
            let id = sim_backend::lock(backend).connect();
            *self.connection_id.lock().unwrap_or_else(PoisonError::into_inner) = Some(id);
        }
        self.state().connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state().connected
    }

    fn render(&mut self, session: &Session) -> Result<(), Self::Error> {
        self.state().rendered.push(session.clone());

        if let Some(registry) = &self.invariants {
            let snapshot = SystemSnapshot::single(SessionSnapshot::from_session(session));
            if let Err(violations) = registry.check_all(&snapshot) {
                let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
                return Err(SimDriverError(messages.join("; ")));
            }
        }
        Ok(())
    }

    fn stop(&mut self) {
        let was_connected = {
            let mut state = self.state();
            state.stop_calls += 1;
            std::mem::take(&mut state.connected)
        };
        if !was_connected {
            return;
        }
        if let (Some(backend), Some(id)) = (&self.backend, self.connection_id()) {
            sim_backend::lock(backend).disconnect(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use parlor_app::SessionConfig;

    use super::*;
    use crate::create_shared_backend;

    #[test]
    fn inject_intent_queues_event() {
        let driver = SimDriver::new();
        driver.inject_intent(Intent::SetDisplayName("Ana".into()));

        assert!(driver.has_pending());
    }

    #[tokio::test]
    async fn backend_packets_come_first() {
        let mut driver = SimDriver::with_backend(create_shared_backend());
        driver.inject_intent(Intent::Quit);
        driver.connect("sim").await.unwrap();

        let first = driver.poll_event().await.unwrap();
        assert!(matches!(first, Some(DriverEvent::Packet(Packet::Connect { .. }))));
        assert_eq!(driver.poll_event().await.unwrap(), Some(DriverEvent::Intent(Intent::Quit)));
        assert_eq!(driver.poll_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn send_requires_connection() {
        let mut driver = SimDriver::new();
        assert!(driver.send_packet(Packet::connect()).await.is_err());

        driver.connect("sim").await.unwrap();
        driver.send_packet(Packet::connect()).await.unwrap();
        assert_eq!(driver.take_outgoing().len(), 1);
    }

    #[tokio::test]
    async fn stop_disconnects_once() {
        let backend = create_shared_backend();
        let mut driver = SimDriver::with_backend(backend.clone());
        driver.connect("sim").await.unwrap();
        let id = driver.connection_id().unwrap();

        driver.stop();
        driver.stop();

        assert_eq!(driver.stop_calls(), 2);
        assert!(!driver.is_connected());
        assert!(!sim_backend::lock(&backend).is_connected(&id));
    }

    #[test]
    fn render_records_session() {
        let mut driver = SimDriver::new().with_invariants(InvariantRegistry::standard());
        let session = Session::new(SessionConfig::default());

        driver.render(&session).unwrap();
        assert_eq!(driver.rendered().len(), 1);
    }
}
