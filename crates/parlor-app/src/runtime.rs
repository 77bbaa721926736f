//! Generic runtime for session orchestration.
//!
//! The Runtime drives the event loop, coordinating between:
//! - [`Session`]: chat state machine
//! - [`Bridge`]: translation to and from wire packets
//! - [`Driver`]: platform-specific I/O
//!
//! The runtime owns the connection for the lifetime of the session. It is
//! opened when [`Runtime::run`] starts and released on every way out of it:
//! normal quit, exhausted input, driver error, or the runtime being dropped
//! without running.

use crate::{Bridge, Driver, DriverEvent, Session, SessionAction, SessionConfig, SessionEvent};

/// Generic runtime that orchestrates Session, Bridge, and Driver.
pub struct Runtime<D: Driver> {
    driver: D,
    session: Session,
    bridge: Bridge,
    url: String,
    stopped: bool,
}

impl<D: Driver> Runtime<D> {
    /// Create a new runtime for the backend at `url`.
    pub fn new(driver: D, config: SessionConfig, url: impl Into<String>) -> Self {
        let bridge = Bridge::new(config.pre_connect);
        let session = Session::new(config);
        Self { driver, session, bridge, url: url.into(), stopped: false }
    }

    /// Run the main event loop until the user quits or input ends.
    ///
    /// This is the core orchestration loop that:
    /// 1. Connects to the backend
    /// 2. Waits for the next driver event (intent, packet, closure)
    /// 3. Feeds it through Session and Bridge
    /// 4. Sends outgoing packets through the driver
    ///
    /// The connection is released before returning, whether the loop ended
    /// normally or with an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        let result = self.run_loop().await;
        self.shutdown();
        result
    }

    async fn run_loop(&mut self) -> Result<(), D::Error> {
        self.driver.render(&self.session)?;
        self.driver.connect(&self.url).await?;
        tracing::info!(url = %self.url, "connecting");

        while let Some(event) = self.driver.poll_event().await? {
            if self.process_event(event).await? {
                break;
            }
        }
        Ok(())
    }

    /// Process one driver event.
    ///
    /// Returns `true` if the application should quit.
    async fn process_event(&mut self, event: DriverEvent) -> Result<bool, D::Error> {
        match event {
            DriverEvent::Intent(intent) => {
                let actions = self.session.apply(intent);
                self.process_actions(actions).await
            },
            DriverEvent::Packet(packet) => {
                let events = self.bridge.handle_packet(packet);
                self.send_outgoing_packets().await;
                self.process_session_events(events).await
            },
            DriverEvent::Closed => {
                let events = self.bridge.handle_closed();
                self.process_session_events(events).await
            },
        }
    }

    /// Process actions returned by the Session.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(
        &mut self,
        initial_actions: Vec<SessionAction>,
    ) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    SessionAction::Render => self.driver.render(&self.session)?,
                    SessionAction::Quit => return Ok(true),
                    SessionAction::Disconnect => self.driver.stop(),
                    SessionAction::Emit { .. } => {
                        let events = self.bridge.process_action(action);
                        for event in events {
                            pending_actions.extend(self.session.handle(event));
                        }
                        self.send_outgoing_packets().await;
                    },
                }
            }
        }
        Ok(false)
    }

    /// Process events from Bridge back to Session.
    async fn process_session_events(
        &mut self,
        events: Vec<SessionEvent>,
    ) -> Result<bool, D::Error> {
        for event in events {
            let actions = self.session.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Send all pending outgoing packets to the backend.
    ///
    /// Sends are fire-and-forget: a packet that cannot be sent is dropped.
    /// A dead connection is reported through [`DriverEvent::Closed`].
    async fn send_outgoing_packets(&mut self) {
        for packet in self.bridge.take_outgoing() {
            if !self.driver.is_connected() {
                tracing::warn!(kind = %packet.type_char(), "not connected, dropping packet");
                continue;
            }
            if let Err(e) = self.driver.send_packet(packet).await {
                tracing::warn!(error = %e, "send failed, dropping packet");
            }
        }
    }

    /// Close the session and release the connection.
    fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        for action in self.session.close() {
            match action {
                SessionAction::Render => {
                    if let Err(e) = self.driver.render(&self.session) {
                        tracing::warn!(error = %e, "failed to render");
                    }
                },
                SessionAction::Disconnect => self.driver.stop(),
                SessionAction::Quit | SessionAction::Emit { .. } => {},
            }
        }
        self.driver.stop();
        self.stopped = true;
        tracing::info!("session closed");
    }

    /// Get a reference to the Session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Get a reference to the Driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }
}

impl<D: Driver> Drop for Runtime<D> {
    fn drop(&mut self) {
        if !self.stopped {
            self.driver.stop();
            self.stopped = true;
        }
    }
}
