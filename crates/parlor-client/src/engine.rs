//! Engine.IO session state machine.
//!
//! Manages the handshake, server heartbeats and liveness of one Engine.IO
//! connection. Uses the action pattern: methods take frame text and time as
//! input and return actions for the transport to execute. No I/O happens
//! here.
//!
//! # State Machine
//!
//! ```text
//! ┌─────────┐   open (0{...})   ┌──────┐
//! │ Opening │──────────────────>│ Open │
//! └─────────┘   send "40"       └──────┘
//!      │                           │
//!      │ close / timeout           │ close / disconnect / ping timeout
//!      ↓                           ↓
//! ┌────────┐                   ┌────────┐
//! │ Closed │<──────────────────│ Closed │
//! └────────┘                   └────────┘
//! ```
//!
//! Servers drive heartbeats: every `ping_interval` they send `2`, and the
//! client answers `3`. A server that stays silent for longer than
//! `ping_interval + ping_timeout` is considered gone.

use std::{
    ops::Sub,
    time::{Duration, Instant},
};

use parlor_proto::{EnginePacket, Packet};

use crate::EngineError;

/// Ping interval assumed until the server handshake supplies one.
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(25);

/// Ping timeout assumed until the server handshake supplies one.
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(20);

/// Actions returned by the engine session.
///
/// The transport executes these:
/// - `SendText`: write the text as one WebSocket text frame
/// - `Deliver`: hand the Socket.IO packet to the application
/// - `Close`: tear the connection down with the given reason
#[derive(Debug, Clone, PartialEq)]
pub enum EngineAction {
    /// Write this frame text to the socket.
    SendText(String),

    /// Deliver a decoded Socket.IO packet upstream.
    Deliver(Packet),

    /// Close the connection.
    Close {
        /// Reason for closing.
        reason: String,
    },
}

/// Engine session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Socket open, waiting for the server handshake.
    Opening,
    /// Handshake received, Socket.IO connect requested.
    Open,
    /// Connection closed (graceful or error).
    Closed,
}

/// Engine session configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Ping interval used before the handshake arrives.
    pub ping_interval: Duration,
    /// Ping timeout used before the handshake arrives.
    pub ping_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { ping_interval: DEFAULT_PING_INTERVAL, ping_timeout: DEFAULT_PING_TIMEOUT }
    }
}

/// Engine.IO session state machine.
///
/// Generic over `Instant` to support both real time and virtual time for
/// deterministic testing.
#[derive(Debug, Clone)]
pub struct EngineSession<I = Instant>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    state: EngineState,
    last_activity: I,
    ping_interval: Duration,
    ping_timeout: Duration,
    /// Engine session id from the handshake. `None` before open.
    engine_sid: Option<String>,
}

impl<I> EngineSession<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create a new session in [`EngineState::Opening`].
    pub fn new(now: I, config: &EngineConfig) -> Self {
        Self {
            state: EngineState::Opening,
            last_activity: now,
            ping_interval: config.ping_interval,
            ping_timeout: config.ping_timeout,
            engine_sid: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Engine session id. `None` before the handshake.
    pub fn engine_sid(&self) -> Option<&str> {
        self.engine_sid.as_deref()
    }

    /// Longest silence tolerated from the server.
    pub fn liveness_window(&self) -> Duration {
        self.ping_interval + self.ping_timeout
    }

    /// Process one frame of text from the socket.
    ///
    /// # Errors
    ///
    /// - `EngineError::Closed` once the session is closed
    /// - `EngineError::Protocol` if the text does not decode
    /// - `EngineError::UnexpectedPacket` for a message before the handshake
    pub fn handle_text(&mut self, text: &str, now: I) -> Result<Vec<EngineAction>, EngineError> {
        if self.state == EngineState::Closed {
            return Err(EngineError::Closed);
        }

        let packet = EnginePacket::decode(text)?;
        self.last_activity = now;

        match (self.state, packet) {
            (EngineState::Opening, EnginePacket::Open(handshake)) => {
                self.ping_interval = Duration::from_millis(handshake.ping_interval);
                self.ping_timeout = Duration::from_millis(handshake.ping_timeout);
                self.engine_sid = Some(handshake.sid);
                self.state = EngineState::Open;

                Ok(vec![EngineAction::SendText(self.encode_packet(&Packet::connect())?)])
            },

            (_, EnginePacket::Ping(data)) => {
                Ok(vec![EngineAction::SendText(EnginePacket::Pong(data).encode()?)])
            },

            (EngineState::Open, EnginePacket::Message(body)) => {
                let packet = Packet::decode(&body)?;
                if matches!(packet, Packet::Disconnect { .. }) {
                    self.state = EngineState::Closed;
                    return Ok(vec![EngineAction::Deliver(packet), EngineAction::Close {
                        reason: "server disconnected namespace".to_string(),
                    }]);
                }
                Ok(vec![EngineAction::Deliver(packet)])
            },

            (_, EnginePacket::Close) => {
                self.state = EngineState::Closed;
                Ok(vec![EngineAction::Close { reason: "server closed transport".to_string() }])
            },

            (_, EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop) => Ok(vec![]),

            (state, packet) => {
                Err(EngineError::UnexpectedPacket { state, packet: packet.type_char() })
            },
        }
    }

    /// Encode a Socket.IO packet as frame text.
    ///
    /// # Errors
    ///
    /// - `EngineError::Closed` once the session is closed
    /// - `EngineError::Protocol` if the packet cannot be serialized
    pub fn encode_packet(&self, packet: &Packet) -> Result<String, EngineError> {
        if self.state == EngineState::Closed {
            return Err(EngineError::Closed);
        }
        Ok(EnginePacket::Message(packet.encode()?).encode()?)
    }

    /// Elapsed time since last activity, if the liveness window is exceeded.
    /// `None` otherwise.
    pub fn check_timeout(&self, now: I) -> Option<Duration> {
        if self.state == EngineState::Closed {
            return None;
        }
        let elapsed = now - self.last_activity;
        (elapsed > self.liveness_window()).then_some(elapsed)
    }

    /// Periodic maintenance. Closes the session when the server went silent.
    pub fn tick(&mut self, now: I) -> Vec<EngineAction> {
        match self.check_timeout(now) {
            Some(elapsed) => {
                self.state = EngineState::Closed;
                vec![EngineAction::Close { reason: format!("ping timeout after {elapsed:?}") }]
            },
            None => vec![],
        }
    }

    /// Client-initiated shutdown: leave the namespace, then close the
    /// transport. Returns nothing when already closed.
    pub fn close(&mut self) -> Vec<EngineAction> {
        let mut actions = Vec::new();
        match self.state {
            EngineState::Closed => return actions,
            EngineState::Open => {
                if let Ok(text) = self.encode_packet(&Packet::disconnect()) {
                    actions.push(EngineAction::SendText(text));
                }
            },
            EngineState::Opening => {},
        }
        actions.push(EngineAction::SendText(EnginePacket::Close.type_char().to_string()));
        actions.push(EngineAction::Close { reason: "client closed".to_string() });
        self.state = EngineState::Closed;
        actions
    }
}
