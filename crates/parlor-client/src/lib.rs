//! Client
//!
//! Connection plumbing for the Parlor chat client. The protocol logic is a
//! Sans-IO state machine ([`EngineSession`]): it consumes frame text and time,
//! and returns [`EngineAction`]s for the caller to execute. Chat semantics
//! live one layer up in `parlor-app`; this crate only gets Socket.IO packets
//! in and out.
//!
//! # Components
//!
//! - [`EngineSession`]: Engine.IO handshake, ping/pong, liveness
//! - [`TransportConfig`]: Backend address and channel sizing
//! - [`EngineError`], [`TransportError`]: Failure types
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::ConnectedClient`]: Packet channels over a WebSocket
//! - [`transport::connect`]: Connect to a backend

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod engine;
mod error;

#[cfg(feature = "transport")]
pub mod transport;

pub use config::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_SERVER_URL, SOCKET_IO_PATH, TransportConfig};
pub use engine::{
    DEFAULT_PING_INTERVAL, DEFAULT_PING_TIMEOUT, EngineAction, EngineConfig, EngineSession,
    EngineState,
};
pub use error::{EngineError, TransportError};
pub use parlor_proto::Packet;
