//! Application layer for Parlor
//!
//! Pure state machines and a generic runtime for the chat session, enabling
//! deterministic simulation testing with the same code that runs in
//! production.
//!
//! # Components
//!
//! - [`Session`]: Session controller (identity, room, connection, compose)
//! - [`MessageStream`]: Ordered log of room events
//! - [`Bridge`]: Translates session actions to packets and packets to events
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod bridge;
mod config;
mod driver;
mod event;
mod intent;
mod runtime;
mod session;
mod state;
mod stream;

pub use action::{Delivery, SessionAction};
pub use bridge::Bridge;
pub use config::{PreConnectPolicy, SessionConfig};
pub use driver::{Driver, DriverEvent};
pub use event::SessionEvent;
pub use intent::Intent;
pub use runtime::Runtime;
pub use session::Session;
pub use state::{ChatEvent, ChatEventKind, ConnectionState, Identity, RoomMembership, SessionPhase};
pub use stream::MessageStream;
