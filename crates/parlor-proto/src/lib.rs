//! Wire protocol for Parlor
//!
//! Text framing and chat event contract spoken between the chat client and a
//! Socket.IO messaging backend.
//!
//! # Layers
//!
//! ```text
//! WebSocket text frame
//!   └─ EnginePacket       "4..."  (open, ping/pong, message, close)
//!        └─ Packet        "42..." (connect, event, disconnect)
//!             └─ OutboundEvent / InboundEvent ("joinRoom", "message", ...)
//! ```
//!
//! Only the text subset is implemented. Binary attachments are rejected at
//! decode time. Every decoder is total: malformed input produces a
//! [`ProtocolError`], never a panic.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod engine;
pub mod errors;
pub mod event;
pub mod packet;

pub use engine::{EnginePacket, Handshake};
pub use errors::{ProtocolError, Result};
pub use event::{ChatPayload, InboundEvent, NewMessage, OutboundEvent};
pub use packet::{DEFAULT_NAMESPACE, Packet};
