//! Terminal client for Parlor
//!
//! A thin shell over [`parlor_app::Driver`] that provides stdin/stdout I/O
//! and the WebSocket connection. All orchestration logic lives in the generic
//! [`parlor_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod input;
pub mod render;
pub mod terminal;

pub use error::CliError;
pub use parlor_app::{Driver, Runtime, Session, SessionConfig};
pub use terminal::{TerminalDriver, TerminalError};
