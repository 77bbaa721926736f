//! Simulation harness for Parlor session testing.
//!
//! In-process implementations of the backend and the [`parlor_app::Driver`]
//! trait, so the production [`parlor_app::Runtime`] can be exercised end to
//! end without sockets or a terminal.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the session
//! invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_backend;
pub mod sim_driver;

pub use invariants::{
    FilteredEventsMatchRoom, IdentityBeforeRoom, Invariant, InvariantRegistry, InvariantResult,
    JoinedRoomNamed, NoBlankEvents, SessionSnapshot, StreamScopedToRoom, SystemSnapshot,
    Violation,
};
pub use sim_backend::{SharedSimBackend, SimBackend, create_shared_backend};
pub use sim_driver::{SimDriver, SimDriverError};
