//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the system at a point in time.
//! Invariants operate on snapshots rather than live state so a check sees
//! one consistent view.

use parlor_app::{ChatEvent, Session, SessionPhase};

/// Snapshot of the entire system state.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-session state snapshots.
    pub sessions: Vec<SessionSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no sessions).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot with a single session.
    pub fn single(session: SessionSnapshot) -> Self {
        Self { sessions: vec![session] }
    }

    /// Create a snapshot from several sessions.
    pub fn from_sessions<'a>(sessions: impl IntoIterator<Item = &'a Session>) -> Self {
        Self { sessions: sessions.into_iter().map(SessionSnapshot::from_session).collect() }
    }
}

/// Snapshot of a single session's observable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Connection id, when connected.
    pub local_id: Option<String>,
    /// Reported phase.
    pub phase: SessionPhase,
    /// Chosen display name.
    pub display_name: Option<String>,
    /// Current or last room name.
    pub room_name: Option<String>,
    /// Whether the session is in `room_name`.
    pub joined: bool,
    /// Room filtering switch.
    pub filter_by_room: bool,
    /// Room the event log is scoped to.
    pub stream_room: Option<String>,
    /// Logged events in order.
    pub events: Vec<ChatEvent>,
}

impl SessionSnapshot {
    /// Capture a session.
    pub fn from_session(session: &Session) -> Self {
        let membership = session.membership();
        Self {
            local_id: session.local_id().map(str::to_owned),
            phase: session.phase(),
            display_name: session.identity().display_name.clone(),
            room_name: membership.map(|m| m.room_name.clone()),
            joined: membership.is_some_and(|m| m.joined),
            filter_by_room: session.config().filter_by_room,
            stream_room: session.stream().room().map(str::to_owned),
            events: session.snapshot().to_vec(),
        }
    }

    /// Label for violation messages.
    pub fn label(&self) -> &str {
        self.local_id.as_deref().or(self.display_name.as_deref()).unwrap_or("<anonymous>")
    }
}
