//! Line-oriented rendering of the session.
//!
//! The terminal is append-only, so rendering is incremental: [`Transcript`]
//! remembers what it already printed and yields only the new lines for each
//! session state. It writes nothing itself.

use parlor_app::{ChatEvent, ChatEventKind, Session, SessionPhase};

/// Tracks what has been printed so far.
#[derive(Debug, Default)]
pub struct Transcript {
    /// Number of log entries already printed for the current room.
    shown: usize,
    phase: Option<SessionPhase>,
    room: Option<String>,
    status: Option<String>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines to print for the current session state.
    pub fn update(&mut self, session: &Session) -> Vec<String> {
        let mut lines = Vec::new();

        let phase = session.phase();
        let room = session.membership().map(|m| m.room_name.clone());
        if self.phase != Some(phase) || self.room != room {
            // A new room starts with a fresh log
            self.shown = 0;
            lines.push(prompt(session, phase));
            self.phase = Some(phase);
            self.room = room;
        }

        let log = session.snapshot();
        if log.len() < self.shown {
            self.shown = 0;
        }
        for event in &log[self.shown..] {
            lines.push(format_event(session, event));
        }
        self.shown = log.len();

        let status = session.status_message().map(str::to_string);
        if status.is_some() && self.status != status {
            lines.extend(status.as_deref().map(|s| format!("-- {s}")));
        }
        self.status = status;

        lines
    }
}

fn prompt(session: &Session, phase: SessionPhase) -> String {
    let rooms = session.config().rooms_enabled;
    match phase {
        SessionPhase::NoIdentity => "-- set a display name with /name <name>".to_string(),
        SessionPhase::IdentitySet | SessionPhase::RoomSelecting if rooms => {
            let name = session.identity().display_name.as_deref().unwrap_or_default();
            format!("-- hello {name}, /join <room> or /create <room>")
        },
        SessionPhase::IdentitySet | SessionPhase::RoomSelecting => {
            "-- type a message to chat, /quit to exit".to_string()
        },
        SessionPhase::InRoom => {
            let room = session.membership().map(|m| m.room_name.as_str()).unwrap_or_default();
            format!("-- joined {room}, type to chat, /leave to leave")
        },
    }
}

fn format_event(session: &Session, event: &ChatEvent) -> String {
    match event.kind {
        ChatEventKind::Message => {
            let author = if session.author_is_self(event) {
                "You"
            } else {
                event
                    .author_name
                    .as_deref()
                    .or(event.author_id.as_deref())
                    .unwrap_or("anonymous")
            };
            format!("{author}: {}", event.content)
        },
        ChatEventKind::JoinNotice | ChatEventKind::LeaveNotice => format!("* {}", event.content),
    }
}
