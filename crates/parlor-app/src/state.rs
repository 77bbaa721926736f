//! Observable session state types.
//!
//! This module defines the data structures that represent the session's
//! current view of the world: who the user is ([`Identity`]), which room they
//! are in ([`RoomMembership`]), whether the backend is reachable
//! ([`ConnectionState`]) and what happened in the room ([`ChatEvent`]).
//!
//! These structures serve as the "View Model" for the presentation layer.
//! They carry no wire details.

use parlor_proto::ChatPayload;

/// Connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected to the backend.
    Disconnected,
    /// Namespace connect accepted.
    Connected {
        /// Connection id assigned by the backend.
        local_id: String,
    },
}

/// Coarse stage of the session, used to decide which intents are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No display name chosen yet.
    NoIdentity,
    /// Display name set, no room visited yet.
    IdentitySet,
    /// Left a room and not yet in another one.
    RoomSelecting,
    /// Member of a room.
    InRoom,
}

/// Who the local user is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    /// Connection id from the backend. `None` until connected.
    pub local_id: Option<String>,
    /// Chosen display name. `None` until set; never changes afterwards.
    pub display_name: Option<String>,
}

/// Current room, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMembership {
    /// Room name. Never blank.
    pub room_name: String,
    /// Whether the session is still in the room.
    pub joined: bool,
}

/// Category of a [`ChatEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatEventKind {
    /// Someone said something.
    Message,
    /// Someone entered the room.
    JoinNotice,
    /// Someone left the room.
    LeaveNotice,
}

/// One entry of the room's event log.
///
/// Author fields are kept exactly as the backend supplied them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    /// Event category.
    pub kind: ChatEventKind,
    /// Display text.
    pub content: String,
    /// Author display name, when supplied.
    pub author_name: Option<String>,
    /// Author connection id, when supplied.
    pub author_id: Option<String>,
    /// Room tag, when supplied.
    pub room: Option<String>,
}

impl ChatEvent {
    /// Event with only kind and content set.
    pub fn new(kind: ChatEventKind, content: impl Into<String>) -> Self {
        Self { kind, content: content.into(), author_name: None, author_id: None, room: None }
    }

    /// A chat message.
    pub fn message(content: impl Into<String>) -> Self {
        Self::new(ChatEventKind::Message, content)
    }

    /// A join notice.
    pub fn join_notice(content: impl Into<String>) -> Self {
        Self::new(ChatEventKind::JoinNotice, content)
    }

    /// A leave notice.
    pub fn leave_notice(content: impl Into<String>) -> Self {
        Self::new(ChatEventKind::LeaveNotice, content)
    }

    /// Build from a decoded wire payload.
    pub fn from_payload(kind: ChatEventKind, payload: ChatPayload) -> Self {
        Self {
            kind,
            content: payload.content,
            author_name: payload.username,
            author_id: payload.user_id,
            room: payload.room,
        }
    }

    /// Set the author fields.
    #[must_use]
    pub fn with_author(mut self, name: impl Into<String>, id: impl Into<String>) -> Self {
        self.author_name = Some(name.into());
        self.author_id = Some(id.into());
        self
    }

    /// Set the room tag.
    #[must_use]
    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    /// Whether the content is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}
