//! Chat session state machine.
//!
//! This module defines the [`Session`] state machine, the single source of
//! truth for what the user can currently do. It is completely decoupled from
//! I/O and wire mechanics.
//!
//! This is a pure state machine: user intents and inbound
//! [`crate::SessionEvent`]s go in, [`crate::SessionAction`] instructions come
//! out for the runtime to execute.
//!
//! # Phases
//!
//! ```text
//! ┌────────────┐ set_display_name ┌─────────────┐   join_room    ┌────────┐
//! │ NoIdentity │─────────────────>│ IdentitySet │───────────────>│ InRoom │
//! └────────────┘                  └─────────────┘                └────────┘
//!                                                   join_room  ↑   │
//!                                 ┌───────────────┐────────────┘   │
//!                                 │ RoomSelecting │<───────────────┘
//!                                 └───────────────┘   leave_room
//! ```
//!
//! Invalid intents (blank input, wrong phase) are silent no-ops: they return
//! no actions and leave state untouched. Every emit is optimistic: local
//! state changes immediately and nothing waits for the backend.

use parlor_proto::{NewMessage, OutboundEvent};

use crate::{
    ChatEvent, ConnectionState, Identity, Intent, MessageStream, RoomMembership, SessionAction,
    SessionConfig, SessionEvent, SessionPhase,
};

/// Session state machine.
///
/// Pure state machine that processes intents and events and produces
/// actions. No I/O dependencies.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    identity: Identity,
    /// Last room entered. `None` before the first join.
    membership: Option<RoomMembership>,
    connection: ConnectionState,
    stream: MessageStream,
    /// Compose buffer.
    draft: String,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
    closed: bool,
}

impl Session {
    /// Create a session with no identity and no connection.
    pub fn new(config: SessionConfig) -> Self {
        let stream = MessageStream::with_room_filter(config.filter_by_room);
        Self {
            config,
            identity: Identity::default(),
            membership: None,
            connection: ConnectionState::Disconnected,
            stream,
            draft: String::new(),
            status_message: None,
            closed: false,
        }
    }

    /// Dispatch a user intent.
    pub fn apply(&mut self, intent: Intent) -> Vec<SessionAction> {
        match intent {
            Intent::SetDisplayName(name) => self.set_display_name(&name),
            Intent::JoinRoom(room) => self.join_room(&room),
            Intent::CreateRoom(room) => self.create_room(&room),
            Intent::LeaveRoom => self.leave_room(),
            Intent::SendMessage(text) => self.send_message(&text),
            Intent::EditDraft(text) => self.set_draft(text),
            Intent::SubmitDraft => self.submit_draft(),
            Intent::Quit => self.quit(),
        }
    }

    /// Process an inbound event and return actions.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<SessionAction> {
        match event {
            SessionEvent::Connected { local_id } => {
                if let ConnectionState::Connected { local_id: current } = &self.connection {
                    tracing::debug!(%current, "already connected, ignoring connect");
                    return vec![];
                }
                tracing::info!(%local_id, "session connected");
                self.identity.local_id = (!local_id.is_empty()).then(|| local_id.clone());
                self.connection = ConnectionState::Connected { local_id };
                self.status_message = None;
                vec![SessionAction::Render]
            },
            SessionEvent::Disconnected => {
                if self.connection == ConnectionState::Disconnected {
                    return vec![];
                }
                tracing::info!("session disconnected");
                self.connection = ConnectionState::Disconnected;
                self.status_message = Some("Disconnected".to_string());
                vec![SessionAction::Render]
            },
            SessionEvent::Chat(event) => {
                if self.stream.append(event) {
                    vec![SessionAction::Render]
                } else {
                    vec![]
                }
            },
            SessionEvent::Error { message } => {
                tracing::warn!(%message, "session error");
                self.status_message = Some(format!("Error: {message}"));
                vec![SessionAction::Render]
            },
        }
    }

    /// Choose the display name. Only valid once, before anything else.
    ///
    /// The name is kept exactly as typed; trimming only decides blankness.
    pub fn set_display_name(&mut self, name: &str) -> Vec<SessionAction> {
        if self.phase() != SessionPhase::NoIdentity {
            tracing::debug!("display name already set");
            return vec![];
        }
        if name.trim().is_empty() {
            tracing::debug!("ignoring blank display name");
            return vec![];
        }

        self.identity.display_name = Some(name.to_string());
        vec![SessionAction::Render]
    }

    /// Join a room, leaving the log of any previous room behind.
    ///
    /// Valid with an identity and no current room. Membership changes
    /// immediately; the backend's own join broadcast fills the log. The room
    /// name is stored and sent exactly as given.
    pub fn join_room(&mut self, room: &str) -> Vec<SessionAction> {
        if !self.config.rooms_enabled {
            tracing::debug!("rooms disabled, ignoring join");
            return vec![];
        }
        if !matches!(self.phase(), SessionPhase::IdentitySet | SessionPhase::RoomSelecting) {
            tracing::debug!(phase = ?self.phase(), "join not valid in this phase");
            return vec![];
        }
        if room.trim().is_empty() {
            tracing::debug!("ignoring blank room name");
            return vec![];
        }

        self.membership = Some(RoomMembership { room_name: room.to_string(), joined: true });
        self.stream.reset(Some(room.to_string()));
        vec![
            SessionAction::emit(OutboundEvent::JoinRoom { room: room.to_string() }),
            SessionAction::Render,
        ]
    }

    /// Create a room. Rooms come into existence on first join, so this is
    /// the same as [`Session::join_room`].
    pub fn create_room(&mut self, room: &str) -> Vec<SessionAction> {
        self.join_room(room)
    }

    /// Leave the current room and discard its log.
    pub fn leave_room(&mut self) -> Vec<SessionAction> {
        if !self.config.rooms_enabled {
            tracing::debug!("rooms disabled, ignoring leave");
            return vec![];
        }
        let Some(membership) = self.membership.as_mut().filter(|m| m.joined) else {
            tracing::debug!("not in a room, ignoring leave");
            return vec![];
        };

        membership.joined = false;
        let room = membership.room_name.clone();
        self.stream.reset(None);
        vec![SessionAction::emit(OutboundEvent::LeaveRoom { room }), SessionAction::Render]
    }

    /// Send a message to the current room and clear the compose buffer.
    ///
    /// The message is not added to the log; it appears when the backend
    /// echoes it.
    pub fn send_message(&mut self, text: &str) -> Vec<SessionAction> {
        if text.trim().is_empty() {
            tracing::debug!("ignoring blank message");
            return vec![];
        }

        let message = if self.config.rooms_enabled {
            match &self.membership {
                Some(RoomMembership { room_name, joined: true }) => {
                    NewMessage::Room { room: room_name.clone(), content: text.to_string() }
                },
                _ => {
                    tracing::debug!("not in a room, ignoring send");
                    return vec![];
                },
            }
        } else {
            match &self.identity.display_name {
                Some(name) => {
                    NewMessage::Legacy { content: text.to_string(), username: name.clone() }
                },
                None => {
                    tracing::debug!("no display name, ignoring send");
                    return vec![];
                },
            }
        };

        self.draft.clear();
        vec![SessionAction::emit(OutboundEvent::NewMessage(message)), SessionAction::Render]
    }

    /// Send the compose buffer.
    pub fn submit_draft(&mut self) -> Vec<SessionAction> {
        let text = self.draft.clone();
        self.send_message(&text)
    }

    /// Replace the compose buffer.
    pub fn set_draft(&mut self, text: impl Into<String>) -> Vec<SessionAction> {
        self.draft = text.into();
        vec![SessionAction::Render]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<SessionAction> {
        vec![SessionAction::Quit]
    }

    /// Tear the session down. Subsequent calls do nothing.
    pub fn close(&mut self) -> Vec<SessionAction> {
        if self.closed {
            return vec![];
        }
        self.closed = true;
        self.connection = ConnectionState::Disconnected;
        vec![SessionAction::Disconnect, SessionAction::Render]
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        match (&self.identity.display_name, &self.membership) {
            (None, _) => SessionPhase::NoIdentity,
            (Some(_), None) => SessionPhase::IdentitySet,
            (Some(_), Some(RoomMembership { joined: true, .. })) => SessionPhase::InRoom,
            (Some(_), Some(_)) => SessionPhase::RoomSelecting,
        }
    }

    /// Local identity.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Whether a display name has been chosen.
    pub fn has_identity(&self) -> bool {
        self.identity.display_name.is_some()
    }

    /// Current or last room. `None` before the first join.
    pub fn membership(&self) -> Option<&RoomMembership> {
        self.membership.as_ref()
    }

    /// Whether the session is in a room.
    pub fn is_joined(&self) -> bool {
        self.membership.as_ref().is_some_and(|m| m.joined)
    }

    /// Connection id. `None` until connected.
    pub fn local_id(&self) -> Option<&str> {
        self.identity.local_id.as_deref()
    }

    /// Current connection state.
    pub fn connection_state(&self) -> &ConnectionState {
        &self.connection
    }

    /// Room events since the last join, in arrival order.
    pub fn snapshot(&self) -> &[ChatEvent] {
        self.stream.snapshot()
    }

    /// The room event log.
    pub fn stream(&self) -> &MessageStream {
        &self.stream
    }

    /// Compose buffer.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Whether `event` was written by this connection.
    pub fn author_is_self(&self, event: &ChatEvent) -> bool {
        MessageStream::is_authored_by(event, self.local_id())
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Behaviour switches.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether [`Session::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
