//! In-process chat backend.
//!
//! `SimBackend` plays the server side of the wire contract at the packet
//! level, without sockets: it assigns connection ids, tracks which room each
//! connection is in, and broadcasts `message`, `user-join` and `user-leave`
//! events the way a Socket.IO room server does.
//!
//! Deliveries are queued per connection and drained by whoever drives that
//! connection (usually a [`crate::SimDriver`]).
//!
//! # Broadcast rules
//!
//! - `joinRoom`: the connection enters the room (leaving any previous one),
//!   then everyone in the room, joiner included, gets `user-join`.
//! - `leaveRoom`: the connection leaves, then the remaining occupants get
//!   `user-leave`.
//! - `New message` with a room: everyone in that room, sender included, gets
//!   `message` tagged with the room.
//! - `New message` without a room: every connection gets `message` with the
//!   supplied username.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use parlor_proto::{ChatPayload, InboundEvent, NewMessage, OutboundEvent, Packet};

/// Backend shared between several simulated clients.
pub type SharedSimBackend = Arc<Mutex<SimBackend>>;

/// Create a backend ready to be shared between drivers.
pub fn create_shared_backend() -> SharedSimBackend {
    Arc::new(Mutex::new(SimBackend::new()))
}

/// Lock a shared backend, ignoring poisoning.
pub fn lock(backend: &SharedSimBackend) -> MutexGuard<'_, SimBackend> {
    backend.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-connection state.
#[derive(Debug, Default)]
struct Connection {
    room: Option<String>,
    /// Last username seen from this connection.
    username: Option<String>,
    mailbox: VecDeque<Packet>,
}

/// Packet-level simulation of the chat backend.
#[derive(Debug, Default)]
pub struct SimBackend {
    /// Connection id -> state. Ordered so broadcasts are deterministic.
    connections: BTreeMap<String, Connection>,
    next_id: u64,
    /// Every event received, with the sender id.
    received: Vec<(String, OutboundEvent)>,
}

impl SimBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a new connection. Queues the namespace accept for it and
    /// returns its id.
    pub fn connect(&mut self) -> String {
        self.next_id += 1;
        let id = format!("sock-{}", self.next_id);

        let mut connection = Connection::default();
        connection.mailbox.push_back(Packet::connect_accepted(&id));
        self.connections.insert(id.clone(), connection);

        tracing::debug!(%id, "sim backend accepted connection");
        id
    }

    /// Drop a connection. Remaining room occupants get `user-leave`.
    pub fn disconnect(&mut self, id: &str) {
        let Some(room) = self.connections.get(id).map(|c| c.room.clone()) else {
            return;
        };
        let notice = room.as_deref().map(|room| self.notice(id, room, "left"));
        self.connections.remove(id);

        if let (Some(room), Some(notice)) = (room, notice) {
            self.broadcast_room(&room, InboundEvent::UserLeave, notice);
        }
        tracing::debug!(%id, "sim backend dropped connection");
    }

    /// Whether `id` is connected.
    pub fn is_connected(&self, id: &str) -> bool {
        self.connections.contains_key(id)
    }

    /// Ids of connections in `room`.
    pub fn occupants(&self, room: &str) -> Vec<String> {
        self.connections
            .iter()
            .filter(|(_, c)| c.room.as_deref() == Some(room))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Every client event received so far, with the sender id.
    pub fn received(&self) -> &[(String, OutboundEvent)] {
        &self.received
    }

    /// Take the packets queued for `id`.
    pub fn drain(&mut self, id: &str) -> Vec<Packet> {
        self.connections.get_mut(id).map(|c| c.mailbox.drain(..).collect()).unwrap_or_default()
    }

    /// Take the next packet queued for `id`.
    pub fn pop(&mut self, id: &str) -> Option<Packet> {
        self.connections.get_mut(id).and_then(|c| c.mailbox.pop_front())
    }

    /// Handle a packet sent by connection `id`.
    pub fn handle_packet(&mut self, id: &str, packet: &Packet) {
        if !self.connections.contains_key(id) {
            tracing::warn!(%id, "packet from unknown connection");
            return;
        }

        let event = match OutboundEvent::from_packet(packet) {
            Ok(Some(event)) => event,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(%id, error = %e, "sim backend rejected packet");
                return;
            },
        };
        self.received.push((id.to_string(), event.clone()));

        match event {
            OutboundEvent::JoinRoom { room } => self.join(id, room),
            OutboundEvent::LeaveRoom { room } => self.leave(id, &room),
            OutboundEvent::NewMessage(NewMessage::Room { room, content }) => {
                let payload = ChatPayload::new(content)
                    .with_author(self.username(id), Some(id.to_string()))
                    .with_room(room.clone());
                self.broadcast_room(&room, InboundEvent::Message, payload);
            },
            OutboundEvent::NewMessage(NewMessage::Legacy { content, username }) => {
                if let Some(connection) = self.connections.get_mut(id) {
                    connection.username = Some(username.clone());
                }
                let payload =
                    ChatPayload::new(content).with_author(Some(username), Some(id.to_string()));
                self.broadcast_all(InboundEvent::Message, payload);
            },
        }
    }

    fn join(&mut self, id: &str, room: String) {
        let previous = self.connections.get(id).and_then(|c| c.room.clone());
        if previous.as_deref() == Some(room.as_str()) {
            return;
        }
        if let Some(previous) = previous {
            self.leave(id, &previous);
        }
        if let Some(connection) = self.connections.get_mut(id) {
            connection.room = Some(room.clone());
        }
        self.broadcast_room(&room, InboundEvent::UserJoin, self.notice(id, &room, "joined"));
    }

    fn leave(&mut self, id: &str, room: &str) {
        match self.connections.get_mut(id) {
            Some(connection) if connection.room.as_deref() == Some(room) => {
                connection.room = None;
            },
            _ => return,
        }
        self.broadcast_room(room, InboundEvent::UserLeave, self.notice(id, room, "left"));
    }

    fn username(&self, id: &str) -> Option<String> {
        self.connections.get(id).and_then(|c| c.username.clone())
    }

    fn notice(&self, id: &str, room: &str, verb: &str) -> ChatPayload {
        let who = self.username(id).unwrap_or_else(|| id.to_string());
        ChatPayload::new(format!("{who} {verb} {room}"))
            .with_author(self.username(id), Some(id.to_string()))
            .with_room(room)
    }

    fn broadcast_room(
        &mut self,
        room: &str,
        event: fn(ChatPayload) -> InboundEvent,
        payload: ChatPayload,
    ) {
        let Some(packet) = encode(event(payload)) else { return };
        for connection in self.connections.values_mut() {
            if connection.room.as_deref() == Some(room) {
                connection.mailbox.push_back(packet.clone());
            }
        }
    }

    fn broadcast_all(&mut self, event: fn(ChatPayload) -> InboundEvent, payload: ChatPayload) {
        let Some(packet) = encode(event(payload)) else { return };
        for connection in self.connections.values_mut() {
            connection.mailbox.push_back(packet.clone());
        }
    }
}

fn encode(event: InboundEvent) -> Option<Packet> {
    event
        .into_packet()
        .inspect_err(|e| tracing::warn!(error = %e, "sim backend failed to encode event"))
        .ok()
}
