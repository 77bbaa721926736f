//! Room event log.
//!
//! The [`MessageStream`] is the locally observed, arrival-ordered record of
//! what happened in the current room. It only ever grows until the session
//! moves to another room, at which point it is cleared. Nothing is reordered,
//! deduplicated or persisted.
//!
//! Outgoing messages are never appended here. A sent message shows up only
//! when the backend echoes it back as an inbound `message` event.

use crate::ChatEvent;

/// Append-only log of [`ChatEvent`]s for the active room.
#[derive(Debug, Clone, Default)]
pub struct MessageStream {
    events: Vec<ChatEvent>,
    /// Room the log belongs to. Used for filtering.
    room: Option<String>,
    filter_by_room: bool,
}

impl MessageStream {
    /// Empty stream that accepts every non-blank event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty stream that drops events tagged with another room when
    /// `filter_by_room` is set.
    pub fn with_room_filter(filter_by_room: bool) -> Self {
        Self { filter_by_room, ..Self::default() }
    }

    /// Append an event. Returns `true` if it was kept.
    ///
    /// Blank events are dropped. With room filtering on, events carrying a
    /// room tag other than the active room are dropped too; untagged events
    /// are always kept.
    pub fn append(&mut self, event: ChatEvent) -> bool {
        if event.is_blank() {
            tracing::debug!(kind = ?event.kind, "dropping blank chat event");
            return false;
        }

        if self.filter_by_room
            && let Some(room) = event.room.as_deref()
            && self.room.as_deref() != Some(room)
        {
            tracing::debug!(room, active = ?self.room, "dropping event for another room");
            return false;
        }

        self.events.push(event);
        true
    }

    /// Events in arrival order.
    pub fn snapshot(&self) -> &[ChatEvent] {
        &self.events
    }

    /// Whether `event` was written by the connection `local_id`.
    ///
    /// False when either id is unknown.
    pub fn is_authored_by(event: &ChatEvent, local_id: Option<&str>) -> bool {
        match (event.author_id.as_deref(), local_id) {
            (Some(author), Some(local)) => author == local,
            _ => false,
        }
    }

    /// Discard all events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Discard all events and scope the log to `room`.
    pub fn reset(&mut self, room: Option<String>) {
        self.clear();
        self.room = room;
    }

    /// Room the log is scoped to. `None` outside a room.
    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
