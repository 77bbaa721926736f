//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use parlor_app::SessionPhase;

use super::{Invariant, InvariantResult, SystemSnapshot};

/// A session never has a room before it has a display name.
pub struct IdentityBeforeRoom;

impl Invariant for IdentityBeforeRoom {
    fn name(&self) -> &'static str {
        "identity_before_room"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for session in &state.sessions {
            if let Some(room) = &session.room_name
                && session.display_name.is_none()
            {
                return Err(self.violation(format!(
                    "session {}: room {room:?} without a display name",
                    session.label()
                )));
            }
        }
        Ok(())
    }
}

/// A joined room always has a non-blank name.
pub struct JoinedRoomNamed;

impl Invariant for JoinedRoomNamed {
    fn name(&self) -> &'static str {
        "joined_room_named"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for session in &state.sessions {
            if !session.joined {
                continue;
            }
            let named = session.room_name.as_deref().is_some_and(|r| !r.trim().is_empty());
            if !named {
                return Err(self.violation(format!(
                    "session {}: joined room {:?} has no name",
                    session.label(),
                    session.room_name
                )));
            }
        }
        Ok(())
    }
}

/// The message log is scoped to the current room while in one, and to no
/// room otherwise.
pub struct StreamScopedToRoom;

impl Invariant for StreamScopedToRoom {
    fn name(&self) -> &'static str {
        "stream_scoped_to_room"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for session in &state.sessions {
            let expected = match session.phase {
                SessionPhase::InRoom => session.room_name.as_deref(),
                _ => None,
            };
            if session.stream_room.as_deref() != expected {
                return Err(self.violation(format!(
                    "session {}: {:?} with log scoped to {:?}, expected {expected:?}",
                    session.label(),
                    session.phase,
                    session.stream_room
                )));
            }
        }
        Ok(())
    }
}

/// The event log never contains blank events.
pub struct NoBlankEvents;

impl Invariant for NoBlankEvents {
    fn name(&self) -> &'static str {
        "no_blank_events"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for session in &state.sessions {
            if let Some(index) = session.events.iter().position(parlor_app::ChatEvent::is_blank) {
                return Err(self.violation(format!(
                    "session {}: blank event at index {index}",
                    session.label()
                )));
            }
        }
        Ok(())
    }
}

/// With room filtering on, every room-tagged event belongs to the room the
/// log is scoped to.
pub struct FilteredEventsMatchRoom;

impl Invariant for FilteredEventsMatchRoom {
    fn name(&self) -> &'static str {
        "filtered_events_match_room"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for session in state.sessions.iter().filter(|s| s.filter_by_room) {
            let foreign = session.events.iter().find(|event| {
                event.room.is_some() && event.room.as_deref() != session.stream_room.as_deref()
            });
            if let Some(event) = foreign {
                return Err(self.violation(format!(
                    "session {}: event for {:?} in log scoped to {:?}",
                    session.label(),
                    event.room,
                    session.stream_room
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use parlor_app::ChatEvent;

    use super::*;
    use crate::SessionSnapshot;

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            local_id: Some("sock-1".into()),
            phase: SessionPhase::InRoom,
            display_name: Some("Ana".into()),
            room_name: Some("general".into()),
            joined: true,
            filter_by_room: false,
            stream_room: Some("general".into()),
            events: vec![],
        }
    }

    #[test]
    fn consistent_snapshot_passes() {
        let state = SystemSnapshot::single(snapshot());
        assert!(IdentityBeforeRoom.check(&state).is_ok());
        assert!(JoinedRoomNamed.check(&state).is_ok());
        assert!(StreamScopedToRoom.check(&state).is_ok());
        assert!(NoBlankEvents.check(&state).is_ok());
        assert!(FilteredEventsMatchRoom.check(&state).is_ok());
    }

    #[test]
    fn room_without_identity_is_caught() {
        let state =
            SystemSnapshot::single(SessionSnapshot { display_name: None, ..snapshot() });
        assert!(IdentityBeforeRoom.check(&state).is_err());
    }

    #[test]
    fn log_scoped_to_another_room_is_caught() {
        let state = SystemSnapshot::single(SessionSnapshot {
            stream_room: Some("random".into()),
            ..snapshot()
        });
        let violation = StreamScopedToRoom.check(&state).unwrap_err();
        assert!(violation.message.contains("\"random\""));
    }

    #[test]
    fn log_left_scoped_after_leaving_is_caught() {
        let left = SessionSnapshot {
            phase: SessionPhase::RoomSelecting,
            joined: false,
            ..snapshot()
        };
        let state = SystemSnapshot::single(left.clone());
        assert!(StreamScopedToRoom.check(&state).is_err());

        let state = SystemSnapshot::single(SessionSnapshot { stream_room: None, ..left });
        assert!(StreamScopedToRoom.check(&state).is_ok());
    }

    #[test]
    fn blank_joined_room_is_caught() {
        let state = SystemSnapshot::single(SessionSnapshot {
            room_name: Some(" ".into()),
            ..snapshot()
        });
        assert!(JoinedRoomNamed.check(&state).is_err());
    }

    #[test]
    fn blank_event_is_caught() {
        let state = SystemSnapshot::single(SessionSnapshot {
            events: vec![ChatEvent::message("hi"), ChatEvent::join_notice(" ")],
            ..snapshot()
        });
        let violation = NoBlankEvents.check(&state).unwrap_err();
        assert!(violation.message.contains("index 1"));
    }

    #[test]
    fn foreign_event_only_matters_when_filtering() {
        let events = vec![ChatEvent::message("hi").with_room("random")];
        let unfiltered =
            SystemSnapshot::single(SessionSnapshot { events: events.clone(), ..snapshot() });
        let filtered = SystemSnapshot::single(SessionSnapshot {
            events,
            filter_by_room: true,
            ..snapshot()
        });

        assert!(FilteredEventsMatchRoom.check(&unfiltered).is_ok());
        assert!(FilteredEventsMatchRoom.check(&filtered).is_err());
    }
}
