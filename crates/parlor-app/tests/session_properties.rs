//! Property-based tests for the Session state machine and Message Stream.
//!
//! Tests verify that the session's guarantees hold for arbitrary input, not
//! just the handful of strings a scenario test would pick.

use parlor_app::{
    ChatEvent, ChatEventKind, Intent, MessageStream, Session, SessionAction, SessionConfig,
    SessionEvent, SessionPhase,
};
use parlor_harness::{InvariantRegistry, SessionSnapshot, SystemSnapshot};
use proptest::prelude::*;

fn blank_strategy() -> impl Strategy<Value = String> {
    "[ \t\n\r]{0,6}"
}

fn non_blank_strategy() -> impl Strategy<Value = String> {
    "[ ]{0,2}[a-zA-Z0-9]{1,12}[ ]{0,2}"
}

fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![non_blank_strategy(), blank_strategy()]
}

fn kind_strategy() -> impl Strategy<Value = ChatEventKind> {
    prop_oneof![
        Just(ChatEventKind::Message),
        Just(ChatEventKind::JoinNotice),
        Just(ChatEventKind::LeaveNotice),
    ]
}

fn chat_event_strategy() -> impl Strategy<Value = ChatEvent> {
    (kind_strategy(), text_strategy())
        .prop_map(|(kind, content)| ChatEvent::new(kind, content))
}

fn session_event_strategy() -> impl Strategy<Value = SessionEvent> {
    prop_oneof![
        4 => chat_event_strategy().prop_map(SessionEvent::Chat),
        1 => "sock-[0-9]".prop_map(|local_id| SessionEvent::Connected { local_id }),
        1 => Just(SessionEvent::Disconnected),
        1 => "[a-z ]{0,10}".prop_map(|message| SessionEvent::Error { message }),
    ]
}

fn intent_strategy() -> impl Strategy<Value = Intent> {
    prop_oneof![
        text_strategy().prop_map(Intent::SetDisplayName),
        text_strategy().prop_map(Intent::JoinRoom),
        text_strategy().prop_map(Intent::CreateRoom),
        Just(Intent::LeaveRoom),
        text_strategy().prop_map(Intent::SendMessage),
        text_strategy().prop_map(Intent::EditDraft),
        Just(Intent::SubmitDraft),
    ]
}

#[derive(Debug, Clone)]
enum Step {
    Intent(Intent),
    Event(SessionEvent),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        intent_strategy().prop_map(Step::Intent),
        session_event_strategy().prop_map(Step::Event),
    ]
}

fn named(name: &str) -> Session {
    let mut session = Session::new(SessionConfig::default());
    let _ = session.set_display_name(name);
    session
}

proptest! {
    #[test]
    fn prop_non_blank_name_sets_identity(name in non_blank_strategy()) {
        let mut session = Session::new(SessionConfig::default());
        let _ = session.set_display_name(&name);

        prop_assert_eq!(session.phase(), SessionPhase::IdentitySet);
        prop_assert_eq!(session.identity().display_name.as_deref(), Some(name.as_str()));
    }

    #[test]
    fn prop_blank_name_changes_nothing(name in blank_strategy()) {
        let mut session = Session::new(SessionConfig::default());
        let actions = session.set_display_name(&name);

        prop_assert!(actions.is_empty());
        prop_assert_eq!(session.phase(), SessionPhase::NoIdentity);
        prop_assert!(!session.has_identity());
    }

    #[test]
    fn prop_join_from_identity_set(room in non_blank_strategy()) {
        let mut session = named("Ana");
        let _ = session.join_room(&room);

        let membership = session.membership().cloned();
        prop_assert!(membership.as_ref().is_some_and(|m| m.joined));
        prop_assert_eq!(membership.map(|m| m.room_name), Some(room));
    }

    #[test]
    fn prop_send_outside_room_is_noop(
        setup in prop::collection::vec(intent_strategy(), 0..10),
        text in text_strategy(),
    ) {
        let mut session = Session::new(SessionConfig::default());
        for intent in setup {
            let _ = session.apply(intent);
        }
        prop_assume!(!session.is_joined());

        let draft = session.draft().to_string();
        let log = session.snapshot().to_vec();

        prop_assert!(session.send_message(&text).is_empty());
        prop_assert_eq!(session.draft(), draft);
        prop_assert_eq!(session.snapshot(), log.as_slice());
    }

    #[test]
    fn prop_send_never_appends(text in non_blank_strategy()) {
        let mut session = named("Ana");
        let _ = session.join_room("general");
        let actions = session.send_message(&text);

        let first_is_emit = matches!(actions.first(), Some(SessionAction::Emit { .. }));
        prop_assert!(first_is_emit);
        prop_assert!(session.snapshot().is_empty());
    }

    #[test]
    fn prop_blank_events_never_grow_log(
        events in prop::collection::vec(chat_event_strategy(), 0..20),
        blank in blank_strategy(),
        kind in kind_strategy(),
    ) {
        let mut stream = MessageStream::new();
        for event in events {
            let _ = stream.append(event);
        }
        let before = stream.len();

        prop_assert!(!stream.append(ChatEvent::new(kind, blank)));
        prop_assert_eq!(stream.len(), before);
    }

    #[test]
    fn prop_log_preserves_arrival_order(
        first in non_blank_strategy(),
        second in non_blank_strategy(),
        kinds in (kind_strategy(), kind_strategy()),
    ) {
        let mut stream = MessageStream::new();
        let _ = stream.append(ChatEvent::new(kinds.0, first.clone()));
        let _ = stream.append(ChatEvent::new(kinds.1, second.clone()));

        let contents: Vec<_> = stream.snapshot().iter().map(|e| e.content.clone()).collect();
        prop_assert_eq!(contents, vec![first, second]);
    }

    #[test]
    fn prop_author_is_self_iff_ids_match(
        local in "sock-[0-9]{1,3}",
        author in prop::option::of("sock-[0-9]{1,3}"),
    ) {
        let mut session = Session::new(SessionConfig::default());
        let _ = session.handle(SessionEvent::Connected { local_id: local.clone() });

        let mut event = ChatEvent::message("hi");
        event.author_id = author.clone();

        prop_assert_eq!(session.author_is_self(&event), author.as_deref() == Some(local.as_str()));
    }

    #[test]
    fn prop_invariants_hold(steps in prop::collection::vec(step_strategy(), 0..60)) {
        let registry = InvariantRegistry::standard();
        let mut session = Session::new(SessionConfig::default().with_room_filter(true));

        for step in steps {
            let _ = match step {
                Step::Intent(intent) => session.apply(intent),
                Step::Event(event) => session.handle(event),
            };
            let snapshot = SystemSnapshot::single(SessionSnapshot::from_session(&session));
            prop_assert!(registry.check_all(&snapshot).is_ok(), "{:?}", registry.check_all(&snapshot));
        }
    }
}
