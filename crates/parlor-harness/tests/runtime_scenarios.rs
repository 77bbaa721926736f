//! End-to-end scenarios through the production runtime.
//!
//! Each test scripts a user with [`SimDriver`], runs the real
//! [`Runtime`] against the in-process backend, and ends with oracle checks
//! on the last rendered session and on the backend.

use parlor_app::{
    ChatEventKind, ConnectionState, Driver, DriverEvent, Intent, PreConnectPolicy, Runtime,
    SessionConfig, SessionPhase,
};
use parlor_harness::{InvariantRegistry, SimDriver, create_shared_backend, sim_backend};
use parlor_proto::{OutboundEvent, Packet};

fn intents(script: &[(&str, &str)]) -> Vec<Intent> {
    script
        .iter()
        .map(|(verb, arg)| match *verb {
            "name" => Intent::SetDisplayName((*arg).into()),
            "join" => Intent::JoinRoom((*arg).into()),
            "create" => Intent::CreateRoom((*arg).into()),
            "leave" => Intent::LeaveRoom,
            "send" => Intent::SendMessage((*arg).into()),
            "draft" => Intent::EditDraft((*arg).into()),
            "submit" => Intent::SubmitDraft,
            _ => Intent::Quit,
        })
        .collect()
}

#[tokio::test]
async fn sent_message_appears_once_via_echo() {
    let backend = create_shared_backend();
    let driver =
        SimDriver::with_backend(backend.clone()).with_invariants(InvariantRegistry::standard());
    driver.inject_intents(intents(&[("name", "Ana"), ("join", "general"), ("send", "hi")]));
    let handle = driver.clone();

    Runtime::new(driver, SessionConfig::default(), "sim://chat").run().await.unwrap();

    let session = handle.last_rendered().unwrap();
    let messages: Vec<_> =
        session.snapshot().iter().filter(|e| e.kind == ChatEventKind::Message).collect();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "hi");
    assert!(session.author_is_self(messages[0]));
    assert!(session.draft().is_empty());
}

#[tokio::test]
async fn join_notice_comes_from_backend() {
    let backend = create_shared_backend();
    let driver = SimDriver::with_backend(backend.clone());
    driver.inject_intents(intents(&[("name", "Ana"), ("create", "lobby")]));
    let handle = driver.clone();

    Runtime::new(driver, SessionConfig::default(), "sim://chat").run().await.unwrap();

    let session = handle.last_rendered().unwrap();
    assert_eq!(session.phase(), SessionPhase::InRoom);
    assert_eq!(session.snapshot().len(), 1);
    assert_eq!(session.snapshot()[0].kind, ChatEventKind::JoinNotice);
    assert_eq!(session.snapshot()[0].room.as_deref(), Some("lobby"));
}

#[tokio::test]
async fn switching_rooms_forgets_previous_room() {
    let backend = create_shared_backend();
    let bob = sim_backend::lock(&backend).connect();
    let join = OutboundEvent::JoinRoom { room: "general".into() }.into_packet().unwrap();
    sim_backend::lock(&backend).handle_packet(&bob, &join);

    let driver =
        SimDriver::with_backend(backend.clone()).with_invariants(InvariantRegistry::standard());
    driver.inject_intents(intents(&[
        ("name", "Ana"),
        ("join", "general"),
        ("send", "hello general"),
        ("leave", ""),
        ("join", "random"),
    ]));
    let handle = driver.clone();

    Runtime::new(driver, SessionConfig::default(), "sim://chat").run().await.unwrap();

    let session = handle.last_rendered().unwrap();
    assert_eq!(session.membership().map(|m| m.room_name.as_str()), Some("random"));
    assert!(session.snapshot().iter().all(|e| e.room.as_deref() == Some("random")));
    assert!(!session.snapshot().iter().any(|e| e.content.contains("general")));
    assert_eq!(sim_backend::lock(&backend).occupants("general"), vec![bob]);
}

#[tokio::test]
async fn legacy_backend_broadcasts_with_username() {
    let backend = create_shared_backend();
    let driver = SimDriver::with_backend(backend.clone());
    driver.inject_intents(intents(&[
        ("name", "Ana"),
        ("join", "ignored"),
        ("draft", "hi all"),
        ("submit", ""),
    ]));
    let handle = driver.clone();

    Runtime::new(driver, SessionConfig::legacy(), "sim://chat").run().await.unwrap();

    let session = handle.last_rendered().unwrap();
    assert_eq!(session.phase(), SessionPhase::IdentitySet);
    assert_eq!(session.snapshot().len(), 1);
    assert_eq!(session.snapshot()[0].author_name.as_deref(), Some("Ana"));
    assert!(sim_backend::lock(&backend)
        .received()
        .iter()
        .all(|(_, event)| matches!(event, OutboundEvent::NewMessage(_))));
}

#[tokio::test]
async fn emits_before_connect_are_flushed_in_order() {
    let driver = SimDriver::new();
    driver.inject_intents(intents(&[("name", "Ana"), ("join", "general"), ("send", "early")]));
    driver.inject_packet(Packet::connect_accepted("sock-9"));
    let handle = driver.clone();

    Runtime::new(driver, SessionConfig::default(), "sim://chat").run().await.unwrap();

    let sent: Vec<_> = handle
        .take_outgoing()
        .iter()
        .filter_map(|p| OutboundEvent::from_packet(p).ok().flatten())
        .map(|e| e.name())
        .collect();
    assert_eq!(sent, ["joinRoom", "New message"]);
}

#[tokio::test]
async fn drop_policy_discards_emits_before_connect() {
    let driver = SimDriver::new();
    driver.inject_intents(intents(&[("name", "Ana"), ("join", "general")]));
    driver.inject_packet(Packet::connect_accepted("sock-9"));
    let handle = driver.clone();

    let config = SessionConfig::default().with_pre_connect(PreConnectPolicy::Drop);
    Runtime::new(driver, config, "sim://chat").run().await.unwrap();

    assert!(handle.take_outgoing().is_empty());
    // Local state is optimistic regardless
    assert!(handle.last_rendered().unwrap().is_joined());
}

#[tokio::test]
async fn closed_connection_is_reported_not_fatal() {
    let backend = create_shared_backend();
    let driver = SimDriver::with_backend(backend.clone());
    driver.inject_intents(intents(&[("name", "Ana"), ("join", "general")]));
    driver.inject_event(DriverEvent::Closed);
    driver.inject_intent(Intent::SendMessage("anyone?".into()));
    let handle = driver.clone();

    Runtime::new(driver, SessionConfig::default(), "sim://chat").run().await.unwrap();

    let rendered = handle.rendered();
    assert!(rendered.iter().any(|s| s.status_message() == Some("Disconnected")));
    assert!(!sim_backend::lock(&backend)
        .received()
        .iter()
        .any(|(_, event)| matches!(event, OutboundEvent::NewMessage(_))));
}

#[tokio::test]
async fn quit_stops_driver() {
    let backend = create_shared_backend();
    let driver = SimDriver::with_backend(backend.clone());
    driver.inject_intents(intents(&[("name", "Ana"), ("quit", ""), ("join", "general")]));
    let handle = driver.clone();

    Runtime::new(driver, SessionConfig::default(), "sim://chat").run().await.unwrap();

    assert!(handle.stop_calls() >= 1);
    assert!(!handle.is_connected());
    assert!(handle.has_pending());
    let id = handle.connection_id().unwrap();
    assert!(!sim_backend::lock(&backend).is_connected(&id));

    let session = handle.last_rendered().unwrap();
    assert_eq!(session.connection_state(), &ConnectionState::Disconnected);
    assert!(session.is_closed());
}

#[tokio::test]
async fn failed_send_is_dropped_and_session_continues() {
    let driver = SimDriver::new();
    driver.inject_packet(Packet::connect_accepted("sock-1"));
    driver.inject_intents(intents(&[
        ("name", "Ana"),
        ("join", "general"),
        ("leave", ""),
        ("join", "random"),
    ]));
    driver.fail_next_send();
    let handle = driver.clone();

    Runtime::new(driver, SessionConfig::default(), "sim://chat").run().await.unwrap();

    assert!(!handle.has_pending());
    let sent: Vec<_> = handle
        .take_outgoing()
        .iter()
        .filter_map(|p| OutboundEvent::from_packet(p).ok().flatten())
        .collect();
    assert_eq!(sent, vec![
        OutboundEvent::LeaveRoom { room: "general".into() },
        OutboundEvent::JoinRoom { room: "random".into() },
    ]);

    let session = handle.last_rendered().unwrap();
    assert_eq!(session.membership().map(|m| m.room_name.as_str()), Some("random"));
    assert!(handle.stop_calls() >= 1);
}

#[tokio::test]
async fn silently_lost_connection_drops_sends() {
    let driver = SimDriver::new();
    driver.inject_packet(Packet::connect_accepted("sock-1"));
    driver.inject_intents(intents(&[("name", "Ana"), ("join", "general"), ("send", "hi")]));
    driver.sever_after(2);
    let handle = driver.clone();

    Runtime::new(driver, SessionConfig::default(), "sim://chat").run().await.unwrap();

    assert!(!handle.has_pending());
    assert!(handle.take_outgoing().is_empty());
    let session = handle.last_rendered().unwrap();
    assert!(session.is_joined());
    assert_eq!(session.membership().map(|m| m.room_name.as_str()), Some("general"));
}

#[tokio::test]
async fn dropping_unrun_runtime_stops_driver() {
    let driver = SimDriver::new();
    let handle = driver.clone();

    drop(Runtime::new(driver, SessionConfig::default(), "sim://chat"));

    assert_eq!(handle.stop_calls(), 1);
}
