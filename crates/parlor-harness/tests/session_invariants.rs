//! Property-based tests for the full runtime.
//!
//! Arbitrary intent scripts, interleaved with arbitrary backend traffic, are
//! run through the production [`Runtime`] against the in-process backend.
//! The standard invariants are checked on every render.

use parlor_app::{DriverEvent, Intent, Runtime, SessionConfig};
use parlor_harness::{InvariantRegistry, SimDriver, create_shared_backend};
use parlor_proto::{ChatPayload, InboundEvent};
use proptest::prelude::*;

fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        2 => "[a-z]{1,8}",
        1 => Just(String::new()),
        1 => Just("   ".to_string()),
    ]
}

fn intent_strategy() -> impl Strategy<Value = Intent> {
    prop_oneof![
        2 => text_strategy().prop_map(Intent::SetDisplayName),
        3 => prop_oneof![Just("general"), Just("random"), Just(" ")]
            .prop_map(|r| Intent::JoinRoom(r.to_string())),
        1 => text_strategy().prop_map(Intent::CreateRoom),
        2 => Just(Intent::LeaveRoom),
        3 => text_strategy().prop_map(Intent::SendMessage),
        1 => text_strategy().prop_map(Intent::EditDraft),
        1 => Just(Intent::SubmitDraft),
    ]
}

fn payload_strategy() -> impl Strategy<Value = ChatPayload> {
    (text_strategy(), prop::option::of(prop_oneof![Just("general"), Just("other")])).prop_map(
        |(content, room)| {
            let payload = ChatPayload::new(content);
            match room {
                Some(room) => payload.with_room(room),
                None => payload,
            }
        },
    )
}

/// Backend traffic the scripted user did not cause.
fn stray_event_strategy() -> impl Strategy<Value = DriverEvent> {
    prop_oneof![
        payload_strategy().prop_map(InboundEvent::Message),
        payload_strategy().prop_map(InboundEvent::UserJoin),
        payload_strategy().prop_map(InboundEvent::UserLeave),
    ]
    .prop_filter_map("encodable", |event| event.into_packet().ok().map(DriverEvent::Packet))
}

fn script_strategy() -> impl Strategy<Value = Vec<DriverEvent>> {
    prop::collection::vec(
        prop_oneof![
            4 => intent_strategy().prop_map(DriverEvent::Intent),
            1 => stray_event_strategy(),
        ],
        0..40,
    )
}

fn run_script(config: SessionConfig, script: Vec<DriverEvent>) -> Result<(), String> {
    let runtime =
        tokio::runtime::Builder::new_current_thread().build().map_err(|e| e.to_string())?;

    let driver = SimDriver::with_backend(create_shared_backend())
        .with_invariants(InvariantRegistry::standard());
    for event in script {
        driver.inject_event(event);
    }

    runtime
        .block_on(Runtime::new(driver, config, "sim://chat").run())
        .map_err(|e| e.to_string())
}

proptest! {
    #[test]
    fn prop_invariants_hold_with_rooms(script in script_strategy()) {
        prop_assert_eq!(run_script(SessionConfig::default(), script), Ok(()));
    }

    #[test]
    fn prop_invariants_hold_with_room_filter(script in script_strategy()) {
        let config = SessionConfig::default().with_room_filter(true);
        prop_assert_eq!(run_script(config, script), Ok(()));
    }

    #[test]
    fn prop_invariants_hold_without_rooms(script in script_strategy()) {
        prop_assert_eq!(run_script(SessionConfig::legacy(), script), Ok(()));
    }
}
