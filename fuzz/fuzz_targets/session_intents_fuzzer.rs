//! Fuzz target for the chat session state machine
//!
//! Drives a `Session` and its `Bridge` with arbitrary intents interleaved
//! with arbitrary inbound events, in every configuration.
//!
//! # Invariants
//!
//! - Never panics
//! - The standard session invariants hold after every step
//! - Sending never appends to the log directly
//! - Nothing is emitted before the connection opens unless queued, and the
//!   queue flushes on connect

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use parlor_app::{
    Bridge, Intent, PreConnectPolicy, Session, SessionAction, SessionConfig,
};
use parlor_harness::{InvariantRegistry, SessionSnapshot, SystemSnapshot};
use parlor_proto::{ChatPayload, InboundEvent, Packet};

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Name(String),
    Join(String),
    Create(String),
    Leave,
    Send(String),
    Draft(String),
    Submit,
    Connect(String),
    Inbound { kind: Kind, content: String, room: Option<String>, user_id: Option<String> },
    Closed,
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Kind {
    Message,
    Join,
    Leave,
}

#[derive(Debug, Clone, Copy, Arbitrary)]
struct Setup {
    legacy: bool,
    filter_by_room: bool,
    drop_before_connect: bool,
}

fn config(setup: Setup) -> SessionConfig {
    let base = if setup.legacy { SessionConfig::legacy() } else { SessionConfig::default() };
    let policy =
        if setup.drop_before_connect { PreConnectPolicy::Drop } else { PreConnectPolicy::Queue };
    base.with_room_filter(setup.filter_by_room).with_pre_connect(policy)
}

fn intent(op: &Op) -> Option<Intent> {
    Some(match op {
        Op::Name(name) => Intent::SetDisplayName(name.clone()),
        Op::Join(room) => Intent::JoinRoom(room.clone()),
        Op::Create(room) => Intent::CreateRoom(room.clone()),
        Op::Leave => Intent::LeaveRoom,
        Op::Send(text) => Intent::SendMessage(text.clone()),
        Op::Draft(text) => Intent::EditDraft(text.clone()),
        Op::Submit => Intent::SubmitDraft,
        Op::Connect(_) | Op::Inbound { .. } | Op::Closed => return None,
    })
}

fn inbound(op: Op) -> Option<Packet> {
    match op {
        Op::Connect(sid) => Some(Packet::connect_accepted(&sid)),
        Op::Inbound { kind, content, room, user_id } => {
            let mut payload = ChatPayload::new(content).with_author(None, user_id);
            if let Some(room) = room {
                payload = payload.with_room(room);
            }
            let event = match kind {
                Kind::Message => InboundEvent::Message(payload),
                Kind::Join => InboundEvent::UserJoin(payload),
                Kind::Leave => InboundEvent::UserLeave(payload),
            };
            event.into_packet().ok()
        },
        _ => None,
    }
}

fn run_actions(session: &mut Session, bridge: &mut Bridge, actions: Vec<SessionAction>) {
    for action in actions {
        if matches!(action, SessionAction::Emit { .. }) {
            for event in bridge.process_action(action) {
                let _ = session.handle(event);
            }
        }
    }
}

fuzz_target!(|input: (Setup, Vec<Op>)| {
    let (setup, ops) = input;
    let registry = InvariantRegistry::standard();
    let mut session = Session::new(config(setup));
    let mut bridge = Bridge::new(session.config().pre_connect);

    for op in ops {
        if let Some(intent) = intent(&op) {
            let is_send = matches!(intent, Intent::SendMessage(_) | Intent::SubmitDraft);
            let before = session.snapshot().len();
            let actions = session.apply(intent);
            if is_send {
                assert_eq!(session.snapshot().len(), before, "send appended to the log");
            }
            run_actions(&mut session, &mut bridge, actions);
        } else if matches!(op, Op::Closed) {
            for event in bridge.handle_closed() {
                let _ = session.handle(event);
            }
        } else if let Some(packet) = inbound(op) {
            let was_connected = bridge.is_connected();
            let queued = bridge.queued_len();
            for event in bridge.handle_packet(packet) {
                let actions = session.handle(event);
                run_actions(&mut session, &mut bridge, actions);
            }
            if !was_connected && bridge.is_connected() {
                assert_eq!(bridge.queued_len(), 0, "queue not flushed on connect");
                assert!(bridge.take_outgoing().len() >= queued);
            }
        }

        let _ = bridge.take_outgoing();
        assert!(session.snapshot().iter().all(|e| !e.content.trim().is_empty()));

        let snapshot = SystemSnapshot::single(SessionSnapshot::from_session(&session));
        if let Err(violation) = registry.check_all(&snapshot) {
            panic!("invariant violated: {violation:?}");
        }
    }
});
