//! Fuzz target for the Engine.IO session state machine
//!
//! # Strategy
//!
//! - Frames: arbitrary text plus well-formed handshake, ping, message and
//!   close frames so the fuzzer reaches the open state quickly
//! - Time: monotonic advances, including jumps past the liveness window
//! - Shutdown: client close at any point
//!
//! # Invariants
//!
//! - Never panics
//! - Once closed, the session stays closed and rejects further frames
//! - Every ping is answered with exactly one pong
//! - Messages are only delivered while open

#![no_main]

use std::time::{Duration, Instant};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use parlor_client::{EngineAction, EngineConfig, EngineSession, EngineState};

#[derive(Debug, Clone, Arbitrary)]
enum EngineOp {
    Raw(String),
    Handshake { ping_interval: u16, ping_timeout: u16 },
    Ping(Option<String>),
    Message(String),
    ServerClose,
    Advance(u16),
    ClientClose,
}

fn frame(op: &EngineOp) -> Option<String> {
    match op {
        EngineOp::Raw(text) => Some(text.clone()),
        EngineOp::Handshake { ping_interval, ping_timeout } => Some(format!(
            r#"0{{"sid":"fz","upgrades":[],"pingInterval":{ping_interval},"pingTimeout":{ping_timeout},"maxPayload":1000000}}"#
        )),
        EngineOp::Ping(data) => Some(format!("2{}", data.as_deref().unwrap_or_default())),
        EngineOp::Message(body) => Some(format!("4{body}")),
        EngineOp::ServerClose => Some("1".to_string()),
        EngineOp::Advance(_) | EngineOp::ClientClose => None,
    }
}

fuzz_target!(|ops: Vec<EngineOp>| {
    let start = Instant::now();
    let mut elapsed = Duration::ZERO;
    let mut session = EngineSession::new(start, &EngineConfig::default());

    for op in ops {
        let before = session.state();

        match &op {
            EngineOp::Advance(ms) => {
                elapsed += Duration::from_millis(u64::from(*ms) * 100);
                let _ = session.tick(start + elapsed);
            },
            EngineOp::ClientClose => {
                let actions = session.close();
                if before == EngineState::Closed {
                    assert!(actions.is_empty(), "close on closed session produced {actions:?}");
                }
            },
            _ => {
                let Some(text) = frame(&op) else { continue };
                match session.handle_text(&text, start + elapsed) {
                    Ok(actions) => {
                        assert_ne!(before, EngineState::Closed, "closed session accepted {text:?}");
                        if matches!(op, EngineOp::Ping(_)) {
                            assert_eq!(actions.len(), 1);
                            assert!(matches!(&actions[0], EngineAction::SendText(t) if t.starts_with('3')));
                        }
                        if actions.iter().any(|a| matches!(a, EngineAction::Deliver(_))) {
                            assert_eq!(before, EngineState::Open);
                        }
                    },
                    Err(_) => {},
                }
            },
        }

        if before == EngineState::Closed {
            assert_eq!(session.state(), EngineState::Closed);
        }
    }
});
