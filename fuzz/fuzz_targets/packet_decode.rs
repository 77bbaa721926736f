//! Fuzz target for wire decoding
//!
//! Feeds arbitrary text through every decoder on the inbound path:
//! - Engine.IO frame decoding
//! - Socket.IO packet decoding
//! - Chat event interpretation
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use parlor_proto::{EnginePacket, InboundEvent, OutboundEvent, Packet};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    if let Ok(EnginePacket::Message(inner)) = EnginePacket::decode(&text) {
        let _ = Packet::decode(&inner);
    }

    if let Ok(packet) = Packet::decode(&text) {
        // Anything that decodes must encode again
        assert!(packet.encode().is_ok(), "decoded packet failed to encode: {packet:?}");
        let _ = OutboundEvent::from_packet(&packet);
        let _ = InboundEvent::from_packet(packet);
    }
});
