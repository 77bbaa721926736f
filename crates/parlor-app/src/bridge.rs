//! Session-to-wire translation layer.
//!
//! The [`Bridge`] adapts the high-level [`crate::Session`] lifecycle to
//! Socket.IO packets.
//!
//! # Responsibilities
//!
//! - Converts [`crate::SessionAction::Emit`] into event packets.
//! - Accumulates outgoing [`Packet`]s to be sent by the driver in the next
//!   I/O cycle.
//! - Holds or drops packets emitted before the backend accepted the
//!   connection, per [`PreConnectPolicy`].
//! - Interprets inbound packets and converts them into
//!   [`crate::SessionEvent`]s.

use parlor_proto::{ChatPayload, InboundEvent, Packet};

use crate::{ChatEvent, ChatEventKind, PreConnectPolicy, SessionAction, SessionEvent};

/// Link state as seen by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    /// Waiting for the namespace connect.
    Pending,
    /// Connect accepted.
    Open,
    /// Connection ended. Nothing more is sent.
    Closed,
}

/// Bridge between Session and the wire.
#[derive(Debug, Clone)]
pub struct Bridge {
    link: Link,
    policy: PreConnectPolicy,
    /// Packets emitted before connect, oldest first.
    queued: Vec<Packet>,
    outgoing: Vec<Packet>,
}

impl Bridge {
    /// Create a bridge waiting for the connection.
    pub fn new(policy: PreConnectPolicy) -> Self {
        Self { link: Link::Pending, policy, queued: Vec::new(), outgoing: Vec::new() }
    }

    /// Whether the backend accepted the connection and it is still up.
    pub fn is_connected(&self) -> bool {
        self.link == Link::Open
    }

    /// Number of packets held until connect.
    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// Process a Session action and return resulting Session events.
    pub fn process_action(&mut self, action: SessionAction) -> Vec<SessionEvent> {
        let SessionAction::Emit { event, .. } = action else {
            return vec![];
        };

        let name = event.name();
        let packet = match event.into_packet() {
            Ok(packet) => packet,
            Err(e) => return vec![SessionEvent::Error { message: e.to_string() }],
        };

        match (self.link, self.policy) {
            (Link::Open, _) => self.outgoing.push(packet),
            (Link::Pending, PreConnectPolicy::Queue) => {
                tracing::debug!(event = name, "not connected yet, queueing");
                self.queued.push(packet);
            },
            (Link::Pending, PreConnectPolicy::Drop) => {
                tracing::warn!(event = name, "not connected yet, dropping");
            },
            (Link::Closed, _) => {
                tracing::warn!(event = name, "connection closed, dropping");
            },
        }
        vec![]
    }

    /// Handle a packet from the backend.
    pub fn handle_packet(&mut self, packet: Packet) -> Vec<SessionEvent> {
        let event = match InboundEvent::from_packet(packet) {
            Ok(Some(event)) => event,
            Ok(None) => return vec![],
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed packet");
                return vec![];
            },
        };

        match event {
            InboundEvent::Connect { sid } => {
                if self.link == Link::Closed {
                    tracing::warn!("connect after close, ignoring");
                    return vec![];
                }
                self.link = Link::Open;
                if !self.queued.is_empty() {
                    tracing::debug!(count = self.queued.len(), "flushing queued packets");
                    self.outgoing.append(&mut self.queued);
                }
                vec![SessionEvent::Connected { local_id: sid.unwrap_or_default() }]
            },
            InboundEvent::Disconnect => self.handle_closed(),
            InboundEvent::ConnectError { message } => vec![SessionEvent::Error { message }],
            InboundEvent::Message(payload) => chat(ChatEventKind::Message, payload),
            InboundEvent::UserJoin(payload) => chat(ChatEventKind::JoinNotice, payload),
            InboundEvent::UserLeave(payload) => chat(ChatEventKind::LeaveNotice, payload),
            InboundEvent::Other { name } => {
                tracing::debug!(%name, "ignoring unknown event");
                vec![]
            },
        }
    }

    /// The connection ended.
    pub fn handle_closed(&mut self) -> Vec<SessionEvent> {
        if self.link == Link::Closed {
            return vec![];
        }
        if !self.queued.is_empty() {
            tracing::warn!(count = self.queued.len(), "connection closed with queued packets");
            self.queued.clear();
        }
        self.link = Link::Closed;
        vec![SessionEvent::Disconnected]
    }

    /// Take pending outgoing packets.
    pub fn take_outgoing(&mut self) -> Vec<Packet> {
        std::mem::take(&mut self.outgoing)
    }
}

fn chat(kind: ChatEventKind, payload: ChatPayload) -> Vec<SessionEvent> {
    vec![SessionEvent::Chat(ChatEvent::from_payload(kind, payload))]
}
