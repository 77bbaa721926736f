//! Session configuration.

/// What to do with outbound events produced before the backend accepted the
/// connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PreConnectPolicy {
    /// Hold them and send in order once connected.
    #[default]
    Queue,
    /// Discard them.
    Drop,
}

/// Session behaviour switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Backend supports rooms. When `false` there is a single shared channel:
    /// room intents are ignored and messages carry the author name instead of
    /// a room.
    pub rooms_enabled: bool,
    /// Drop inbound events tagged with a room other than the joined one.
    pub filter_by_room: bool,
    /// Handling of events emitted before connect.
    pub pre_connect: PreConnectPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { rooms_enabled: true, filter_by_room: false, pre_connect: PreConnectPolicy::Queue }
    }
}

impl SessionConfig {
    /// Configuration for a backend without rooms.
    pub fn legacy() -> Self {
        Self { rooms_enabled: false, ..Self::default() }
    }

    /// Enable or disable rooms.
    #[must_use]
    pub fn with_rooms(mut self, enabled: bool) -> Self {
        self.rooms_enabled = enabled;
        self
    }

    /// Enable or disable room filtering of inbound events.
    #[must_use]
    pub fn with_room_filter(mut self, enabled: bool) -> Self {
        self.filter_by_room = enabled;
        self
    }

    /// Set the pre-connect policy.
    #[must_use]
    pub fn with_pre_connect(mut self, policy: PreConnectPolicy) -> Self {
        self.pre_connect = policy;
        self
    }
}
