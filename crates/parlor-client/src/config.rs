//! Transport configuration.

use crate::TransportError;

/// Default backend address.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3002";

/// Capacity of the packet channels between the session and the socket task.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Socket.IO endpoint path.
pub const SOCKET_IO_PATH: &str = "/socket.io/";

/// Where and how to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Backend base URL (`http`, `https`, `ws` or `wss`).
    pub base_url: String,
    /// Capacity of each packet channel. Values below 1 are clamped to 1.
    pub channel_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL)
    }
}

impl TransportConfig {
    /// Configuration for `base_url` with default channel sizing.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), channel_capacity: DEFAULT_CHANNEL_CAPACITY }
    }

    /// Set the packet channel capacity.
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Effective channel capacity.
    pub fn capacity(&self) -> usize {
        self.channel_capacity.max(1)
    }

    /// WebSocket endpoint URL for the Engine.IO v4 websocket transport.
    ///
    /// `http`/`https` map to `ws`/`wss`. Any path on the base URL is kept and
    /// the Socket.IO path appended to it.
    pub fn endpoint(&self) -> Result<String, TransportError> {
        let base = self.base_url.trim().trim_end_matches('/');

        let (scheme, rest) = base
            .split_once("://")
            .ok_or_else(|| TransportError::Config(format!("missing scheme in {base:?}")))?;

        let scheme = match scheme.to_ascii_lowercase().as_str() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(TransportError::Config(format!("unsupported scheme {other:?}")));
            },
        };

        if rest.is_empty() {
            return Err(TransportError::Config(format!("missing host in {base:?}")));
        }
        if rest.contains(['?', '#']) {
            return Err(TransportError::Config(format!(
                "base URL must not carry a query or fragment: {base:?}"
            )));
        }

        Ok(format!("{scheme}://{rest}{SOCKET_IO_PATH}?EIO=4&transport=websocket"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_backend() {
        assert_eq!(
            TransportConfig::default().endpoint().unwrap(),
            "ws://localhost:3002/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn https_maps_to_wss_and_keeps_path() {
        let config = TransportConfig::new("HTTPS://chat.example.com/app/");
        assert_eq!(
            config.endpoint().unwrap(),
            "wss://chat.example.com/app/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn rejects_unusable_urls() {
        for url in ["localhost:3002", "ftp://host", "http://", "http://host/?x=1"] {
            assert!(
                matches!(TransportConfig::new(url).endpoint(), Err(TransportError::Config(_))),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn capacity_is_clamped() {
        assert_eq!(TransportConfig::default().with_channel_capacity(0).capacity(), 1);
        assert_eq!(TransportConfig::default().capacity(), DEFAULT_CHANNEL_CAPACITY);
    }
}
