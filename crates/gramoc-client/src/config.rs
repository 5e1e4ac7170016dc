use std::time::Duration;

use gramoc_frame::FrameConfig;
use gramoc_payload::DecodeConfig;
use gramoc_transport::Endpoint;

/// How [`crate::Session::connect_with_retry`] repeats rejected handshakes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause between attempts.
    pub interval: Duration,
    /// Give up after this many attempts. `None` retries until cancelled.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_attempts: None,
        }
    }
}

/// Everything needed to open a session to an algorithm server.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Server address and connect timeout.
    pub endpoint: Endpoint,
    /// Frame chunking, payload limit and socket timeouts.
    pub frame: FrameConfig,
    /// Payload decoding behavior.
    pub decode: DecodeConfig,
    /// Handshake retry behavior.
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Configuration for `endpoint` with every other setting at its default.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            ..Self::default()
        }
    }
}
