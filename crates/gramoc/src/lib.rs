//! Client for gramoc algorithm servers.
//!
//! gramoc speaks the algorithm server's binary protocol over TCP: 8-byte
//! framed messages on a COM and a DAT channel, text-encoded typed payloads and
//! a SYN/ACK handshake with an SPD/FIN teardown.
//!
//! # Crate Structure
//!
//! - [`transport`]: endpoint resolution and the TCP stream
//! - [`frame`]: header codec and exact-byte frame reader/writer
//! - [`payload`]: typed values and their wire text
//! - [`client`]: connection, readouts and the session state machine (behind `client` feature)

/// Re-export transport types.
pub mod transport {
    pub use gramoc_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use gramoc_frame::*;
}

/// Re-export payload types.
pub mod payload {
    pub use gramoc_payload::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use gramoc_client::*;
}
