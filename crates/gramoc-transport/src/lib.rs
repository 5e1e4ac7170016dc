//! TCP transport for talking to a gramoc algorithm server.
//!
//! This is the lowest layer of the client. It resolves an [`Endpoint`],
//! opens a TCP connection bounded by the endpoint's connect timeout and hands
//! back an [`AlgoStream`]. Everything else builds on top of that stream.

pub mod endpoint;
pub mod error;
pub mod stream;
pub mod tcp;

pub use endpoint::{Endpoint, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HOST, DEFAULT_PORT};
pub use error::{Result, TransportError};
pub use stream::AlgoStream;
pub use tcp::TcpTransport;
