//! Session-level client for gramoc algorithm servers.
//!
//! This is the "just works" layer. Open a [`Session`], shake hands with
//! [`Session::connect`], exchange typed values and tear down with
//! [`Session::close`].

pub mod command;
pub mod config;
pub mod connection;
pub mod connector;
pub mod error;
pub mod readout;
pub mod session;

pub use command::Command;
pub use config::{ClientConfig, RetryPolicy};
pub use connection::Connection;
pub use connector::{open, open_with_config, TcpSession};
pub use error::{ClientError, ErrorKind, Result};
pub use readout::Readout;
pub use session::{Session, SessionState};
