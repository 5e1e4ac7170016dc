use gramoc_transport::{AlgoStream, Endpoint};
use tracing::debug;

use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::error::Result;
use crate::session::Session;

/// A session over a TCP stream.
pub type TcpSession = Session<AlgoStream, AlgoStream>;

/// Open a TCP session to `endpoint` with default frame and decode settings.
///
/// The returned session is in [`crate::SessionState::Init`]; call
/// [`Session::connect`] to shake hands.
pub fn open(endpoint: &Endpoint) -> Result<TcpSession> {
    open_with_config(&ClientConfig::new(endpoint.clone()))
}

/// Open a TCP session with explicit configuration.
pub fn open_with_config(config: &ClientConfig) -> Result<TcpSession> {
    let conn = Connection::open(&config.endpoint, config.frame.clone(), config.decode)?;
    debug!(endpoint = %config.endpoint, "opened session");
    Ok(Session::new(conn))
}
