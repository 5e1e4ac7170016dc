use std::net::TcpStream;

use tracing::{debug, info};

use crate::endpoint::Endpoint;
use crate::error::{Result, TransportError};
use crate::stream::AlgoStream;

/// TCP transport to an algorithm server.
///
/// Every resolved address is tried in order; each attempt is bounded by the
/// endpoint's connect timeout.
pub struct TcpTransport;

impl TcpTransport {
    /// Connect to the endpoint (blocking, bounded by `connect_timeout` per address).
    pub fn connect(endpoint: &Endpoint) -> Result<AlgoStream> {
        if endpoint.connect_timeout.is_zero() {
            return Err(TransportError::InvalidTimeout);
        }

        let addrs = endpoint.resolve()?;
        let mut last_err = None;

        for addr in addrs {
            debug!(%addr, timeout = ?endpoint.connect_timeout, "attempting tcp connect");
            match TcpStream::connect_timeout(&addr, endpoint.connect_timeout) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    info!(%addr, "connected to algorithm server");
                    return Ok(AlgoStream::from_tcp(stream));
                }
                Err(source) => {
                    debug!(%addr, error = %source, "tcp connect failed");
                    last_err = Some(TransportError::Connect { addr, source });
                }
            }
        }

        Err(last_err.unwrap_or_else(|| TransportError::NoAddress {
            host: endpoint.host.clone(),
        }))
    }
}
