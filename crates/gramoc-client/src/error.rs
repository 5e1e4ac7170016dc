use gramoc_frame::FrameError;
use gramoc_payload::PayloadError;
use gramoc_transport::TransportError;

use crate::readout::Readout;
use crate::session::SessionState;

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Payload conversion error.
    #[error("payload error: {0}")]
    Payload(#[from] PayloadError),

    /// The server answered SYN with something other than ACK.
    #[error("handshake rejected: unexpected reply {0}")]
    HandshakeRejected(Box<Readout>),

    /// The operation is not valid in the current session state.
    #[error("cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// Every handshake attempt allowed by the retry policy failed.
    #[error("handshake failed after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// The caller cancelled a waiting operation.
    #[error("operation cancelled")]
    Cancelled,
}

/// Coarse classification of client errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Resolution, connect or mid-stream I/O failure. Fatal to the connection.
    Connection,
    /// A frame header could not be decoded or encoded.
    Protocol,
    /// Payload bytes do not match their declared data type.
    Parse,
    /// The value has no wire encoding.
    Unsupported,
    /// The handshake did not complete.
    Handshake,
    /// The session was used out of order.
    State,
    /// The caller cancelled.
    Cancelled,
}

impl ClientError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Transport(_) => ErrorKind::Connection,
            ClientError::Frame(err) => match err {
                FrameError::Io(_) | FrameError::ConnectionClosed { .. } => ErrorKind::Connection,
                FrameError::Encoding { .. }
                | FrameError::IncompleteHeader { .. }
                | FrameError::PayloadTooLarge { .. } => ErrorKind::Protocol,
            },
            ClientError::Payload(PayloadError::Parse { .. }) => ErrorKind::Parse,
            ClientError::Payload(PayloadError::Unsupported(_)) => ErrorKind::Unsupported,
            ClientError::HandshakeRejected(_) | ClientError::RetriesExhausted { .. } => {
                ErrorKind::Handshake
            }
            ClientError::InvalidState { .. } => ErrorKind::State,
            ClientError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Whether the underlying connection can no longer be used.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Connection | ErrorKind::Protocol)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
