use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};
use gramoc_transport::AlgoStream;
use tracing::trace;

use crate::codec::{decode_header, Frame, FrameConfig, HEADER_SIZE};
use crate::error::{FrameError, Result};

/// Reads complete frames from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete frames.
pub struct FrameReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Block until exactly `n` bytes have been read.
    ///
    /// Reads are issued in chunks of at most `chunk_size` bytes. A zero-byte
    /// read means the peer closed the stream and is reported as
    /// [`FrameError::ConnectionClosed`], never retried.
    pub fn read_exact(&mut self, n: usize) -> Result<Bytes> {
        let chunk_size = self.config.chunk_size.max(1);
        let mut buf = BytesMut::zeroed(n);
        let mut filled = 0usize;

        while filled < n {
            let end = n.min(filled + chunk_size);
            match self.inner.read(&mut buf[filled..end]) {
                Ok(0) => {
                    return Err(FrameError::ConnectionClosed {
                        expected: n,
                        received: filled,
                    })
                }
                Ok(read) => filled += read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        Ok(buf.freeze())
    }

    /// Read the next complete frame (blocking).
    pub fn read_frame(&mut self) -> Result<Frame> {
        let header = decode_header(&self.read_exact(HEADER_SIZE)?)?;
        let payload_length = header.payload_length as usize;

        if payload_length > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: payload_length,
                max: self.config.max_payload_size,
            });
        }

        let payload = self.read_exact(payload_length)?;
        trace!(
            len = payload_length,
            data_type = header.data_type,
            channel = header.channel,
            "frame received"
        );

        Ok(Frame {
            data_type: header.data_type,
            channel: header.channel,
            payload,
        })
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameReader<AlgoStream> {
    /// Create a frame reader for `AlgoStream` and apply read timeout from config.
    pub fn with_config_stream(inner: AlgoStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_frame_error(err: gramoc_transport::TransportError) -> FrameError {
    match err {
        gramoc_transport::TransportError::Io(io) => FrameError::Io(io),
        gramoc_transport::TransportError::Resolve { source, .. }
        | gramoc_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}
