use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use gramoc_transport::AlgoStream;
use tracing::trace;

use crate::codec::{encode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::reader::transport_to_frame_error;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete frames to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Write the whole buffer, in chunks of at most `chunk_size` bytes.
    pub fn write_exact(&mut self, bytes: &[u8]) -> Result<()> {
        let chunk_size = self.config.chunk_size.max(1);
        let mut offset = 0usize;

        while offset < bytes.len() {
            let end = bytes.len().min(offset + chunk_size);
            match self.inner.write(&bytes[offset..end]) {
                Ok(0) => {
                    return Err(FrameError::ConnectionClosed {
                        expected: bytes.len(),
                        received: offset,
                    })
                }
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        Ok(())
    }

    /// Write a complete frame (blocking).
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send(frame.data_type, frame.channel, frame.payload.as_ref())
    }

    /// Encode and send a payload with the given header codes.
    pub fn send(&mut self, data_type: u16, channel: u16, payload: &[u8]) -> Result<()> {
        let mut buf = std::mem::take(&mut self.buf);
        buf.clear();
        encode_frame(data_type, channel, payload, &mut buf)?;
        let written = self.write_exact(&buf);
        self.buf = buf;
        written?;
        self.flush()?;

        trace!(len = payload.len(), data_type, channel, "frame sent");
        Ok(())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameWriter<AlgoStream> {
    /// Create a frame writer for `AlgoStream` and apply write timeout from config.
    pub fn with_config_stream(inner: AlgoStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}
