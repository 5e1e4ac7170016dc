use std::io::{Read, Write};
use std::net::SocketAddr;

use bytes::Bytes;
use gramoc_frame::{Channel, DataType, Frame, FrameConfig, FrameReader, FrameWriter};
use gramoc_payload::{encode_value, DecodeConfig, Value};
use gramoc_transport::{AlgoStream, Endpoint, TcpTransport};
use tracing::debug;

use crate::command::Command;
use crate::error::Result;
use crate::readout::Readout;

/// Exclusive owner of one stream to the algorithm server.
///
/// All operations block until complete. A connection is not safe for
/// concurrent use; callers serialize access.
pub struct Connection<R, W> {
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
    decode: DecodeConfig,
}

impl<R: Read, W: Write> Connection<R, W> {
    /// Assemble a connection from an existing frame reader and writer.
    pub fn from_parts(
        reader: FrameReader<R>,
        writer: FrameWriter<W>,
        decode: DecodeConfig,
    ) -> Self {
        Self {
            reader,
            writer,
            decode,
        }
    }

    /// Write every byte of `bytes`, looping in bounded chunks.
    pub fn write_exact(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_exact(bytes)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Block until exactly `n` bytes have been read.
    pub fn read_exact(&mut self, n: usize) -> Result<Bytes> {
        Ok(self.reader.read_exact(n)?)
    }

    /// Frame `payload` with the given header codes and write it.
    pub fn send_frame(&mut self, payload: &[u8], data_type: u16, channel: u16) -> Result<()> {
        self.writer.send(data_type, channel, payload)?;
        debug!(
            len = payload.len(),
            data_type = DataType::from_code(data_type).name(),
            channel,
            "sent frame"
        );
        Ok(())
    }

    /// Read the next complete frame.
    pub fn recv_frame(&mut self) -> Result<Frame> {
        let frame = self.reader.read_frame()?;
        debug!(
            len = frame.payload.len(),
            data_type = frame.data_type().name(),
            channel = frame.channel,
            "received frame"
        );
        Ok(frame)
    }

    /// Encode a typed value and send it on `channel`.
    pub fn send_value(&mut self, value: &Value, channel: Channel) -> Result<()> {
        let (payload, data_type) = encode_value(value)?;
        self.send_frame(&payload, data_type.wire_code(), channel.code())
    }

    /// Send a control command as a STRING payload on the COM channel.
    pub fn send_command(&mut self, command: Command) -> Result<()> {
        debug!(%command, "sending command");
        self.send_frame(
            command.token().as_bytes(),
            DataType::String.wire_code(),
            Channel::Com.code(),
        )
    }

    /// Read the next frame and decode its payload.
    pub fn recv(&mut self) -> Result<Readout> {
        let frame = self.recv_frame()?;
        Readout::decode(&frame, &self.decode)
    }

    /// Payload decoding configuration in effect.
    pub fn decode_config(&self) -> &DecodeConfig {
        &self.decode
    }

    /// Flush pending output and release the stream.
    ///
    /// Consuming `self` makes a second close impossible.
    pub fn close(mut self) -> Result<()> {
        let flushed = self.writer.flush();
        drop(self);
        debug!("connection closed");
        Ok(flushed?)
    }

    /// Split into the frame reader and writer.
    pub fn into_parts(self) -> (FrameReader<R>, FrameWriter<W>) {
        (self.reader, self.writer)
    }
}

impl Connection<AlgoStream, AlgoStream> {
    /// Open a TCP connection to `endpoint` and wrap it.
    ///
    /// Socket read/write timeouts from `frame` are applied to the stream.
    pub fn open(endpoint: &Endpoint, frame: FrameConfig, decode: DecodeConfig) -> Result<Self> {
        let stream = TcpTransport::connect(endpoint)?;
        let reader_stream = stream.try_clone()?;

        let reader = FrameReader::with_config_stream(reader_stream, frame.clone())?;
        let writer = FrameWriter::with_config_stream(stream, frame)?;
        Ok(Self::from_parts(reader, writer, decode))
    }

    /// Address of the connected server.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        Ok(self.writer.get_ref().peer_addr()?)
    }
}
