use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};

use crate::channel::Channel;
use crate::data_type::DataType;
use crate::error::{FrameError, Result};

/// Frame header: length (4) + data type (2) + channel (2) = 8 bytes.
pub const HEADER_SIZE: usize = 8;

/// Default maximum inbound payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Default upper bound for a single socket read or write.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Number of payload bytes that follow the header.
    pub payload_length: u32,
    /// Raw data type code.
    pub data_type: u16,
    /// Raw channel code.
    pub channel: u16,
}

/// A complete wire message.
///
/// Codes are kept raw so that unknown values survive until the payload is
/// interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw data type code.
    pub data_type: u16,
    /// Raw channel code.
    pub channel: u16,
    /// The message payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame from typed tags.
    pub fn new(data_type: DataType, channel: Channel, payload: impl Into<Bytes>) -> Self {
        Self::from_codes(data_type.wire_code(), channel.code(), payload)
    }

    /// Create a new frame from raw header codes.
    pub fn from_codes(data_type: u16, channel: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            data_type,
            channel,
            payload: payload.into(),
        }
    }

    /// Interpreted data type (unknown codes become `NotFound`).
    pub fn data_type(&self) -> DataType {
        DataType::from_code(self.data_type)
    }

    /// Interpreted channel (unknown codes become `None`).
    pub fn channel(&self) -> Option<Channel> {
        Channel::from_code(self.channel)
    }
}

/// Pack a header into its 8-byte wire form.
///
/// ```text
/// ┌──────────────────┬────────────────┬──────────────┬──────────────────┐
/// │ Length (4B BE)   │ Data type      │ Channel      │ Payload          │
/// │ payload bytes    │ (2B BE)        │ (2B BE)      │ (Length bytes)   │
/// └──────────────────┴────────────────┴──────────────┴──────────────────┘
/// ```
pub fn encode_header(
    payload_length: usize,
    data_type: u32,
    channel: u32,
) -> Result<[u8; HEADER_SIZE]> {
    let length = u32::try_from(payload_length).map_err(|_| FrameError::Encoding {
        field: "payload length",
        value: payload_length as u64,
        max: u64::from(u32::MAX),
    })?;
    let data_type = u16::try_from(data_type).map_err(|_| FrameError::Encoding {
        field: "data type code",
        value: u64::from(data_type),
        max: u64::from(u16::MAX),
    })?;
    let channel = u16::try_from(channel).map_err(|_| FrameError::Encoding {
        field: "channel code",
        value: u64::from(channel),
        max: u64::from(u16::MAX),
    })?;

    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(&length.to_be_bytes());
    header[4..6].copy_from_slice(&data_type.to_be_bytes());
    header[6..8].copy_from_slice(&channel.to_be_bytes());
    Ok(header)
}

/// Unpack the leading 8 bytes of `src` into a header.
pub fn decode_header(src: &[u8]) -> Result<Header> {
    if src.len() < HEADER_SIZE {
        return Err(FrameError::IncompleteHeader {
            got: src.len(),
            need: HEADER_SIZE,
        });
    }

    Ok(Header {
        payload_length: u32::from_be_bytes([src[0], src[1], src[2], src[3]]),
        data_type: u16::from_be_bytes([src[4], src[5]]),
        channel: u16::from_be_bytes([src[6], src[7]]),
    })
}

/// Append a complete frame (header + payload) to `dst`.
pub fn encode_frame(
    data_type: u16,
    channel: u16,
    payload: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    let header = encode_header(payload.len(), u32::from(data_type), u32::from(channel))?;
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&header);
    dst.put_slice(payload);
    Ok(())
}

/// Configuration for frame reading and writing.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum inbound payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
    /// Upper bound for a single read or write call. Default: 4096.
    pub chunk_size: usize,
    /// Read timeout for blocking operations. `None` blocks indefinitely.
    pub read_timeout: Option<Duration>,
    /// Write timeout for blocking operations. `None` blocks indefinitely.
    pub write_timeout: Option<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            chunk_size: DEFAULT_CHUNK_SIZE,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
