//! Fixed-header binary framing for the gramoc algorithm protocol.
//!
//! Every message on the wire is an 8-byte header followed by the payload:
//! - a 4-byte big-endian payload length
//! - a 2-byte big-endian data type code
//! - a 2-byte big-endian channel code
//!
//! The reader and writer guarantee exact-byte semantics: callers never see a
//! partial frame.

pub mod channel;
pub mod codec;
pub mod data_type;
pub mod error;
pub mod reader;
pub mod writer;

pub use channel::Channel;
pub use codec::{
    decode_header, encode_frame, encode_header, Frame, FrameConfig, Header, DEFAULT_CHUNK_SIZE,
    DEFAULT_MAX_PAYLOAD, HEADER_SIZE,
};
pub use data_type::DataType;
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
