/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A header field does not fit its wire width.
    #[error("cannot encode {field}: {value} exceeds {max}")]
    Encoding {
        field: &'static str,
        value: u64,
        max: u64,
    },

    /// Fewer than eight bytes were supplied to the header decoder.
    #[error("incomplete frame header ({got} bytes, need {need})")]
    IncompleteHeader { got: usize, need: usize },

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the stream before the expected bytes arrived.
    #[error("connection closed after {received} of {expected} bytes")]
    ConnectionClosed { expected: usize, received: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
