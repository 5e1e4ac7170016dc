use gramoc_frame::DataType;

/// Errors that can occur while converting payloads.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The value kind has no wire encoding.
    #[error("encoding {0} values is not supported")]
    Unsupported(DataType),

    /// The payload bytes do not match the format of their declared type.
    #[error("invalid {data_type} payload: {reason}")]
    Parse { data_type: DataType, reason: String },
}

impl PayloadError {
    pub(crate) fn parse(data_type: DataType, reason: impl Into<String>) -> Self {
        Self::Parse {
            data_type,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PayloadError>;
