/// What to do with a MAP payload that is not a valid JSON object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MapFallback {
    /// Fail with `PayloadError::Parse`.
    #[default]
    Reject,
    /// Decode the payload as plain text instead.
    ///
    /// Matches servers that treat an unparsable map as a string message.
    Text,
}

/// Controls payload decoding behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Handling of malformed MAP payloads.
    pub map_fallback: MapFallback,
}
