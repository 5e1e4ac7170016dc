use std::fmt;

use gramoc_frame::{Channel, DataType, Frame};
use gramoc_payload::{decode_value_with_config, DecodeConfig, Value};

use crate::command::Command;
use crate::error::Result;

/// Decoded, immutable view of one received frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Readout {
    channel: Option<Channel>,
    data_type: DataType,
    value: Option<Value>,
}

impl Readout {
    /// Decode a frame's payload according to its declared data type.
    ///
    /// Unknown channel codes become `None`; unknown data type codes become
    /// `NotFound` with no value. Malformed payloads are an error.
    pub fn decode(frame: &Frame, config: &DecodeConfig) -> Result<Self> {
        let data_type = frame.data_type();
        let value = decode_value_with_config(frame.payload.as_ref(), data_type, config)?;
        Ok(Self {
            channel: frame.channel(),
            data_type,
            value,
        })
    }

    /// Channel the frame arrived on, if the code is known.
    pub fn channel(&self) -> Option<Channel> {
        self.channel
    }

    /// Channel name, or `UNKNOWN` for an unrecognised code.
    pub fn channel_label(&self) -> &'static str {
        self.channel.map_or("UNKNOWN", Channel::name)
    }

    /// Declared data type.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Decoded payload, absent for `NotFound`.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Take ownership of the decoded payload.
    pub fn into_value(self) -> Option<Value> {
        self.value
    }

    /// True if this is `command` sent as a STRING on the COM channel.
    pub fn is_command(&self, command: Command) -> bool {
        self.channel == Some(Channel::Com)
            && self.data_type == DataType::String
            && self.value.as_ref().and_then(Value::as_str) == Some(command.token())
    }
}

/// One line, `Channel: COM, Data Type: STRING, Data: ACK`. The alternate
/// form (`{:#}`) puts each field on its own line.
impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if f.alternate() { "\n" } else { ", " };
        write!(f, "Channel: {}{sep}", self.channel_label())?;
        write!(f, "Data Type: {}{sep}", self.data_type)?;
        match &self.value {
            Some(value) => write!(f, "Data: {value}"),
            None => f.write_str("Data: <none>"),
        }
    }
}
