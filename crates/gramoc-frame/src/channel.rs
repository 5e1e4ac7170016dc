//! Logical stream tags carried in every frame header.

use std::fmt;

/// Channel a frame travels on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Control messages: handshake and teardown commands.
    Com,
    /// Bulk algorithm data.
    Dat,
}

impl Channel {
    /// Wire code of this channel.
    pub const fn code(self) -> u16 {
        match self {
            Channel::Com => 1,
            Channel::Dat => 2,
        }
    }

    /// Look up a channel by wire code. Unknown codes yield `None`.
    pub const fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(Channel::Com),
            2 => Some(Channel::Dat),
            _ => None,
        }
    }

    /// Human-readable channel name.
    pub const fn name(self) -> &'static str {
        match self {
            Channel::Com => "COM",
            Channel::Dat => "DAT",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
