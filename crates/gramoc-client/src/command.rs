use std::fmt;
use std::str::FromStr;

/// Fixed control tokens exchanged on the COM channel as STRING payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// `SYN`: open the handshake.
    Synchronize,
    /// `ACK`: acknowledge the handshake.
    Acknowledge,
    /// `FIN`: disconnect.
    Disconnect,
    /// `STD`: start the data stream.
    StartData,
    /// `SPD`: stop the data stream.
    StopData,
}

impl Command {
    /// Every command.
    pub const ALL: [Command; 5] = [
        Command::Synchronize,
        Command::Acknowledge,
        Command::Disconnect,
        Command::StartData,
        Command::StopData,
    ];

    /// ASCII token sent on the wire.
    pub const fn token(self) -> &'static str {
        match self {
            Command::Synchronize => "SYN",
            Command::Acknowledge => "ACK",
            Command::Disconnect => "FIN",
            Command::StartData => "STD",
            Command::StopData => "SPD",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Error returned when text is not a command token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command token {0:?}")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|command| command.token() == s)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}
