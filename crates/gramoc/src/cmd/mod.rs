use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use gramoc_client::{ClientConfig, RetryPolicy, TcpSession};
use gramoc_frame::{Channel, FrameConfig};
use gramoc_payload::{DecodeConfig, MapFallback};
use gramoc_transport::{Endpoint, DEFAULT_HOST, DEFAULT_PORT};

use crate::exit::{CliError, CliResult, INTERNAL};
use crate::output::OutputFormat;

pub mod demo;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Handshake, send one greeting and tear down.
    Demo(DemoArgs),
    /// Handshake, send one typed value and optionally print the reply.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Demo(args) => demo::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where the algorithm server is and how to talk to it.
#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    /// Algorithm server host.
    #[arg(long, env = "GRAMOC_HOST", default_value = DEFAULT_HOST)]
    pub host: String,
    /// Algorithm server port.
    #[arg(long, env = "GRAMOC_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// TCP connect timeout (e.g. 5s, 500ms).
    #[arg(long, value_name = "DURATION", default_value = "5s", value_parser = parse_duration)]
    pub connect_timeout: Duration,
    /// Pause between handshake attempts (e.g. 500ms).
    #[arg(long, value_name = "DURATION", default_value = "500ms", value_parser = parse_duration)]
    pub retry_interval: Duration,
    /// Give up after this many handshake attempts. Default: retry until interrupted.
    #[arg(long)]
    pub max_attempts: Option<u32>,
    /// Fail reads that stall longer than this (e.g. 10s). Default: wait forever.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub read_timeout: Option<Duration>,
    /// How to treat MAP payloads that are not valid JSON.
    #[arg(long, value_enum, default_value = "reject")]
    pub map_fallback: MapFallbackArg,
}

impl ConnectArgs {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: Endpoint::new(self.host.clone(), self.port)
                .with_connect_timeout(self.connect_timeout),
            frame: FrameConfig {
                read_timeout: self.read_timeout,
                ..FrameConfig::default()
            },
            decode: DecodeConfig {
                map_fallback: self.map_fallback.into(),
            },
            retry: RetryPolicy {
                interval: self.retry_interval,
                max_attempts: self.max_attempts,
            },
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum MapFallbackArg {
    /// Report a parse error.
    Reject,
    /// Keep the raw text as a STRING value.
    Text,
}

impl From<MapFallbackArg> for MapFallback {
    fn from(arg: MapFallbackArg) -> Self {
        match arg {
            MapFallbackArg::Reject => MapFallback::Reject,
            MapFallbackArg::Text => MapFallback::Text,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ChannelArg {
    Com,
    Dat,
}

impl From<ChannelArg> for Channel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Com => Channel::Com,
            ChannelArg::Dat => Channel::Dat,
        }
    }
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Message to send once the handshake completes.
    #[arg(long, default_value = "Hallo Server")]
    pub message: String,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Channel to send on.
    #[arg(long, short = 'c', value_enum, default_value = "com")]
    pub channel: ChannelArg,
    /// STRING payload.
    #[arg(long, conflicts_with_all = ["int", "float", "ints", "floats"])]
    pub text: Option<String>,
    /// INT payload.
    #[arg(
        long,
        allow_negative_numbers = true,
        conflicts_with_all = ["text", "float", "ints", "floats"]
    )]
    pub int: Option<i64>,
    /// FLOAT payload.
    #[arg(
        long,
        allow_negative_numbers = true,
        conflicts_with_all = ["text", "int", "ints", "floats"]
    )]
    pub float: Option<f64>,
    /// LIST_INT payload (comma-separated).
    #[arg(
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        conflicts_with_all = ["text", "int", "float", "floats"]
    )]
    pub ints: Option<Vec<i64>>,
    /// LIST_FLOAT payload (comma-separated).
    #[arg(
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        conflicts_with_all = ["text", "int", "float", "ints"]
    )]
    pub floats: Option<Vec<f64>>,
    /// Ask the server to start streaming (STD) after sending.
    #[arg(long)]
    pub start: bool,
    /// Wait for one readout and print it.
    #[arg(long)]
    pub wait: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `250ms`, `5s`, `2m` or a bare number of seconds. Zero is rejected.
fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (digits, unit) = input.split_at(split);

    let value: u64 = digits
        .parse()
        .map_err(|_| format!("expected a number with an optional ms/s/m unit, got `{input}`"))?;
    if value == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "" | "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value.saturating_mul(60))),
        other => Err(format!("unknown duration unit `{other}` (use ms, s or m)")),
    }
}

/// Resolved server address when the connection knows it, else the endpoint.
pub fn peer_label(session: &TcpSession, endpoint: &Endpoint) -> String {
    session
        .connection()
        .and_then(|conn| conn.peer_addr().ok())
        .map_or_else(|| endpoint.to_string(), |addr| addr.to_string())
}

/// Flip the returned flag on Ctrl-C.
pub fn install_cancel_handler() -> CliResult<Arc<AtomicBool>> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))?;
    Ok(cancel)
}
