mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "gramoc", version, about = "Algorithm server client CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        env = "GRAMOC_LOG_LEVEL",
        default_value = "info",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_demo_subcommand() {
        let cli = Cli::try_parse_from([
            "gramoc",
            "--log-level",
            "debug",
            "demo",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--message",
            "hi",
        ])
        .expect("demo args should parse");

        match cli.command {
            Command::Demo(args) => {
                assert_eq!(args.connect.host, "127.0.0.1");
                assert_eq!(args.connect.port, 9000);
                assert_eq!(args.message, "hi");
            }
            other => panic!("expected demo, got {other:?}"),
        }
    }

    #[test]
    fn demo_defaults_to_greeting() {
        let cli = Cli::try_parse_from(["gramoc", "demo"]).expect("demo args should parse");
        match cli.command {
            Command::Demo(args) => assert_eq!(args.message, "Hallo Server"),
            other => panic!("expected demo, got {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_value_args() {
        let err = Cli::try_parse_from(["gramoc", "send", "--text", "a", "--int", "1"])
            .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_global_format_after_subcommand() {
        let cli = Cli::try_parse_from(["gramoc", "send", "--float", "-1.5", "--format", "json"])
            .expect("send args should parse");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        assert!(matches!(cli.command, Command::Send(_)));
    }

    #[test]
    fn rejects_unknown_map_fallback() {
        let err = Cli::try_parse_from(["gramoc", "demo", "--map-fallback", "guess"])
            .expect_err("unknown fallback should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
