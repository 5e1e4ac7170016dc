use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use gramoc_client::Readout;
use gramoc_payload::Value;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ReadoutOutput<'a> {
    channel: &'a str,
    data_type: &'a str,
    data: Option<&'a Value>,
    text: Option<String>,
    timestamp: String,
}

/// What a finished `demo` or `send` run did.
#[derive(Debug, Serialize)]
pub struct SessionReport {
    pub endpoint: String,
    pub attempts: u32,
    pub sent: String,
    pub sent_type: &'static str,
    pub state: &'static str,
}

pub fn print_readout(readout: &Readout, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ReadoutOutput {
                channel: readout.channel_label(),
                data_type: readout.data_type().name(),
                data: readout.value(),
                text: readout.value().map(Value::to_string),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "DATA TYPE", "DATA"])
                .add_row(vec![
                    readout.channel_label().to_string(),
                    readout.data_type().name().to_string(),
                    value_text(readout.value()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{readout:#}"),
        OutputFormat::Raw => {
            if let Some(value) = readout.value() {
                print_raw(value.to_string().as_bytes());
            }
        }
    }
}

pub fn print_report(report: &SessionReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ENDPOINT", "ATTEMPTS", "SENT", "TYPE", "STATE"])
                .add_row(vec![
                    report.endpoint.clone(),
                    report.attempts.to_string(),
                    report.sent.clone(),
                    report.sent_type.to_string(),
                    report.state.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "endpoint={} attempts={} sent={} ({}) state={}",
                report.endpoint, report.attempts, report.sent, report.sent_type, report.state
            );
        }
        OutputFormat::Raw => {}
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn value_text(value: Option<&Value>) -> String {
    value.map_or_else(|| "<none>".to_string(), Value::to_string)
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
