use gramoc_client::open_with_config;
use tracing::info;

use crate::cmd::{install_cancel_handler, peer_label, DemoArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat, SessionReport};

pub fn run(args: DemoArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.connect.client_config();
    let cancel = install_cancel_handler()?;

    let mut session =
        open_with_config(&config).map_err(|err| client_error("connect failed", err))?;
    let endpoint = peer_label(&session, &config.endpoint);
    let attempts = session
        .connect_with_retry(&config.retry, &cancel)
        .map_err(|err| client_error("handshake failed", err))?;
    info!(attempts, %endpoint, "handshake complete");

    session
        .send(args.message.as_str())
        .map_err(|err| client_error("send failed", err))?;
    session
        .close()
        .map_err(|err| client_error("teardown failed", err))?;

    print_report(
        &SessionReport {
            endpoint,
            attempts,
            sent: args.message,
            sent_type: "STRING",
            state: session.state().name(),
        },
        format,
    );
    Ok(SUCCESS)
}
