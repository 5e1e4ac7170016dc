use gramoc_client::open_with_config;
use gramoc_payload::Value;
use tracing::info;

use crate::cmd::{install_cancel_handler, peer_label, SendArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_readout, print_report, OutputFormat, SessionReport};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let value = resolve_value(&args)?;
    let config = args.connect.client_config();
    let cancel = install_cancel_handler()?;

    let mut session =
        open_with_config(&config).map_err(|err| client_error("connect failed", err))?;
    let endpoint = peer_label(&session, &config.endpoint);
    let attempts = session
        .connect_with_retry(&config.retry, &cancel)
        .map_err(|err| client_error("handshake failed", err))?;

    session
        .send_on(value.clone(), args.channel.into())
        .map_err(|err| client_error("send failed", err))?;
    info!(data_type = %value.data_type(), "value sent");

    if args.start {
        session
            .start_data()
            .map_err(|err| client_error("start data failed", err))?;
    }

    let reply = if args.wait {
        Some(
            session
                .recv()
                .map_err(|err| client_error("receive failed", err))?,
        )
    } else {
        None
    };

    session
        .close()
        .map_err(|err| client_error("teardown failed", err))?;

    match reply {
        Some(readout) => print_readout(&readout, format),
        None => print_report(
            &SessionReport {
                endpoint,
                attempts,
                sent: value.to_string(),
                sent_type: value.data_type().name(),
                state: session.state().name(),
            },
            format,
        ),
    }
    Ok(SUCCESS)
}

fn resolve_value(args: &SendArgs) -> CliResult<Value> {
    if let Some(text) = &args.text {
        return Ok(Value::from(text.as_str()));
    }
    if let Some(int) = args.int {
        return Ok(Value::Int(int));
    }
    if let Some(float) = args.float {
        return Ok(Value::Float(float));
    }
    if let Some(ints) = &args.ints {
        return Ok(Value::ListInt(ints.clone()));
    }
    if let Some(floats) = &args.floats {
        return Ok(Value::ListFloat(floats.clone()));
    }
    Err(CliError::new(
        USAGE,
        "one of --text, --int, --float, --ints or --floats is required",
    ))
}
