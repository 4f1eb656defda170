use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use phonesensors_client::{ClientConfig, ClientError, SensorClient};
use tracing::{info, warn};

use crate::cmd::{parse_duration, StreamArgs};
use crate::exit::{client_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};
use crate::output::{print_snapshot, OutputFormat};

pub fn run(args: StreamArgs, format: OutputFormat) -> CliResult<i32> {
    let config = client_config(&args)?;
    let mut client = SensorClient::new(config);
    client
        .connect()
        .map_err(|err| client_error("connect failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let snapshot = match client.next_batch() {
            Ok(snapshot) => snapshot,
            Err(ClientError::Timeout(after)) if args.retry_timeouts => {
                warn!(?after, "no data from device, still waiting");
                continue;
            }
            Err(ClientError::ConnectionClosed) => {
                info!("device closed the stream");
                break;
            }
            Err(err) => return Err(client_error("receive failed", err)),
        };

        printed = printed.saturating_add(1);
        print_snapshot(&snapshot, printed, format);

        if let Some(count) = args.count {
            if printed >= count {
                break;
            }
        }
    }

    client.close();
    Ok(SUCCESS)
}

fn client_config(args: &StreamArgs) -> CliResult<ClientConfig> {
    if args.read_size == 0 {
        return Err(CliError::new(USAGE, "--read-size must be greater than zero"));
    }

    let mut config = ClientConfig::new(&args.host, args.port)
        .with_app(args.app)
        .with_read_size(args.read_size)
        .with_timeout(parse_duration(&args.timeout)?)
        .with_silent_warnings(args.silent_warnings);
    if let Some(timeout) = &args.connect_timeout {
        config = config.with_connect_timeout(parse_duration(timeout)?);
    }
    Ok(config)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
