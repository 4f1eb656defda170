use std::fs;

use phonesensors_frame::{ParserConfig, Snapshot};
use tracing::{debug, warn};

use crate::cmd::ReplayArgs;
use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_snapshot, OutputFormat};

pub fn run(args: ReplayArgs, format: OutputFormat) -> CliResult<i32> {
    if args.chunk_size == 0 {
        return Err(CliError::new(USAGE, "--chunk-size must be greater than zero"));
    }

    let data = fs::read(&args.file)
        .map_err(|err| io_error(&format!("failed reading {}", args.file.display()), err))?;

    let snapshots = replay(&data, &args);
    if snapshots.is_empty() {
        return Err(CliError::new(
            DATA_INVALID,
            format!("{} holds no complete line", args.file.display()),
        ));
    }

    if args.merge {
        let mut merged = Snapshot::empty();
        for snapshot in snapshots {
            merged.append(snapshot);
        }
        print_snapshot(&merged, 1, format);
    } else {
        for (i, snapshot) in snapshots.iter().enumerate() {
            print_snapshot(snapshot, i + 1, format);
        }
    }

    Ok(SUCCESS)
}

/// Feed `data` to a fresh parser `chunk_size` bytes at a time.
fn replay(data: &[u8], args: &ReplayArgs) -> Vec<Snapshot> {
    let mut parser = args.app.parser(ParserConfig {
        silent_warnings: args.silent_warnings,
        ..ParserConfig::default()
    });

    let snapshots: Vec<Snapshot> = data
        .chunks(args.chunk_size)
        .filter_map(|chunk| parser.feed(chunk))
        .collect();

    if !data.is_empty() && !data.ends_with(b"\n") {
        warn!("capture ends with an unterminated line, ignoring it");
    }
    debug!(
        bytes = data.len(),
        batches = snapshots.len(),
        "replayed capture"
    );
    snapshots
}
