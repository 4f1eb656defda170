use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use phonesensors_client::DEFAULT_READ_SIZE;
use phonesensors_frame::App;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod replay;
pub mod stream;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to a device and print each batch of readings.
    Stream(StreamArgs),
    /// Parse a captured stream from a file.
    Replay(ReplayArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Stream(args) => stream::run(args, format),
        Command::Replay(args) => replay::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Device host name or IP address.
    pub host: String,
    /// Device port.
    pub port: u16,
    /// App streaming from the device.
    #[arg(long, default_value = "sensorstreamer")]
    pub app: App,
    /// Bytes requested per socket read.
    #[arg(long, default_value_t = DEFAULT_READ_SIZE)]
    pub read_size: usize,
    /// Time without data before giving up (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
    /// Bound on establishing the connection (e.g. 5s, 500ms).
    #[arg(long)]
    pub connect_timeout: Option<String>,
    /// Exit after printing N batches.
    #[arg(long)]
    pub count: Option<usize>,
    /// Do not log malformed lines.
    #[arg(long)]
    pub silent_warnings: bool,
    /// Keep waiting after a timeout instead of exiting.
    #[arg(long)]
    pub retry_timeouts: bool,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// File holding newline-delimited JSON captured from a device.
    pub file: PathBuf,
    /// App that produced the capture.
    #[arg(long, default_value = "sensorstreamer")]
    pub app: App,
    /// Bytes fed to the parser per step.
    #[arg(long, default_value_t = DEFAULT_READ_SIZE)]
    pub chunk_size: usize,
    /// Print one merged snapshot instead of one per chunk.
    #[arg(long)]
    pub merge: bool,
    /// Do not log malformed lines.
    #[arg(long)]
    pub silent_warnings: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
