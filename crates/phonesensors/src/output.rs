use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use phonesensors_frame::{SensorChannel, Snapshot};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
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
struct SnapshotOutput<'a> {
    batch: usize,
    samples: usize,
    sources: Vec<&'static str>,
    channels: &'a Snapshot,
}

pub fn print_snapshot(snapshot: &Snapshot, batch: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = SnapshotOutput {
                batch,
                samples: snapshot.total_samples(),
                sources: snapshot
                    .sources()
                    .map(|channel| channel.source().name())
                    .collect(),
                channels: snapshot,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            println!("{}", snapshot_table(snapshot, batch));
        }
        OutputFormat::Pretty => {
            println!("batch {batch}: {snapshot}");
        }
    }
}

fn snapshot_table(snapshot: &Snapshot, batch: usize) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["BATCH", "SENSOR", "SAMPLES", "TIMESTAMPS", "LATEST", "LATEST TS"]);

    for channel in snapshot.sources() {
        let (latest, latest_ts) = latest(channel);
        table.add_row(vec![
            batch.to_string(),
            channel.source().name().to_string(),
            channel.len().to_string(),
            if channel.has_timestamps() { "yes" } else { "no" }.to_string(),
            latest,
            latest_ts,
        ]);
    }
    if snapshot.is_empty() {
        table.add_row(vec![
            batch.to_string(),
            "-".to_string(),
            "0".to_string(),
            "-".to_string(),
            "-".to_string(),
            "-".to_string(),
        ]);
    }
    table
}

/// Most recent row carrying a value, as display strings.
fn latest(channel: &SensorChannel) -> (String, String) {
    channel
        .values()
        .iter()
        .zip(channel.timestamps())
        .rev()
        .find_map(|(value, ts)| value.map(|v| (v, *ts)))
        .map(|(value, ts)| {
            (
                value.to_string(),
                ts.map_or_else(|| "-".to_string(), |ts| ts.to_string()),
            )
        })
        .unwrap_or_else(|| ("-".to_string(), "-".to_string()))
}
