use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::channel::{Reading, VECTOR_DIMS};
use crate::error::{FrameError, Result};
use crate::lines::{LineBuffer, DEFAULT_MAX_LINE_LEN};
use crate::sensor::SensorKind;
use crate::snapshot::Snapshot;

/// Field holding a sample's value.
const VALUE_FIELD: &str = "value";
/// Field holding a sample's timestamp.
const TIMESTAMP_FIELD: &str = "timestamp";

/// Wire field name for every sensor kind, as sent by SensorStreamer.
const SENSORSTREAMER_FIELDS: [(SensorKind, &str); SensorKind::COUNT] = [
    (SensorKind::Acceleration, "accelerometer"),
    (SensorKind::GravAcceleration, "gravity"),
    (SensorKind::LinAcceleration, "linearAcceleration"),
    (SensorKind::MagneticField, "magneticField"),
    (SensorKind::RotVelocity, "gyroscope"),
    (SensorKind::RotationVector, "rotationVector"),
    (SensorKind::Light, "light"),
    (SensorKind::AmbientTemperature, "ambientTemperature"),
    (SensorKind::Pressure, "pressure"),
    (SensorKind::Proximity, "proximity"),
    (SensorKind::RelativeHumidity, "relativeHumidity"),
];

/// Incremental decoder from raw stream bytes to snapshots.
///
/// Implementations own their buffering state. The client only depends on this
/// trait, so a parser for another app can be dropped in without touching it.
pub trait FrameParser: Send {
    /// Feed the next chunk of the stream.
    ///
    /// Returns `None` when the chunk completed no line ("no data yet"), and a
    /// snapshot otherwise, even if every completed line was unusable.
    fn feed(&mut self, chunk: &[u8]) -> Option<Snapshot>;

    /// Feed a chunk of text.
    fn feed_str(&mut self, chunk: &str) -> Option<Snapshot> {
        self.feed(chunk.as_bytes())
    }

    /// Drop any buffered, unterminated input.
    fn reset(&mut self);
}

impl<P: FrameParser + ?Sized> FrameParser for Box<P> {
    fn feed(&mut self, chunk: &[u8]) -> Option<Snapshot> {
        (**self).feed(chunk)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Controls parser behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// When true, malformed lines are dropped without a warning.
    pub silent_warnings: bool,
    /// Maximum bytes in a single line. Longer lines are dropped.
    pub max_line_len: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            silent_warnings: false,
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

/// Parser for the JSON lines emitted by the SensorStreamer app.
///
/// Each line is one tick: an object with one optional field per sensor, each
/// of the form `{"value": number | [x, y, z], "timestamp": number}`.
#[derive(Debug)]
pub struct SensorStreamerParser {
    lines: LineBuffer,
    config: ParserConfig,
    fields: &'static [(SensorKind, &'static str)],
}

impl SensorStreamerParser {
    /// Create a parser with default configuration.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Create a parser with explicit configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            lines: LineBuffer::with_max_line_len(config.max_line_len),
            config,
            fields: &SENSORSTREAMER_FIELDS,
        }
    }

    /// Current parser configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Number of buffered bytes waiting for a terminator.
    pub fn pending_len(&self) -> usize {
        self.lines.pending_len()
    }

    /// Build a compacted snapshot from decoded entries, one row per entry.
    pub fn build_snapshot(&self, entries: &[Map<String, Value>]) -> Snapshot {
        let mut snapshot = Snapshot::new(entries.len());
        for (row, entry) in entries.iter().enumerate() {
            for &(kind, field) in self.fields {
                let (value, timestamp) = parse_sample(kind, entry.get(field));
                snapshot.channel_mut(kind).set(value, timestamp, row);
            }
        }
        snapshot.compact();
        snapshot
    }

    fn report(&self, err: &FrameError) {
        if !self.config.silent_warnings {
            warn!(error = %err, "frame failed parsing");
        }
    }
}

impl Default for SensorStreamerParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser for SensorStreamerParser {
    fn feed(&mut self, chunk: &[u8]) -> Option<Snapshot> {
        let lines = self.lines.push(chunk);
        if lines.is_empty() {
            return None;
        }

        let mut entries = Vec::with_capacity(lines.len());
        for line in lines {
            match line.and_then(|line| decode_line(&line)) {
                Ok(entry) => entries.push(entry),
                Err(err) => self.report(&err),
            }
        }
        Some(self.build_snapshot(&entries))
    }

    fn reset(&mut self) {
        self.lines.clear();
    }
}

/// Decode one line (terminator stripped) into a JSON object.
pub fn decode_line(line: &[u8]) -> Result<Map<String, Value>> {
    let text = std::str::from_utf8(line)?;
    if text.trim().is_empty() {
        return Err(FrameError::EmptyLine);
    }

    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        other => Err(FrameError::NotAnObject(json_type_name(&other))),
    }
}

/// Extract `(value, timestamp)` for one sensor field of one entry.
///
/// An absent field, or one whose value cannot be read as a sample of the
/// kind's width, is unset.
pub(crate) fn parse_sample(
    kind: SensorKind,
    sample: Option<&Value>,
) -> (Option<Reading>, Option<f64>) {
    let Some(sample) = sample else {
        return (None, None);
    };

    let value = sample
        .get(VALUE_FIELD)
        .and_then(|value| reading_from_json(kind, value));
    if value.is_none() {
        debug!(%kind, "dropping sample without a usable value");
        return (None, None);
    }

    let timestamp = sample.get(TIMESTAMP_FIELD).and_then(Value::as_f64);
    (value, timestamp)
}

fn reading_from_json(kind: SensorKind, value: &Value) -> Option<Reading> {
    if kind.is_vector() {
        let items = value.as_array()?;
        if items.len() != VECTOR_DIMS {
            return None;
        }
        let mut columns = [0.0; VECTOR_DIMS];
        for (column, item) in columns.iter_mut().zip(items) {
            *column = item.as_f64()?;
        }
        return Some(Reading::Vector(columns));
    }

    match value {
        Value::Number(n) => n.as_f64().map(Reading::Scalar),
        Value::Array(items) if items.len() == 1 => items[0].as_f64().map(Reading::Scalar),
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
