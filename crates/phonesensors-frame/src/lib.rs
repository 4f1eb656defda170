//! Incremental newline-delimited JSON parsing into columnar sensor channels.
//!
//! This is the core of phonesensors. Raw socket bytes go in, one
//! [`Snapshot`] per batch of complete lines comes out:
//! - [`LineBuffer`] carries unterminated input across reads
//! - [`FrameParser`] decodes each complete line and builds the batch
//! - [`Snapshot`] holds one compacted [`SensorChannel`] per [`SensorKind`]
//!
//! Partial reads, split UTF-8 sequences and malformed lines are handled here;
//! callers only ever see finished snapshots.

pub mod apps;
pub mod channel;
#[cfg(feature = "async")]
pub mod codec;
pub mod error;
pub mod lines;
pub mod parser;
pub mod sensor;
pub mod snapshot;

pub use apps::{App, UnknownAppError};
pub use channel::{Reading, SensorChannel, VECTOR_DIMS};
#[cfg(feature = "async")]
pub use codec::SnapshotCodec;
pub use error::{FrameError, Result};
pub use lines::{LineBuffer, DEFAULT_MAX_LINE_LEN};
pub use parser::{decode_line, FrameParser, ParserConfig, SensorStreamerParser};
pub use sensor::SensorKind;
pub use snapshot::Snapshot;
