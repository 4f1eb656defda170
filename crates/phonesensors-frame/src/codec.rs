use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::error::FrameError;
use crate::parser::FrameParser;
use crate::snapshot::Snapshot;

/// Tokio codec turning a byte stream into snapshots.
///
/// Wraps any [`FrameParser`], so `FramedRead::new(stream, codec)` yields one
/// snapshot per read that completed at least one line. End of stream simply
/// ends the `FramedRead`; an unterminated tail is discarded.
pub struct SnapshotCodec {
    parser: Box<dyn FrameParser>,
}

impl SnapshotCodec {
    /// Wrap a parser.
    pub fn new(parser: Box<dyn FrameParser>) -> Self {
        Self { parser }
    }

    /// Unwrap the parser.
    pub fn into_inner(self) -> Box<dyn FrameParser> {
        self.parser
    }
}

impl Decoder for SnapshotCodec {
    type Item = Snapshot;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Snapshot>, FrameError> {
        if src.is_empty() {
            return Ok(None);
        }
        let chunk = src.split();
        Ok(self.parser.feed(&chunk))
    }
}
