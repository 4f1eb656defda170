use std::io::{ErrorKind, Read};
use std::time::Duration;

use phonesensors_frame::{FrameParser, Snapshot};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Reads snapshots from any `Read` stream.
///
/// Keeps reading until the parser completes at least one line, so callers
/// never see the parser's "no data yet" state.
pub struct BatchReader<R> {
    inner: R,
    parser: Box<dyn FrameParser>,
    chunk: Vec<u8>,
    timeout: Duration,
}

impl<R: Read> BatchReader<R> {
    /// Create a reader requesting up to `read_size` bytes per read.
    ///
    /// `timeout` is the read timeout configured on `inner`; it is only used
    /// to report [`ClientError::Timeout`].
    pub fn new(inner: R, parser: Box<dyn FrameParser>, read_size: usize, timeout: Duration) -> Self {
        Self {
            inner,
            parser,
            chunk: vec![0u8; read_size.max(1)],
            timeout,
        }
    }

    /// Read the next snapshot (blocking).
    ///
    /// Returns `Err(ClientError::ConnectionClosed)` when EOF is reached and
    /// `Err(ClientError::Timeout)` when the stream's read timeout fires.
    pub fn next_batch(&mut self) -> Result<Snapshot> {
        loop {
            let read = match self.inner.read(&mut self.chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Err(ClientError::Timeout(self.timeout));
                }
                Err(err) => return Err(ClientError::Io(err)),
            };

            if read == 0 {
                return Err(ClientError::ConnectionClosed);
            }

            debug!(bytes = read, "read sensor data");
            if let Some(snapshot) = self.parser.feed(&self.chunk[..read]) {
                return Ok(snapshot);
            }
        }
    }

    /// Bytes requested per read.
    pub fn read_size(&self) -> usize {
        self.chunk.len()
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the reader and return the stream and parser.
    pub fn into_parts(self) -> (R, Box<dyn FrameParser>) {
        (self.inner, self.parser)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::{self, Cursor};

    use phonesensors_frame::{ParserConfig, Reading, SensorKind, SensorStreamerParser};

    use super::*;

    fn parser() -> Box<dyn FrameParser> {
        Box::new(SensorStreamerParser::with_config(ParserConfig {
            silent_warnings: true,
            ..ParserConfig::default()
        }))
    }

    /// Replays a scripted sequence of read results.
    struct Scripted(VecDeque<io::Result<Vec<u8>>>);

    impl Scripted {
        fn new(steps: impl IntoIterator<Item = io::Result<Vec<u8>>>) -> Self {
            Self(steps.into_iter().collect())
        }
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                None => Ok(0),
                Some(Err(err)) => Err(err),
                Some(Ok(bytes)) => {
                    assert!(bytes.len() <= buf.len(), "scripted chunk exceeds read size");
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
            }
        }
    }

    #[test]
    fn read_single_batch() {
        let wire = b"{\"light\":{\"value\":[12.5],\"timestamp\":1.0}}\n".to_vec();
        let mut reader = BatchReader::new(Cursor::new(wire), parser(), 4096, Duration::from_secs(5));

        let snapshot = reader.next_batch().unwrap();
        let light = snapshot.channel(SensorKind::Light);
        assert_eq!(light.values(), &[Some(Reading::Scalar(12.5))]);
        assert_eq!(light.timestamps(), &[Some(1.0)]);

        assert!(matches!(reader.next_batch(), Err(ClientError::ConnectionClosed)));
    }

    #[test]
    fn keeps_reading_until_a_line_completes() {
        let wire = b"{\"pressure\":{\"value\":[1013.25]}}\n".to_vec();
        // Three bytes per read: the first reads complete no line.
        let mut reader = BatchReader::new(Cursor::new(wire), parser(), 3, Duration::from_secs(5));

        let snapshot = reader.next_batch().unwrap();
        assert_eq!(
            snapshot.channel(SensorKind::Pressure).values(),
            &[Some(Reading::Scalar(1013.25))]
        );
    }

    #[test]
    fn eof_with_partial_line_is_connection_closed() {
        let wire = b"{\"light\":{\"value\":[1".to_vec();
        let mut reader = BatchReader::new(Cursor::new(wire), parser(), 4096, Duration::from_secs(5));

        assert!(matches!(reader.next_batch(), Err(ClientError::ConnectionClosed)));
    }

    #[test]
    fn malformed_lines_still_yield_a_batch() {
        let wire = b"not json\n".to_vec();
        let mut reader = BatchReader::new(Cursor::new(wire), parser(), 4096, Duration::from_secs(5));

        let snapshot = reader.next_batch().unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn would_block_maps_to_timeout() {
        let timeout = Duration::from_millis(250);
        let stream = Scripted::new([Err(io::Error::from(ErrorKind::WouldBlock))]);
        let mut reader = BatchReader::new(stream, parser(), 64, timeout);

        match reader.next_batch() {
            Err(ClientError::Timeout(reported)) => assert_eq!(reported, timeout),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn timed_out_maps_to_timeout() {
        let stream = Scripted::new([Err(io::Error::from(ErrorKind::TimedOut))]);
        let mut reader = BatchReader::new(stream, parser(), 64, Duration::from_secs(1));

        assert!(matches!(reader.next_batch(), Err(ClientError::Timeout(_))));
    }

    #[test]
    fn timeout_keeps_buffered_prefix() {
        let stream = Scripted::new([
            Ok(b"{\"light\":{\"val".to_vec()),
            Err(io::Error::from(ErrorKind::WouldBlock)),
            Ok(b"ue\":[3.0]}}\n".to_vec()),
        ]);
        let mut reader = BatchReader::new(stream, parser(), 64, Duration::from_secs(1));

        assert!(matches!(reader.next_batch(), Err(ClientError::Timeout(_))));
        let snapshot = reader.next_batch().unwrap();
        assert_eq!(
            snapshot.channel(SensorKind::Light).values(),
            &[Some(Reading::Scalar(3.0))]
        );
    }

    #[test]
    fn interrupted_read_is_retried() {
        let stream = Scripted::new([
            Err(io::Error::from(ErrorKind::Interrupted)),
            Ok(b"{\"light\":{\"value\":[1.0]}}\n".to_vec()),
        ]);
        let mut reader = BatchReader::new(stream, parser(), 64, Duration::from_secs(1));

        assert!(reader.next_batch().is_ok());
    }

    #[test]
    fn other_errors_surface_as_io() {
        let stream = Scripted::new([Err(io::Error::from(ErrorKind::ConnectionReset))]);
        let mut reader = BatchReader::new(stream, parser(), 64, Duration::from_secs(1));

        match reader.next_batch() {
            Err(ClientError::Io(err)) => assert_eq!(err.kind(), ErrorKind::ConnectionReset),
            other => panic!("expected I/O error, got {other:?}"),
        }
    }

    /// Records the level of every event.
    struct Levels(std::sync::Arc<std::sync::Mutex<Vec<tracing::Level>>>);

    impl tracing::Subscriber for Levels {
        fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            tracing::span::Id::from_u64(1)
        }

        fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}

        fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}

        fn event(&self, event: &tracing::Event<'_>) {
            self.0.lock().expect("lock").push(*event.metadata().level());
        }

        fn enter(&self, _: &tracing::span::Id) {}

        fn exit(&self, _: &tracing::span::Id) {}
    }

    #[test]
    fn reads_are_logged_at_debug() {
        let levels = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let wire = b"{\"light\":{\"value\":[1.0]}}\n".to_vec();

        tracing::subscriber::with_default(Levels(levels.clone()), || {
            let mut reader =
                BatchReader::new(Cursor::new(wire), parser(), 4096, Duration::from_secs(1));
            reader.next_batch().expect("batch should arrive");
        });

        let levels = levels.lock().expect("lock");
        assert!(levels.contains(&tracing::Level::DEBUG));
        assert!(!levels.contains(&tracing::Level::TRACE));
    }

    #[test]
    fn zero_read_size_is_clamped() {
        let reader = BatchReader::new(Cursor::new(Vec::new()), parser(), 0, Duration::from_secs(1));
        assert_eq!(reader.read_size(), 1);
    }
}
