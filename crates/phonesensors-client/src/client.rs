use std::mem;

use phonesensors_frame::{FrameParser, Snapshot};
use phonesensors_transport::SensorStream;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::reader::BatchReader;

enum Link {
    Idle(Box<dyn FrameParser>),
    Open(BatchReader<SensorStream>),
    /// Only observed while switching between the other two.
    Switching,
}

/// Blocking client for one device.
///
/// The client starts disconnected. [`connect`](Self::connect) opens the
/// socket; [`close`](Self::close) or dropping the client shuts it down.
/// Iterating yields one `Result<Snapshot>` per batch:
///
/// - a timeout yields `Err(ClientError::Timeout)` and iteration continues;
/// - any other error is yielded once, after which iteration ends.
pub struct SensorClient {
    config: ClientConfig,
    link: Link,
    exhausted: bool,
}

impl SensorClient {
    /// Create a client using the parser for `config.app`.
    pub fn new(config: ClientConfig) -> Self {
        let parser = config.app.parser(config.parser);
        Self::with_parser(config, parser)
    }

    /// Create a client that decodes with `parser` instead of the app's parser.
    pub fn with_parser(config: ClientConfig, parser: Box<dyn FrameParser>) -> Self {
        Self {
            config,
            link: Link::Idle(parser),
            exhausted: false,
        }
    }

    /// Create a client and connect it.
    pub fn connect_with(config: ClientConfig) -> Result<Self> {
        let mut client = Self::new(config);
        client.connect()?;
        Ok(client)
    }

    /// Open the connection. Does nothing if already connected.
    ///
    /// Any input buffered from a previous connection is dropped.
    pub fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        let stream = phonesensors_transport::connect(
            &self.config.host,
            self.config.port,
            self.config.connect_timeout,
        )?;
        stream.set_read_timeout(Some(self.config.timeout))?;

        let mut parser = match mem::replace(&mut self.link, Link::Switching) {
            Link::Idle(parser) => parser,
            _ => self.config.app.parser(self.config.parser),
        };
        parser.reset();
        self.link = Link::Open(BatchReader::new(
            stream,
            parser,
            self.config.read_size,
            self.config.timeout,
        ));
        self.exhausted = false;
        Ok(())
    }

    /// Block until the next batch arrives.
    ///
    /// Fails with [`ClientError::Timeout`] if nothing arrives within the
    /// configured timeout; the connection stays open. Any other error closes
    /// the connection.
    pub fn next_batch(&mut self) -> Result<Snapshot> {
        let Link::Open(reader) = &mut self.link else {
            return Err(ClientError::NotConnected);
        };

        match reader.next_batch() {
            Ok(snapshot) => Ok(snapshot),
            Err(err) => {
                if err.is_terminal() {
                    debug!(error = %err, "ending sensor stream");
                    self.close();
                }
                Err(err)
            }
        }
    }

    /// Shut down the connection. Safe to call more than once.
    pub fn close(&mut self) {
        if !self.is_connected() {
            return;
        }
        if let Link::Open(reader) = mem::replace(&mut self.link, Link::Switching) {
            let (stream, parser) = reader.into_parts();
            if let Err(err) = stream.shutdown() {
                debug!(error = %err, "socket shutdown failed");
            }
            info!(peer = %stream.peer_addr(), "disconnected from device");
            self.link = Link::Idle(parser);
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.link, Link::Open(_))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Iterator for SensorClient {
    type Item = Result<Snapshot>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let batch = self.next_batch();
        if matches!(&batch, Err(err) if err.is_terminal()) {
            self.exhausted = true;
        }
        Some(batch)
    }
}

impl Drop for SensorClient {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for SensorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorClient")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("app", &self.config.app)
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use phonesensors_frame::{Reading, SensorKind};

    use super::*;

    const ACCEL: &[u8] =
        b"{\"accelerometer\":{\"value\":[0.1,0.2,9.8],\"timestamp\":1.5}}\n";

    fn listener() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
        let port = listener.local_addr().expect("listener has address").port();
        (listener, port)
    }

    fn config(port: u16) -> ClientConfig {
        ClientConfig::new("127.0.0.1", port)
            .with_timeout(Duration::from_secs(5))
            .with_silent_warnings(true)
    }

    fn accept(listener: &TcpListener) -> TcpStream {
        listener.accept().expect("listener should accept").0
    }

    #[test]
    fn test_stream_yields_every_sample() {
        let (listener, port) = listener();
        let server = thread::spawn(move || {
            let mut conn = accept(&listener);
            for _ in 0..3 {
                conn.write_all(ACCEL).expect("write should succeed");
                conn.flush().expect("flush should succeed");
                thread::sleep(Duration::from_millis(10));
            }
        });

        let mut client = SensorClient::new(config(port));
        client.connect().expect("client should connect");

        let mut merged = Snapshot::empty();
        let mut ended_with = None;
        for batch in &mut client {
            match batch {
                Ok(snapshot) => merged.append(snapshot),
                Err(err) => ended_with = Some(err),
            }
        }
        server.join().expect("server thread should complete");

        let accel = merged.channel(SensorKind::Acceleration);
        assert_eq!(accel.len(), 3);
        assert!(accel
            .values()
            .iter()
            .all(|v| *v == Some(Reading::Vector([0.1, 0.2, 9.8]))));
        assert!(matches!(ended_with, Some(ClientError::ConnectionClosed)));
        assert!(!client.is_connected());
        assert!(client.next().is_none());
    }

    #[test]
    fn test_split_line_is_one_batch() {
        let (listener, port) = listener();
        let server = thread::spawn(move || {
            let mut conn = accept(&listener);
            let (head, tail) = ACCEL.split_at(20);
            conn.write_all(head).expect("write should succeed");
            conn.flush().expect("flush should succeed");
            thread::sleep(Duration::from_millis(50));
            conn.write_all(tail).expect("write should succeed");
        });

        let mut client = SensorClient::connect_with(config(port)).expect("client should connect");
        let snapshot = client.next_batch().expect("batch should arrive");
        server.join().expect("server thread should complete");

        let accel = snapshot.channel(SensorKind::Acceleration);
        assert_eq!(accel.values(), &[Some(Reading::Vector([0.1, 0.2, 9.8]))]);
        assert_eq!(accel.timestamps(), &[Some(1.5)]);
    }

    #[test]
    fn test_peer_close_is_connection_closed() {
        let (listener, port) = listener();
        let server = thread::spawn(move || {
            drop(accept(&listener));
        });

        let mut client = SensorClient::connect_with(config(port)).expect("client should connect");
        server.join().expect("server thread should complete");

        assert!(matches!(client.next_batch(), Err(ClientError::ConnectionClosed)));
        assert!(!client.is_connected());
        assert!(matches!(client.next_batch(), Err(ClientError::NotConnected)));
    }

    #[test]
    fn test_timeout_keeps_connection_open() {
        let (listener, port) = listener();
        let (go_tx, go_rx) = mpsc::channel::<()>();
        let server = thread::spawn(move || {
            let mut conn = accept(&listener);
            go_rx.recv().expect("test should signal");
            conn.write_all(ACCEL).expect("write should succeed");
        });

        let mut client = SensorClient::connect_with(
            config(port).with_timeout(Duration::from_millis(100)),
        )
        .expect("client should connect");

        match client.next() {
            Some(Err(ClientError::Timeout(after))) => {
                assert_eq!(after, Duration::from_millis(100))
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(client.is_connected());

        go_tx.send(()).expect("server should be waiting");
        let snapshot = client
            .next()
            .expect("iteration continues after timeout")
            .expect("batch should arrive");
        assert_eq!(snapshot.channel(SensorKind::Acceleration).len(), 1);

        server.join().expect("server thread should complete");
    }

    #[test]
    fn test_not_connected() {
        let mut client = SensorClient::new(config(1));
        assert!(!client.is_connected());
        assert!(matches!(client.next_batch(), Err(ClientError::NotConnected)));

        assert!(matches!(client.next(), Some(Err(ClientError::NotConnected))));
        assert!(client.next().is_none());
    }

    #[test]
    fn test_close_is_idempotent() {
        let (listener, port) = listener();
        let server = thread::spawn(move || {
            let _conn = accept(&listener);
        });

        let mut client = SensorClient::connect_with(config(port)).expect("client should connect");
        server.join().expect("server thread should complete");

        client.close();
        client.close();
        assert!(!client.is_connected());
    }

    #[test]
    fn test_connect_twice_is_noop() {
        let (listener, port) = listener();
        let server = thread::spawn(move || {
            let mut conn = accept(&listener);
            conn.write_all(ACCEL).expect("write should succeed");
        });

        let mut client = SensorClient::new(config(port));
        client.connect().expect("client should connect");
        client.connect().expect("second connect should be a no-op");

        assert!(client.next_batch().is_ok());
        server.join().expect("server thread should complete");
    }

    #[test]
    fn test_reconnect_after_close() {
        let (listener, port) = listener();
        let server = thread::spawn(move || {
            for _ in 0..2 {
                let mut conn = accept(&listener);
                conn.write_all(ACCEL).expect("write should succeed");
            }
        });

        let mut client = SensorClient::new(config(port));
        for _ in 0..2 {
            client.connect().expect("client should connect");
            assert!(client.next_batch().is_ok());
            client.close();
        }
        server.join().expect("server thread should complete");
    }

    #[test]
    fn test_connect_refused_is_transport_error() {
        let (listener, port) = listener();
        drop(listener);

        let mut client = SensorClient::new(config(port));
        assert!(matches!(client.connect(), Err(ClientError::Transport(_))));
        assert!(!client.is_connected());
    }

    /// Yields an empty snapshot for every chunk and records what it saw.
    struct Recording(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl FrameParser for Recording {
        fn feed(&mut self, chunk: &[u8]) -> Option<Snapshot> {
            self.0.lock().expect("lock").extend_from_slice(chunk);
            Some(Snapshot::empty())
        }

        fn reset(&mut self) {}
    }

    #[test]
    fn test_custom_parser() {
        let (listener, port) = listener();
        let server = thread::spawn(move || {
            let mut conn = accept(&listener);
            conn.write_all(b"raw bytes").expect("write should succeed");
        });

        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut client =
            SensorClient::with_parser(config(port), Box::new(Recording(seen.clone())));
        client.connect().expect("client should connect");

        let mut batches = 0;
        for batch in &mut client {
            match batch {
                Ok(snapshot) => {
                    assert!(snapshot.is_empty());
                    batches += 1;
                }
                Err(err) => assert!(matches!(err, ClientError::ConnectionClosed)),
            }
        }
        server.join().expect("server thread should complete");

        assert!(batches >= 1);
        assert_eq!(seen.lock().expect("lock").as_slice(), b"raw bytes");
    }
}
