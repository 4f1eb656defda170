use std::io::ErrorKind;

use phonesensors_frame::{FrameParser, Snapshot, SnapshotCodec};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::FramedRead;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Tokio counterpart of [`SensorClient`](crate::SensorClient).
///
/// Each [`next_batch`](Self::next_batch) call is bounded by the configured
/// timeout. A timeout leaves the connection open; any other error closes it.
pub struct AsyncSensorClient {
    config: ClientConfig,
    parser: Box<dyn FrameParser>,
    stream: Option<TcpStream>,
    chunk: Vec<u8>,
}

impl AsyncSensorClient {
    pub fn new(config: ClientConfig) -> Self {
        let parser = config.app.parser(config.parser);
        Self::with_parser(config, parser)
    }

    pub fn with_parser(config: ClientConfig, parser: Box<dyn FrameParser>) -> Self {
        let chunk = vec![0u8; config.read_size.max(1)];
        Self {
            config,
            parser,
            stream: None,
            chunk,
        }
    }

    /// Open the connection. Does nothing if already connected.
    pub async fn connect(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }
        let stream = phonesensors_transport::connect_async(
            &self.config.host,
            self.config.port,
            self.config.connect_timeout,
        )
        .await?;
        self.parser.reset();
        self.stream = Some(stream);
        Ok(())
    }

    /// Wait for the next batch.
    pub async fn next_batch(&mut self) -> Result<Snapshot> {
        loop {
            let stream = self.stream.as_mut().ok_or(ClientError::NotConnected)?;
            let attempt =
                tokio::time::timeout(self.config.timeout, stream.read(&mut self.chunk)).await;
            let read = match attempt {
                Err(_) => return Err(ClientError::Timeout(self.config.timeout)),
                Ok(Ok(n)) => n,
                Ok(Err(err)) if err.kind() == ErrorKind::Interrupted => continue,
                Ok(Err(err)) => {
                    self.close().await;
                    return Err(ClientError::Io(err));
                }
            };

            if read == 0 {
                self.close().await;
                return Err(ClientError::ConnectionClosed);
            }

            debug!(bytes = read, "read sensor data");
            if let Some(snapshot) = self.parser.feed(&self.chunk[..read]) {
                return Ok(snapshot);
            }
        }
    }

    /// Shut down the connection. Safe to call more than once.
    pub async fn close(&mut self) {
        let Some(mut stream) = self.stream.take() else {
            return;
        };
        if let Err(err) = stream.shutdown().await {
            debug!(error = %err, "socket shutdown failed");
        }
        info!("disconnected from device");
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Hand the connection over to a [`FramedRead`] yielding snapshots.
    ///
    /// The returned stream has no read timeout and ends when the device
    /// closes the connection.
    pub fn into_framed(self) -> Result<FramedRead<TcpStream, SnapshotCodec>> {
        let stream = self.stream.ok_or(ClientError::NotConnected)?;
        Ok(FramedRead::new(stream, SnapshotCodec::new(self.parser)))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures_util::StreamExt;
    use phonesensors_frame::{Reading, SensorKind};
    use tokio::net::TcpListener;

    use super::*;

    const LIGHT: &[u8] = b"{\"light\":{\"value\":[250.0],\"timestamp\":3.0}}\n";

    async fn listener() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let port = listener.local_addr().expect("listener has address").port();
        (listener, port)
    }

    fn config(port: u16) -> ClientConfig {
        ClientConfig::new("127.0.0.1", port).with_silent_warnings(true)
    }

    #[tokio::test]
    async fn next_batch_reads_lines() {
        let (listener, port) = listener().await;
        let server = tokio::spawn(async move {
            let (mut conn, _) = listener.accept().await.expect("listener should accept");
            conn.write_all(LIGHT).await.expect("write should succeed");
        });

        let mut client = AsyncSensorClient::new(config(port));
        client.connect().await.expect("client should connect");

        let snapshot = client.next_batch().await.expect("batch should arrive");
        assert_eq!(
            snapshot.channel(SensorKind::Light).values(),
            &[Some(Reading::Scalar(250.0))]
        );

        server.await.expect("server task should complete");
        assert!(matches!(
            client.next_batch().await,
            Err(ClientError::ConnectionClosed)
        ));
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn timeout_keeps_connection() {
        let (listener, port) = listener().await;
        let (go_tx, go_rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let (mut conn, _) = listener.accept().await.expect("listener should accept");
            go_rx.await.expect("test should signal");
            conn.write_all(LIGHT).await.expect("write should succeed");
        });

        let mut client =
            AsyncSensorClient::new(config(port).with_timeout(Duration::from_millis(100)));
        client.connect().await.expect("client should connect");

        assert!(matches!(
            client.next_batch().await,
            Err(ClientError::Timeout(_))
        ));
        assert!(client.is_connected());

        go_tx.send(()).expect("server should be waiting");
        assert!(client.next_batch().await.is_ok());
        server.await.expect("server task should complete");
    }

    #[tokio::test]
    async fn not_connected() {
        let mut client = AsyncSensorClient::new(config(1));
        assert!(matches!(
            client.next_batch().await,
            Err(ClientError::NotConnected)
        ));
        client.close().await;
        assert!(client.into_framed().is_err());
    }

    #[tokio::test]
    async fn framed_stream_yields_snapshots() {
        let (listener, port) = listener().await;
        let server = tokio::spawn(async move {
            let (mut conn, _) = listener.accept().await.expect("listener should accept");
            conn.write_all(LIGHT).await.expect("write should succeed");
            conn.write_all(LIGHT).await.expect("write should succeed");
        });

        let mut client = AsyncSensorClient::new(config(port));
        client.connect().await.expect("client should connect");
        let mut framed = client.into_framed().expect("client is connected");

        let mut merged = Snapshot::empty();
        while let Some(batch) = framed.next().await {
            merged.append(batch.expect("batch should decode"));
        }
        server.await.expect("server task should complete");

        assert_eq!(merged.channel(SensorKind::Light).len(), 2);
    }
}
