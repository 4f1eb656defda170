use std::time::Duration;

/// Errors that can occur while streaming from a device.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error (resolve, connect, socket options).
    #[error("transport error: {0}")]
    Transport(#[from] phonesensors_transport::TransportError),

    /// No data arrived within the read timeout. The connection stays open.
    #[error("socket timed out, no data after {0:?}")]
    Timeout(Duration),

    /// The device closed the connection.
    #[error("device closed connection")]
    ConnectionClosed,

    /// The client has no open connection.
    #[error("client is not connected")]
    NotConnected,

    /// An I/O error occurred while reading.
    #[error("client I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Returns true if no further reads should be attempted on this connection.
    ///
    /// Only a timeout leaves the connection usable.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ClientError::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
