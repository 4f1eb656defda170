/// Errors that can occur while establishing or using a device connection.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The device address could not be resolved.
    #[error("failed to resolve {addr}: {source}")]
    Resolve {
        addr: String,
        source: std::io::Error,
    },

    /// The device address resolved to nothing.
    #[error("no socket address found for {0}")]
    NoAddress(String),

    /// Failed to connect to the device.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    /// An I/O error occurred on the connected stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// The underlying I/O error kind, when there is one.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            TransportError::Resolve { source, .. } | TransportError::Connect { source, .. } => {
                Some(source.kind())
            }
            TransportError::Io(err) => Some(err.kind()),
            TransportError::NoAddress(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
