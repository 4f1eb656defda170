use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::SensorStream;

/// Resolve `(host, port)` to the list of candidate socket addresses.
pub fn resolve(host: &str, port: u16) -> Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| TransportError::Resolve {
            addr: display_addr(host, port),
            source,
        })?
        .collect();

    if addrs.is_empty() {
        return Err(TransportError::NoAddress(display_addr(host, port)));
    }
    Ok(addrs)
}

/// Connect to a streaming device (blocking).
///
/// Every resolved address is tried in order; the error of the last attempt is
/// returned if none accepts. With `connect_timeout` set, each attempt is bounded
/// by it.
pub fn connect(host: &str, port: u16, connect_timeout: Option<Duration>) -> Result<SensorStream> {
    let addrs = resolve(host, port)?;

    let mut last_err = None;
    for addr in addrs {
        let attempt = match connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(stream) => {
                info!(%addr, "connected to sensor stream");
                return Ok(SensorStream::from_tcp(stream, addr));
            }
            Err(err) => {
                debug!(%addr, error = %err, "connect attempt failed");
                last_err = Some(err);
            }
        }
    }

    Err(TransportError::Connect {
        addr: display_addr(host, port),
        source: last_err.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no address attempted")
        }),
    })
}

/// Connect to a streaming device on the tokio runtime.
#[cfg(feature = "async")]
pub async fn connect_async(
    host: &str,
    port: u16,
    connect_timeout: Option<Duration>,
) -> Result<tokio::net::TcpStream> {
    let addr = display_addr(host, port);
    let attempt = tokio::net::TcpStream::connect((host, port));
    let stream = match connect_timeout {
        Some(timeout) => tokio::time::timeout(timeout, attempt)
            .await
            .map_err(|_| TransportError::Connect {
                addr: addr.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("connect timed out after {timeout:?}"),
                ),
            })?,
        None => attempt.await,
    }
    .map_err(|source| TransportError::Connect {
        addr: addr.clone(),
        source,
    })?;

    info!(%addr, "connected to sensor stream");
    Ok(stream)
}

fn display_addr(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}
