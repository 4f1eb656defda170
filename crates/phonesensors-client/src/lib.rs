//! Pull-based client for phones streaming JSON sensor readings.
//!
//! Connect to the device, then iterate: every step blocks until the stream
//! delivers at least one complete line (or the read timeout fires) and yields
//! a [`Snapshot`](phonesensors_frame::Snapshot).
//!
//! ```no_run
//! use phonesensors_client::{ClientConfig, SensorClient};
//!
//! let mut client = SensorClient::new(ClientConfig::new("192.168.1.21", 5000));
//! client.connect()?;
//! for batch in &mut client {
//!     println!("{}", batch?);
//! }
//! # Ok::<(), phonesensors_client::ClientError>(())
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod client;
pub mod config;
pub mod error;
pub mod reader;

#[cfg(feature = "async")]
pub use async_client::AsyncSensorClient;
pub use client::SensorClient;
pub use config::{ClientConfig, DEFAULT_READ_SIZE, DEFAULT_TIMEOUT};
pub use error::{ClientError, Result};
pub use reader::BatchReader;
