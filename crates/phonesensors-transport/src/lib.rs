//! TCP transport for phone sensor streams.
//!
//! This is the lowest layer of phonesensors: it resolves the device address,
//! opens the connection and hands back a [`SensorStream`] that the upper
//! layers read from. No framing happens here.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::SensorStream;
pub use tcp::{connect, resolve};

#[cfg(feature = "async")]
pub use tcp::connect_async;
