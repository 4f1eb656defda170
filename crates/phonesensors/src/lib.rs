//! Stream sensor readings from a phone over TCP.
//!
//! Apps such as SensorStreamer push one JSON object per line over a socket.
//! phonesensors connects to the device, reassembles lines across reads, and
//! turns each batch into a [`frame::Snapshot`] with one columnar channel per
//! sensor kind.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP connection setup and the blocking socket wrapper
//! - [`frame`]: line reassembly, parsers, channels and snapshots
//! - [`client`]: the pull-based stream client (behind `client` feature)

/// Re-export transport types.
pub mod transport {
    pub use phonesensors_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use phonesensors_frame::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use phonesensors_client::*;
}
