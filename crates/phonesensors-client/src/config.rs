use std::time::Duration;

use phonesensors_frame::{App, ParserConfig};

/// Default number of bytes requested per socket read.
pub const DEFAULT_READ_SIZE: usize = 4096;

/// Default time without data before a read fails with a timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection and read settings for a [`SensorClient`](crate::SensorClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Device host name or IP address.
    pub host: String,
    /// Device port.
    pub port: u16,
    /// Which app is streaming. Selects the parser unless one is supplied.
    pub app: App,
    /// Bytes requested per socket read.
    pub read_size: usize,
    /// Time without data before a read fails. Must be non-zero.
    pub timeout: Duration,
    /// Bound on each connect attempt. `None` uses the OS default.
    pub connect_timeout: Option<Duration>,
    /// Settings for the parser created from `app`.
    pub parser: ParserConfig,
}

impl ClientConfig {
    /// Defaults for the device at `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            app: App::default(),
            read_size: DEFAULT_READ_SIZE,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: None,
            parser: ParserConfig::default(),
        }
    }

    pub fn with_app(mut self, app: App) -> Self {
        self.app = app;
        self
    }

    pub fn with_read_size(mut self, read_size: usize) -> Self {
        self.read_size = read_size;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Silence malformed-line warnings.
    pub fn with_silent_warnings(mut self, silent: bool) -> Self {
        self.parser.silent_warnings = silent;
        self
    }

    pub fn with_parser_config(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }
}
