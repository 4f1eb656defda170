//! Supported source applications.
//!
//! Each app has its own line format; [`App::parser`] returns the parser for it.
//! Apps not listed here can still be used by handing a custom
//! [`FrameParser`] to the client.

use std::str::FromStr;

use crate::parser::{FrameParser, ParserConfig, SensorStreamerParser};

/// An application that streams sensor readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum App {
    /// SensorStreamer, emitting JSON lines over TCP.
    #[default]
    SensorStreamer,
}

impl App {
    /// Every supported app.
    pub const ALL: [App; 1] = [App::SensorStreamer];

    /// Stable identifier, as accepted by [`FromStr`].
    pub const fn id(self) -> &'static str {
        match self {
            App::SensorStreamer => "sensorstreamer",
        }
    }

    /// Create a fresh parser for this app's format.
    pub fn parser(self, config: ParserConfig) -> Box<dyn FrameParser> {
        match self {
            App::SensorStreamer => Box::new(SensorStreamerParser::with_config(config)),
        }
    }
}

impl std::fmt::Display for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// The application identifier is not in the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown source app: {0}")]
pub struct UnknownAppError(pub String);

impl FromStr for App {
    type Err = UnknownAppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        App::ALL
            .into_iter()
            .find(|app| app.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownAppError(s.to_string()))
    }
}
