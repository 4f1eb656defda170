/// Errors that can occur while decoding a single line of the stream.
///
/// None of the per-line errors abort a batch: the parser logs them and drops
/// the line. `Io` only comes from the async codec's underlying reader.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The line is not valid UTF-8.
    #[error("line is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The line is not valid JSON.
    #[error("line failed JSON parsing: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The line is valid JSON but not an object.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// The line is empty or whitespace only.
    #[error("empty line")]
    EmptyLine,

    /// The line grew past the configured maximum before a terminator arrived.
    #[error("line too long ({size} bytes, max {max})")]
    LineTooLong { size: usize, max: usize },

    /// An I/O error surfaced through the async codec.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
