//! Error types for VGM parsing and export.

/// Error type for replayer operations.
///
/// Chip emulation itself is infallible; errors only arise while parsing a
/// VGM stream or writing audio out.
#[derive(thiserror::Error, Debug)]
pub enum ReplayerError {
    /// Error while validating the VGM header or stream.
    #[error("Parse error: {0}")]
    Parse(String),

    /// IO error from the filesystem.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl From<String> for ReplayerError {
    fn from(msg: String) -> Self {
        ReplayerError::Other(msg)
    }
}

impl From<&str> for ReplayerError {
    fn from(msg: &str) -> Self {
        ReplayerError::Other(msg.to_string())
    }
}

/// Result type for replayer operations.
pub type Result<T> = std::result::Result<T, ReplayerError>;
