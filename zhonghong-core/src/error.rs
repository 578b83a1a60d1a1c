//! Error types for zhonghong-core

/// Result type alias for zhonghong operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Frame is too short to be valid
    #[error("Frame too short: expected at least {expected} bytes, got {actual} bytes")]
    FrameTooShort { expected: usize, actual: usize },

    /// Checksum verification failed
    #[error("Checksum mismatch: expected 0x{expected:02X}, received 0x{received:02X}")]
    ChecksumMismatch { expected: u8, received: u8 },

    /// Unknown command code
    #[error("Unknown command code: 0x{0:02X}")]
    UnknownCommand(u8),

    /// Status frame could not be interpreted
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),
}

impl Error {
    /// Check if the error came from bytes received off the wire
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedFrame(_)
                | Self::FrameTooShort { .. }
                | Self::ChecksumMismatch { .. }
                | Self::UnknownCommand(_)
        )
    }
}
