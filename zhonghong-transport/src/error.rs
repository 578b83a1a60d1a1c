//! Transport errors

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not connected")]
    NotConnected,

    #[error("Connection timeout")]
    ConnectionTimeout,

    #[error("Read timeout")]
    ReadTimeout,

    #[error("Write timeout")]
    WriteTimeout,

    #[error("Connection reset by peer")]
    ConnectionReset,

    #[error("Connection closed by remote")]
    ConnectionClosed,

    #[error("Broken pipe")]
    BrokenPipe,

    #[error("I/O error: {0}")]
    Io(io::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl Error {
    /// Check if the connection must be re-established before it can be used again
    pub fn requires_reconnect(&self) -> bool {
        matches!(
            self,
            Self::ConnectionReset | Self::ConnectionClosed | Self::BrokenPipe
        )
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => {
                Self::ConnectionReset
            }
            io::ErrorKind::BrokenPipe => Self::BrokenPipe,
            io::ErrorKind::NotConnected => Self::NotConnected,
            _ => Self::Io(err),
        }
    }
}
