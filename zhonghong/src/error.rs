//! High-level error types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Type error: {0}")]
    Types(#[from] zhonghong_types::Error),

    #[error("No discovery response from gateway within {seconds}s")]
    DiscoveryTimeout { seconds: u64 },
}
