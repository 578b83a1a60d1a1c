//! Transport layer for the ZhongHong protocol
//!
//! Provides TCP communication with gateways.

pub mod tcp;
pub mod error;

pub use error::{Error, Result};
pub use tcp::TcpTransport;

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;

/// Transport trait for gateway connections
///
/// Methods take `&self` so that a background reader and foreground writers
/// can share one transport; implementations guard the socket internally.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to gateway, closing any existing connection first
    async fn connect(&self) -> Result<()>;

    /// Disconnect from gateway (no-op when not connected)
    async fn disconnect(&self) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Send raw bytes
    async fn send(&self, data: &[u8]) -> Result<()>;

    /// Receive raw bytes (with timeout)
    async fn receive(&self, timeout: Duration) -> Result<BytesMut>;

    /// Get remote address
    fn remote_addr(&self) -> String;
}
