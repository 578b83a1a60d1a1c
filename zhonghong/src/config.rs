//! Hub configuration

use std::time::Duration;

use zhonghong_core::constants::{
    DEFAULT_DISCOVER_TIMEOUT, DEFAULT_GATEWAY_ADDRESS, DEFAULT_RECONNECT_DELAY,
    DEFAULT_SOCKET_TIMEOUT,
};
use zhonghong_core::DEFAULT_PORT;
use zhonghong_transport::TcpTransport;

/// Connection settings for one gateway
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use zhonghong::HubConfig;
///
/// let config = HubConfig::new("192.168.1.50")
///     .with_gateway_address(2)
///     .with_discover_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.port, 9999);
/// assert_eq!(config.gateway_address, 2);
/// ```
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Gateway host name or IP
    pub host: String,

    pub port: u16,

    /// Bus address of the gateway, first byte of every command
    pub gateway_address: u8,

    /// Read timeout; an idle link triggers a keepalive query after it
    pub socket_timeout: Duration,

    pub connect_timeout: Duration,

    pub write_timeout: Duration,

    /// How long discovery waits for the full-query response
    pub discover_timeout: Duration,

    /// Wait between connection attempts while disconnected
    pub reconnect_delay: Duration,
}

impl HubConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            gateway_address: DEFAULT_GATEWAY_ADDRESS,
            socket_timeout: Duration::from_secs(DEFAULT_SOCKET_TIMEOUT),
            connect_timeout: Duration::from_secs(DEFAULT_SOCKET_TIMEOUT),
            write_timeout: Duration::from_secs(DEFAULT_SOCKET_TIMEOUT),
            discover_timeout: Duration::from_secs(DEFAULT_DISCOVER_TIMEOUT),
            reconnect_delay: Duration::from_secs(DEFAULT_RECONNECT_DELAY),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_gateway_address(mut self, gateway_address: u8) -> Self {
        self.gateway_address = gateway_address;
        self
    }

    pub fn with_socket_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn with_discover_timeout(mut self, timeout: Duration) -> Self {
        self.discover_timeout = timeout;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Build the TCP transport described by this config
    pub fn transport(&self) -> TcpTransport {
        TcpTransport::new(self.host.clone(), self.port)
            .with_connect_timeout(self.connect_timeout)
            .with_write_timeout(self.write_timeout)
    }
}
