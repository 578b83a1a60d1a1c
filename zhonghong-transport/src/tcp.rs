//! TCP transport

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use zhonghong_core::{DEFAULT_PORT, RECV_BUFFER_SIZE, constants::DEFAULT_SOCKET_TIMEOUT};

use crate::{Transport, error::*};

/// TCP transport for ZhongHong gateways
///
/// The stream is split so a pending read never blocks a write. Each half sits
/// behind its own mutex; reconnecting swaps both under their locks.
pub struct TcpTransport {
    addr: String,
    port: u16,
    reader: Mutex<Option<OwnedReadHalf>>,
    writer: Mutex<Option<OwnedWriteHalf>>,
    connected: AtomicBool,
    connect_timeout: Duration,
    write_timeout: Duration,
}

impl TcpTransport {
    /// Create new TCP transport
    pub fn new(addr: impl Into<String>, port: u16) -> Self {
        Self {
            addr: addr.into(),
            port,
            reader: Mutex::new(None),
            writer: Mutex::new(None),
            connected: AtomicBool::new(false),
            connect_timeout: Duration::from_secs(DEFAULT_SOCKET_TIMEOUT),
            write_timeout: Duration::from_secs(DEFAULT_SOCKET_TIMEOUT),
        }
    }

    /// Create transport on the default gateway port (9999)
    pub fn with_default_port(addr: impl Into<String>) -> Self {
        Self::new(addr, DEFAULT_PORT)
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set write timeout
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Resolve address to SocketAddr
    async fn resolve_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.addr, self.port);

        let addrs: Vec<SocketAddr> = tokio::net::lookup_host(&addr_str)
            .await
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", addr_str, e)))?
            .collect();

        addrs
            .first()
            .copied()
            .ok_or_else(|| Error::InvalidAddress(format!("No addresses found for {}", addr_str)))
    }

    /// Drop both halves, shutting down the write side
    async fn close(&self) -> bool {
        let mut writer = self.writer.lock().await;
        let mut reader = self.reader.lock().await;

        self.connected.store(false, Ordering::Release);
        reader.take();

        match writer.take() {
            Some(mut stream) => {
                let _ = stream.shutdown().await;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&self) -> Result<()> {
        if self.close().await {
            debug!("Closed previous connection to {}", self.remote_addr());
        }

        let addr = self.resolve_addr().await?;

        debug!("Connecting to {}...", addr);

        let stream = timeout(self.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| Error::ConnectionTimeout)?
            .map_err(Error::Io)?;

        // Disable Nagle's algorithm, frames are tiny
        stream.set_nodelay(true)?;

        let (read_half, write_half) = stream.into_split();

        let mut writer = self.writer.lock().await;
        let mut reader = self.reader.lock().await;
        *reader = Some(read_half);
        *writer = Some(write_half);
        self.connected.store(true, Ordering::Release);

        debug!("Connected to {}", addr);

        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        if self.close().await {
            debug!("Disconnected from {}", self.remote_addr());
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn send(&self, data: &[u8]) -> Result<()> {
        let mut guard = self.writer.lock().await;
        let stream = guard.as_mut().ok_or(Error::NotConnected)?;

        trace!("Sending {} bytes: {}", data.len(), hex::encode(data));

        timeout(self.write_timeout, async {
            stream.write_all(data).await?;
            stream.flush().await
        })
        .await
        .map_err(|_| Error::WriteTimeout)??;

        Ok(())
    }

    async fn receive(&self, timeout_duration: Duration) -> Result<BytesMut> {
        let mut guard = self.reader.lock().await;
        let stream = guard.as_mut().ok_or(Error::NotConnected)?;

        let mut buf = BytesMut::with_capacity(RECV_BUFFER_SIZE);

        let n = timeout(timeout_duration, stream.read_buf(&mut buf))
            .await
            .map_err(|_| Error::ReadTimeout)??;

        if n == 0 {
            return Err(Error::ConnectionClosed);
        }

        trace!("Received {} bytes: {}", n, hex::encode(&buf[..n]));

        Ok(buf)
    }

    fn remote_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("TCP transport dropped while still connected");
        }
    }
}
