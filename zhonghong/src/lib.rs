//! # zhonghong
//!
//! Rust client for ZhongHong HVAC gateways.
//!
//! ## Features
//!
//! - Persistent TCP connection with automatic reconnect and keepalive
//! - Device discovery and a registry of last-known unit states
//! - Per-unit status subscriptions
//! - Async/await API using Tokio
//!
//! ## Quick Start
//!
//! ```no_run
//! use zhonghong::{FanSpeed, Hub, HubConfig};
//!
//! #[tokio::main]
//! async fn main() -> zhonghong::Result<()> {
//!     // Connect to gateway
//!     let hub = Hub::connect(HubConfig::new("192.168.1.50")).await;
//!
//!     // Enumerate units
//!     hub.discover().await?;
//!     for status in hub.devices() {
//!         println!("{}", status);
//!     }
//!
//!     // Control a unit
//!     hub.set_fan(1, 1, FanSpeed::Low).await;
//!
//!     // Disconnect
//!     hub.stop().await;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod hub;

// Re-exports
pub use config::HubConfig;
pub use error::{Error, Result};
pub use hub::Hub;

// Re-export types
pub use zhonghong_core::{Command, CommandFrame, DeviceRegistry, StatusListener, SubscriptionId};
pub use zhonghong_types::{DeviceAddress, DeviceStatus, FanSpeed, Mode};
