//! # zhonghong-core
//!
//! Core protocol implementation for ZhongHong HVAC gateways.
//!
//! This crate provides the I/O-free protocol primitives:
//! - Command frame encoding/decoding
//! - Status batch decoding
//! - Checksum calculation
//! - Command definitions
//! - Device registry and status subscriptions

pub mod checksum;
pub mod command;
pub mod constants;
pub mod error;
pub mod frame;
pub mod registry;
pub mod status;
pub mod subscription;

pub use command::Command;
pub use error::{Error, Result};
pub use frame::CommandFrame;
pub use registry::DeviceRegistry;
pub use status::{BatchMarker, StatusBatch, decode_status_batch};
pub use subscription::{StatusListener, SubscriptionId, dispatch};

/// Default gateway TCP port
pub const DEFAULT_PORT: u16 = 9999;

/// Receive buffer size
pub const RECV_BUFFER_SIZE: usize = 1024;
