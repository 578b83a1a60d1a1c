//! Type definitions for zhonghong

pub mod device_status;
pub mod error;
pub mod hvac;

pub use device_status::{DeviceAddress, DeviceStatus};
pub use error::{Error, Result};
pub use hvac::{FanSpeed, Mode};
