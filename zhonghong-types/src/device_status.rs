//! Device identity and status structures

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::hvac::{FanSpeed, Mode};

/// Bus address of one HVAC unit
///
/// Rendered as `gateway_outdoor_indoor` (e.g. `1_2_3`), which is the key
/// used by the registry and by subscriptions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceAddress {
    /// Gateway address
    pub gateway: u8,

    /// Outdoor unit address
    pub outdoor: u8,

    /// Indoor unit address
    pub indoor: u8,
}

impl DeviceAddress {
    pub fn new(gateway: u8, outdoor: u8, indoor: u8) -> Self {
        Self {
            gateway,
            outdoor,
            indoor,
        }
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.gateway, self.outdoor, self.indoor)
    }
}

impl FromStr for DeviceAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts = s
            .split('_')
            .map(|part| {
                part.parse::<u8>()
                    .map_err(|e| Error::Parse(format!("{}: {}", s, e)))
            })
            .collect::<Result<Vec<u8>>>()?;

        match parts.as_slice() {
            [gateway, outdoor, indoor] => Ok(Self::new(*gateway, *outdoor, *indoor)),
            _ => Err(Error::Parse(format!(
                "expected gateway_outdoor_indoor, got '{}'",
                s
            ))),
        }
    }
}

/// Last-known state of one HVAC unit
///
/// Replaced wholesale on every status frame that mentions the unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceStatus {
    pub address: DeviceAddress,

    /// Unit is powered on
    pub power: bool,

    /// Target temperature (°C)
    pub target_temperature: u8,

    pub mode: Mode,

    pub fan: FanSpeed,

    /// Room temperature (°C)
    pub current_temperature: u8,
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AC[{}: {}, {}, fan {}, set {}°C, now {}°C]",
            self.address,
            if self.power { "on" } else { "off" },
            self.mode,
            self.fan,
            self.target_temperature,
            self.current_temperature
        )
    }
}
