//! Operation mode and fan speed of an HVAC unit
//!
//! Both travel on the wire as one-hot bitmasks: the enum index is the
//! position of the single set bit (`0x01 -> 0`, `0x02 -> 1`, `0x04 -> 2`, ...).

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Position of the single set bit in `value`.
///
/// Returns `None` for `0` and for values with more than one bit set.
///
/// # Examples
///
/// ```
/// use zhonghong_types::hvac::bit_index;
///
/// assert_eq!(bit_index(0x01), Some(0));
/// assert_eq!(bit_index(0x08), Some(3));
/// assert_eq!(bit_index(0x00), None);
/// assert_eq!(bit_index(0x03), None);
/// ```
pub fn bit_index(value: u8) -> Option<usize> {
    if value.count_ones() != 1 {
        return None;
    }
    Some(value.trailing_zeros() as usize)
}

/// Operation mode
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
    Cool = 0x01,
    Dry = 0x02,
    FanOnly = 0x04,
    Heat = 0x08,
}

impl Mode {
    /// All modes in bit order
    pub const ALL: [Mode; 4] = [Self::Cool, Self::Dry, Self::FanOnly, Self::Heat];

    /// Wire bitmask
    pub fn bitmask(self) -> u8 {
        self as u8
    }

    /// Decode a one-hot mode byte
    pub fn from_bitmask(value: u8) -> Result<Self> {
        bit_index(value)
            .and_then(|idx| Self::ALL.get(idx).copied())
            .ok_or(Error::InvalidBitmask {
                field: "mode",
                value,
            })
    }

    /// Protocol name (`cool`, `dry`, `fan_only`, `heat`)
    pub fn name(self) -> &'static str {
        match self {
            Self::Cool => "cool",
            Self::Dry => "dry",
            Self::FanOnly => "fan_only",
            Self::Heat => "heat",
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown mode '{}'", s)))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fan speed
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FanSpeed {
    High = 0x01,
    Medium = 0x02,
    Low = 0x04,
}

impl FanSpeed {
    /// All fan speeds in bit order
    pub const ALL: [FanSpeed; 3] = [Self::High, Self::Medium, Self::Low];

    /// Wire bitmask
    pub fn bitmask(self) -> u8 {
        self as u8
    }

    /// Decode a one-hot fan byte
    pub fn from_bitmask(value: u8) -> Result<Self> {
        bit_index(value)
            .and_then(|idx| Self::ALL.get(idx).copied())
            .ok_or(Error::InvalidBitmask {
                field: "fan",
                value,
            })
    }

    /// Protocol name (`high`, `medium`, `low`)
    pub fn name(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl FromStr for FanSpeed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|fan| fan.name() == s)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown fan speed '{}'", s)))
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
