//! ZhongHong gateway command codes

use std::fmt;

use crate::error::{Error, Result};

/// Protocol command codes
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Turn a unit on or off
    Power = 0x31,

    /// Set target temperature (°C)
    SetTemperature = 0x32,

    /// Set operation mode (bitmask)
    SetMode = 0x33,

    /// Set fan speed (bitmask)
    SetFan = 0x34,

    /// Query the state of every unit; also the opcode of status responses
    QueryAll = 0x50,
}

impl Command {
    /// Check if this command changes unit state
    pub fn is_control(self) -> bool {
        !matches!(self, Self::QueryAll)
    }

    /// Get command name
    pub fn name(self) -> &'static str {
        match self {
            Self::Power => "CMD_POWER",
            Self::SetTemperature => "CMD_SET_TEMPERATURE",
            Self::SetMode => "CMD_SET_MODE",
            Self::SetFan => "CMD_SET_FAN",
            Self::QueryAll => "CMD_QUERY_ALL",
        }
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> u8 {
        cmd as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x31 => Ok(Self::Power),
            0x32 => Ok(Self::SetTemperature),
            0x33 => Ok(Self::SetMode),
            0x34 => Ok(Self::SetFan),
            0x50 => Ok(Self::QueryAll),
            _ => Err(Error::UnknownCommand(value)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}
