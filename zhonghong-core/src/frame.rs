//! Outbound command frame encoding/decoding

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use zhonghong_types::{FanSpeed, Mode};

use crate::{
    checksum,
    command::Command,
    constants::{BROADCAST, power},
    error::{Error, Result},
};

/// Request sent to the gateway
///
/// # Frame Structure
///
/// ```text
/// ┌─────────┬─────────┬───────┬────────────┬─────────┬─────────┬──────────┐
/// │ Gateway │ Command │ Value │ Unit count │ Outdoor │ Indoor  │ Checksum │
/// │ 1 byte  │ 1 byte  │1 byte │   1 byte   │ 1 byte  │ 1 byte  │  1 byte  │
/// └─────────┴─────────┴───────┴────────────┴─────────┴─────────┴──────────┘
/// ```
///
/// A unit count of `0xFF` addresses every unit behind the gateway. The
/// checksum is the low byte of the sum of the first six bytes.
///
/// # Examples
///
/// ```
/// use zhonghong_core::{Command, CommandFrame};
///
/// let frame = CommandFrame::query_all(1);
/// let encoded = frame.encode();
/// assert_eq!(&encoded[..], &[0x01, 0x50, 0xFF, 0xFF, 0xFF, 0xFF, 0x4D]);
///
/// let decoded = CommandFrame::decode(&encoded).unwrap();
/// assert_eq!(decoded.command, Command::QueryAll);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct CommandFrame {
    pub gateway: u8,
    pub command: Command,
    pub value: u8,

    /// Number of addressed units (`0xFF` = all)
    pub unit_count: u8,

    pub outdoor: u8,
    pub indoor: u8,
}

impl CommandFrame {
    /// Encoded frame size in bytes
    pub const SIZE: usize = 7;

    /// Create a frame from raw fields
    pub fn new(
        gateway: u8,
        command: Command,
        value: u8,
        unit_count: u8,
        outdoor: u8,
        indoor: u8,
    ) -> Self {
        Self {
            gateway,
            command,
            value,
            unit_count,
            outdoor,
            indoor,
        }
    }

    /// Ask the gateway for the state of every unit
    pub fn query_all(gateway: u8) -> Self {
        Self::new(gateway, Command::QueryAll, BROADCAST, BROADCAST, BROADCAST, BROADCAST)
    }

    /// Turn a single unit on or off
    pub fn power(gateway: u8, outdoor: u8, indoor: u8, on: bool) -> Self {
        let value = if on { power::ON } else { power::OFF };
        Self::new(gateway, Command::Power, value, 1, outdoor, indoor)
    }

    /// Set the target temperature (°C) of a single unit
    pub fn set_temperature(gateway: u8, outdoor: u8, indoor: u8, celsius: u8) -> Self {
        Self::new(gateway, Command::SetTemperature, celsius, 1, outdoor, indoor)
    }

    /// Set the operation mode of a single unit
    pub fn set_mode(gateway: u8, outdoor: u8, indoor: u8, mode: Mode) -> Self {
        Self::new(gateway, Command::SetMode, mode.bitmask(), 1, outdoor, indoor)
    }

    /// Set the fan speed of a single unit
    pub fn set_fan(gateway: u8, outdoor: u8, indoor: u8, fan: FanSpeed) -> Self {
        Self::new(gateway, Command::SetFan, fan.bitmask(), 1, outdoor, indoor)
    }

    fn header(&self) -> [u8; Self::SIZE - 1] {
        [
            self.gateway,
            self.command.into(),
            self.value,
            self.unit_count,
            self.outdoor,
            self.indoor,
        ]
    }

    /// Calculate checksum for this frame
    pub fn checksum(&self) -> u8 {
        checksum::calculate(&self.header())
    }

    /// Encode frame to bytes
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);

        buf.put_slice(&self.header());
        buf.put_u8(self.checksum());

        buf.freeze()
    }

    /// Decode a frame from bytes
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Buffer is shorter than 7 bytes
    /// - Command code is unknown
    /// - Checksum verification fails
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let Some(raw) = buf.get(..Self::SIZE) else {
            return Err(Error::FrameTooShort {
                expected: Self::SIZE,
                actual: buf.len(),
            });
        };

        let frame = Self::new(
            raw[0],
            Command::try_from(raw[1])?,
            raw[2],
            raw[3],
            raw[4],
            raw[5],
        );

        let received = raw[6];
        if !checksum::verify(&raw[..Self::SIZE - 1], received) {
            return Err(Error::ChecksumMismatch {
                expected: frame.checksum(),
                received,
            });
        }

        Ok(frame)
    }
}

impl fmt::Debug for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandFrame")
            .field("gateway", &self.gateway)
            .field("command", &self.command)
            .field("value", &format!("0x{:02X}", self.value))
            .field("unit_count", &self.unit_count)
            .field("outdoor", &self.outdoor)
            .field("indoor", &self.indoor)
            .field("checksum", &format!("0x{:02X}", self.checksum()))
            .finish()
    }
}

impl fmt::Display for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frame[{}](gw={}, unit={}_{}, value=0x{:02X})",
            self.command, self.gateway, self.outdoor, self.indoor, self.value
        )
    }
}
