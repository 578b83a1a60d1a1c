//! Inbound status frame decoding
//!
//! Only responses to [`Command::QueryAll`] carry device state. Their third
//! byte is a batch marker selecting one of two layouts:
//!
//! ```text
//! Broadcast (0x01): repeated 15-byte records
//! ┌────┬──────┬──────┬───────┬─────┬────┬───────┬────────┬──────┬─────┬──────┬─────────┬─────┐
//! │ GW │ 0x50 │ 0x01 │ count │ OUT │ IN │ POWER │ SETTMP │ MODE │ FAN │ TEMP │ 3 bytes │ CHK │
//! └────┴──────┴──────┴───────┴─────┴────┴───────┴────────┴──────┴─────┴──────┴─────────┴─────┘
//!
//! Full query (0xFF): 4-byte header, repeated 10-byte records, 1 checksum byte
//! ┌────┬──────┬──────┬───────┬──────────────────────────┬─────┬──────────────────────────┬─────┐
//! │ GW │ 0x50 │ 0xFF │ count │ OUT IN POWER ... +3 bytes │ ... │ OUT IN POWER ... +3 bytes │ CHK │
//! └────┴──────┴──────┴───────┴──────────────────────────┴─────┴──────────────────────────┴─────┘
//! ```
//!
//! In a broadcast batch each record carries its own gateway byte; a full-query
//! batch takes the gateway from byte 0 of the buffer for every record.
//!
//! [`Command::QueryAll`]: crate::Command::QueryAll

use tracing::trace;

use zhonghong_types::{DeviceAddress, DeviceStatus, FanSpeed, Mode};

use crate::{
    command::Command,
    constants::status::*,
    error::{Error, Result},
};

/// Batch marker (byte 2 of a status frame)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BatchMarker {
    /// Unsolicited bulk update (`0x01`)
    Broadcast,

    /// Response to a full query, used to finish discovery (`0xFF`)
    FullQuery,

    /// Any other marker; carries no records
    Other(u8),
}

impl From<u8> for BatchMarker {
    fn from(value: u8) -> Self {
        match value {
            0x01 => Self::Broadcast,
            0xFF => Self::FullQuery,
            other => Self::Other(other),
        }
    }
}

/// Device states decoded from one received buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBatch {
    /// `None` when the buffer is not a status frame
    pub marker: Option<BatchMarker>,

    pub devices: Vec<DeviceStatus>,
}

impl StatusBatch {
    /// Check if this batch answers a full query
    pub fn is_full_query(&self) -> bool {
        self.marker == Some(BatchMarker::FullQuery)
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// Decode every device status contained in `data`
///
/// Buffers shorter than 15 bytes or not answering a status query yield an
/// empty batch without error.
///
/// # Errors
///
/// Returns [`Error::MalformedFrame`] if a mode or fan byte is not a valid
/// one-hot value.
///
/// # Examples
///
/// ```
/// use zhonghong_core::status::{decode_status_batch, BatchMarker};
///
/// let frame = [
///     0x01, 0x50, 0x01, 0x01, 0x01, 0x02, 0x01, 0x18, 0x01, 0x04, 0x1A, 0x00, 0x00, 0x00, 0x00,
/// ];
/// let batch = decode_status_batch(&frame).unwrap();
///
/// assert_eq!(batch.marker, Some(BatchMarker::Broadcast));
/// assert_eq!(batch.devices[0].address.to_string(), "1_1_2");
/// assert_eq!(batch.devices[0].target_temperature, 24);
/// ```
pub fn decode_status_batch(data: &[u8]) -> Result<StatusBatch> {
    if data.len() < MIN_FRAME_LEN || data[OPCODE_OFFSET] != u8::from(Command::QueryAll) {
        return Ok(StatusBatch::default());
    }

    let marker = BatchMarker::from(data[MARKER_OFFSET]);

    let devices = match marker {
        BatchMarker::Broadcast => (0..data.len() / BROADCAST_RECORD_LEN)
            .map(|idx| {
                let start = idx * BROADCAST_RECORD_LEN;
                decode_record(data[start], data, start)
            })
            .collect::<Result<Vec<_>>>()?,
        BatchMarker::FullQuery => (0..(data.len() - FULL_QUERY_OVERHEAD) / FULL_QUERY_RECORD_LEN)
            .map(|idx| decode_record(data[0], data, idx * FULL_QUERY_RECORD_LEN))
            .collect::<Result<Vec<_>>>()?,
        BatchMarker::Other(value) => {
            trace!("Ignoring status frame with marker 0x{:02X}", value);
            Vec::new()
        }
    };

    Ok(StatusBatch {
        marker: Some(marker),
        devices,
    })
}

/// Decode the status fields found at `start + 4` in `data`
fn decode_record(gateway: u8, data: &[u8], start: usize) -> Result<DeviceStatus> {
    let from = start + FIELDS_OFFSET;
    let fields = data.get(from..from + FIELD_COUNT).ok_or_else(|| {
        Error::MalformedFrame(format!(
            "record at offset {} exceeds frame of {} bytes",
            start,
            data.len()
        ))
    })?;

    let (outdoor, indoor, power, target, mode, fan, current) = (
        fields[0], fields[1], fields[2], fields[3], fields[4], fields[5], fields[6],
    );

    let address = DeviceAddress::new(gateway, outdoor, indoor);
    let mode = Mode::from_bitmask(mode)
        .map_err(|e| Error::MalformedFrame(format!("{}: {}", address, e)))?;
    let fan = FanSpeed::from_bitmask(fan)
        .map_err(|e| Error::MalformedFrame(format!("{}: {}", address, e)))?;

    Ok(DeviceStatus {
        address,
        power: power == 0x01,
        target_temperature: target,
        mode,
        fan,
        current_temperature: current,
    })
}
