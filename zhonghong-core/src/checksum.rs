//! ZhongHong checksum algorithm
//!
//! The last byte of every frame is the sum of the preceding bytes,
//! truncated to 8 bits.

use tracing::trace;

/// Calculate frame checksum
///
/// # Examples
///
/// ```
/// use zhonghong_core::checksum;
///
/// // query-all for gateway 1
/// let checksum = checksum::calculate(&[0x01, 0x50, 0xFF, 0xFF, 0xFF, 0xFF]);
/// assert_eq!(checksum, 0x4D);
/// ```
pub fn calculate(data: &[u8]) -> u8 {
    let checksum = data.iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte));

    trace!(
        len = data.len(),
        checksum = format!("0x{:02X}", checksum),
        "Calculated checksum"
    );

    checksum
}

/// Verify checksum
pub fn verify(data: &[u8], expected: u8) -> bool {
    calculate(data) == expected
}
