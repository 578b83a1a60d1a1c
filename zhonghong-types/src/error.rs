pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid {field} bitmask: 0x{value:02X}")]
    InvalidBitmask {
        field: &'static str,
        value: u8,
    },

    #[error("Parse error: {0}")]
    Parse(String),
}
