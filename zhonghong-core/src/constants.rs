//! Protocol constants

/// Default read/keepalive timeout (seconds)
pub const DEFAULT_SOCKET_TIMEOUT: u64 = 60;

/// Default discovery window (seconds)
pub const DEFAULT_DISCOVER_TIMEOUT: u64 = 10;

/// Default delay before retrying a failed connection (seconds)
pub const DEFAULT_RECONNECT_DELAY: u64 = 5;

/// Default gateway address
pub const DEFAULT_GATEWAY_ADDRESS: u8 = 1;

/// Unit count / address wildcard (all units)
pub const BROADCAST: u8 = 0xFF;

/// Power command values
pub mod power {
    pub const ON: u8 = 0x01;
    pub const OFF: u8 = 0x02;
}

/// Inbound status frame layout
pub mod status {
    /// Offset of the opcode byte
    pub const OPCODE_OFFSET: usize = 1;

    /// Offset of the batch marker byte
    pub const MARKER_OFFSET: usize = 2;

    /// Frames shorter than this carry no device state
    pub const MIN_FRAME_LEN: usize = 15;

    /// Record size of a broadcast batch
    pub const BROADCAST_RECORD_LEN: usize = 15;

    /// Header plus trailing checksum of a full-query batch
    pub const FULL_QUERY_OVERHEAD: usize = 5;

    /// Record size of a full-query batch
    pub const FULL_QUERY_RECORD_LEN: usize = 10;

    /// Offset of the status fields inside a record window
    pub const FIELDS_OFFSET: usize = 4;

    /// Number of status fields
    pub const FIELD_COUNT: usize = 7;
}
