//! Error types for AXI-RT driver operations

use thiserror::Error;

/// Result type alias for AXI-RT operations
pub type Result<T> = std::result::Result<T, AxiRtError>;

/// Errors that can occur during AXI-RT operations
#[derive(Debug, Error)]
pub enum AxiRtError {
    /// Manager index exceeds the configured manager count
    #[error("Manager index {mgr_id} out of range (unit has {count} managers)")]
    ManagerOutOfRange {
        /// Requested manager index
        mgr_id: u8,
        /// Configured number of managers
        count: u8,
    },

    /// Region index exceeds the configured region count
    #[error("Region index {region_id} out of range (unit has {count} regions)")]
    RegionOutOfRange {
        /// Requested region index
        region_id: u8,
        /// Configured number of regions
        count: u8,
    },

    /// Length-limit group index exceeds the register file capacity
    #[error("Length-limit group {group_id} out of range (register file has {count} groups)")]
    GroupOutOfRange {
        /// Requested group index
        group_id: u8,
        /// Number of length-limit group registers
        count: u8,
    },

    /// Register access outside the mapped register file
    #[error("Register access out of bounds: offset {offset:#x}, bus ends at {len:#x}")]
    OutOfBounds {
        /// Offending byte offset
        offset: usize,
        /// Bus length in bytes
        len: usize,
    },

    /// Bus does not cover the whole register file
    #[error("Register file not mapped: bus provides {len:#x} bytes, need {need:#x}")]
    Unmapped {
        /// Bytes the bus provides
        len: usize,
        /// Bytes the register file requires
        need: usize,
    },

    /// Driver configuration exceeds what the register layout can address
    #[error("Invalid driver configuration: {reason}")]
    InvalidConfig {
        /// Reason for rejection
        reason: String,
    },

    /// Mapping the register file into the process failed
    #[error("Mapping register file failed: {reason}")]
    MapFailed {
        /// Reason for failure
        reason: String,
    },

    /// Hardware did not acknowledge an isolation request in time
    #[error("Isolation not acknowledged within {waited_ms}ms")]
    IsolationTimeout {
        /// Time waited in milliseconds
        waited_ms: u64,
    },

    /// I/O error while opening the mapping source
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },
}

impl AxiRtError {
    /// Create a map failed error
    pub fn map_failed(reason: impl Into<String>) -> Self {
        Self::MapFailed {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
