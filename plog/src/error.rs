//! Error types for printing and logging operations

use crate::sync::SyncError;
use thiserror::Error;

/// Errors that can occur during printing and logging operations
#[derive(Error, Debug)]
pub enum PlogError {
    /// Module used before initialisation
    #[error("Module is not initialised")]
    NotInitialised,

    /// Second initialisation attempt
    #[error("Module is already initialised")]
    AlreadyInitialised,

    /// Firewall sentinel mismatch - state memory is corrupted
    #[error("State guard corrupted - operation aborted")]
    StateCorrupted,

    /// Verbosity level at or above the range sentinel
    #[error("Invalid verbosity level: {value}")]
    InvalidLevel {
        /// Raw level value
        value: u32,
    },

    /// Synchronization primitive failure
    #[error("Synchronization error: {source}")]
    Sync {
        /// Source primitive error
        #[from]
        source: SyncError,
    },

    /// Log-channel record could not be read from the partition table
    #[error("Failed to load the log-channel record")]
    ChannelLoad,

    /// Log entry could not be stored into the shared ring
    #[error("Failed to store log entry into shared ring slot {slot}")]
    ChannelStore {
        /// Target ring slot
        slot: u32,
    },

    /// Log-channel record describes a range outside the shared region
    #[error("Log channel out of range: offset {offset:#x}, length {length}")]
    ChannelRange {
        /// Buffer offset from the record
        offset: u32,
        /// Buffer length from the record
        length: u32,
    },

    /// Byte-range access outside the mapped region
    #[error("Region access out of bounds: offset {offset:#x}, len {len}")]
    OutOfBounds {
        /// Requested offset
        offset: usize,
        /// Requested length
        len: usize,
    },

    /// IO error
    #[error("IO error: {source}")]
    Io {
        /// Source IO error
        #[from]
        source: std::io::Error,
    },
}

/// Result type for printing and logging operations
pub type PlogResult<T> = Result<T, PlogError>;
