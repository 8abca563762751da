//! Shared log-channel layout constants.
//!
//! These constants define the persisted layout this crate consumes and the
//! fixed sizing of its buffers. They are the single source of truth - the
//! channel, capture and output modules all import from here.

use static_assertions::const_assert;

/// Number of record slots in each log ring (local boot ring and shared ring).
pub const LOG_MAX_RECS: usize = 32;

/// Size of one log record slot in bytes, including the NUL terminator.
pub const LOG_ENTRY_SIZE: usize = 256;

/// Maximum stored message length in bytes (one slot minus the terminator).
pub const LOG_ENTRY_MAX: usize = LOG_ENTRY_SIZE - 1;

/// Upper bound for one formatted print, in bytes. Longer output is truncated.
pub const PRINT_BUFFER_SIZE: usize = 512;

/// Size of the shared ring's write-index word.
pub const WRITE_INDEX_SIZE: usize = 4;

/// Byte offset of the log-channel record within the shared partition table.
pub const CHANNEL_RECORD_OFFSET: usize = 0x18;

/// Size of the log-channel record: `{buffer_offset: u32, buffer_length: u32}`.
pub const CHANNEL_RECORD_SIZE: usize = 8;

/// Maximum accepted log-channel buffer length: write-index word plus ring.
pub const LOG_BUFFER_LEN: usize = WRITE_INDEX_SIZE + LOG_MAX_RECS * LOG_ENTRY_SIZE;

/// Fixed size of the FSBL boot-log region in bytes.
pub const FSBL_LOG_SIZE: usize = 8192;

/// Bounded wait for the emission gate before falling back to an
/// unsynchronized print.
pub const EMIT_TIMEOUT_MS: u64 = 100;

/// Pause after replaying the FSBL records so a downstream reader can drain
/// the first batch before the ring wraps.
pub const BOOT_DRAIN_SLEEP_MS: u64 = 1000;

// A slot must always fit inside one formatted print.
const_assert!(PRINT_BUFFER_SIZE >= LOG_ENTRY_SIZE);
const_assert!(LOG_ENTRY_SIZE.is_power_of_two());
const_assert!(LOG_MAX_RECS > 1);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_fits_in_slot() {
        assert_eq!(LOG_ENTRY_MAX + 1, LOG_ENTRY_SIZE);
    }

    #[test]
    fn test_buffer_len_covers_index_and_ring() {
        assert_eq!(LOG_BUFFER_LEN, 4 + 32 * 256);
    }

    #[test]
    fn test_record_precedes_no_overlap() {
        assert!(CHANNEL_RECORD_SIZE >= 2 * size_of::<u32>());
    }
}
