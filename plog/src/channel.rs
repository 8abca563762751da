//! Shared-memory log channel: the ring of message slots another processor
//! reads.
//!
//! The partition table holds a channel record `{buffer_offset,
//! buffer_length}` at a fixed offset. The described buffer starts with a raw
//! little-endian write-index word; `LOG_MAX_RECS` fixed-size NUL-terminated
//! slots follow. All offset/slot arithmetic and the flush discipline live
//! here and nowhere else.

use crate::error::{PlogError, PlogResult};
use crate::layout::{
    CHANNEL_RECORD_OFFSET, LOG_BUFFER_LEN, LOG_ENTRY_SIZE, LOG_MAX_RECS, WRITE_INDEX_SIZE,
};
use crate::region::MemoryRegion;
use std::sync::Arc;

/// Log-channel record as persisted in the partition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRecord {
    /// Byte offset of the channel buffer within the shared region.
    pub buffer_offset: u32,
    /// Byte length of the channel buffer.
    pub buffer_length: u32,
}

impl ChannelRecord {
    /// Load the record from the partition table. Any read failure is
    /// reported as a load error; an impossible described range is rejected.
    pub fn load(region: &dyn MemoryRegion) -> PlogResult<ChannelRecord> {
        let mut raw = [0u8; 8];
        region
            .read(CHANNEL_RECORD_OFFSET, &mut raw)
            .map_err(|_| PlogError::ChannelLoad)?;

        let record = ChannelRecord {
            buffer_offset: u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]),
            buffer_length: u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]),
        };
        record.validate(region)?;
        Ok(record)
    }

    /// Persist the record into the partition table. Used when seeding a
    /// fresh region.
    pub fn store(&self, region: &dyn MemoryRegion) -> PlogResult<()> {
        self.validate(region)?;
        let mut raw = [0u8; 8];
        raw[..4].copy_from_slice(&self.buffer_offset.to_le_bytes());
        raw[4..].copy_from_slice(&self.buffer_length.to_le_bytes());
        region.write(CHANNEL_RECORD_OFFSET, &raw)?;
        region.flush(CHANNEL_RECORD_OFFSET, raw.len())
    }

    fn validate(&self, region: &dyn MemoryRegion) -> PlogResult<()> {
        let end = self.buffer_offset as usize + self.buffer_length as usize;
        let needed = WRITE_INDEX_SIZE + LOG_MAX_RECS * LOG_ENTRY_SIZE;
        if self.buffer_length as usize > LOG_BUFFER_LEN
            || (self.buffer_length as usize) < needed
            || end > region.len()
        {
            return Err(PlogError::ChannelRange {
                offset: self.buffer_offset,
                length: self.buffer_length,
            });
        }
        Ok(())
    }

    /// Offset of the write-index word.
    fn index_offset(&self) -> usize {
        self.buffer_offset as usize
    }

    /// Offset of the first ring slot.
    fn ring_base(&self) -> usize {
        self.buffer_offset as usize + WRITE_INDEX_SIZE
    }
}

/// Ring of fixed-size message slots inside the shared region.
pub struct SharedRing {
    region: Arc<dyn MemoryRegion>,
}

impl SharedRing {
    /// Wrap the shared region. The channel record is re-loaded on every
    /// operation; the owning processor may update it at any time.
    pub fn new(region: Arc<dyn MemoryRegion>) -> SharedRing {
        SharedRing { region }
    }

    /// Store one slot-sized entry at the current write index, flush it, then
    /// advance the index modulo the ring size. The entry is visible to the
    /// remote reader only after the flush; the index moves last so the
    /// reader never observes a partial record.
    pub fn collect(&self, slot_bytes: &[u8; LOG_ENTRY_SIZE]) -> PlogResult<()> {
        let record = ChannelRecord::load(&*self.region)?;
        let index = self.region.read_u32(record.index_offset())?;

        let slot_offset = record.ring_base() + index as usize * LOG_ENTRY_SIZE;
        self.region
            .write(slot_offset, slot_bytes)
            .map_err(|_| PlogError::ChannelStore { slot: index })?;
        self.region.flush(slot_offset, LOG_ENTRY_SIZE)?;

        let next = (index + 1) % LOG_MAX_RECS as u32;
        self.region.write_u32(record.index_offset(), next)?;
        self.region
            .flush(record.index_offset(), WRITE_INDEX_SIZE)?;
        Ok(())
    }

    /// Reset the write index to zero. Entry point of the boot-record replay.
    pub fn reset_index(&self) -> PlogResult<()> {
        let record = ChannelRecord::load(&*self.region)?;
        self.region.write_u32(record.index_offset(), 0)?;
        self.region.flush(record.index_offset(), WRITE_INDEX_SIZE)
    }

    /// Current write index, as the remote reader would see it.
    pub fn write_index(&self) -> PlogResult<u32> {
        let record = ChannelRecord::load(&*self.region)?;
        self.region.read_u32(record.index_offset())
    }

    /// Visit every non-empty slot in positional order `0..LOG_MAX_RECS`.
    ///
    /// Positional, not chronological: after a wrap, older entries can follow
    /// newer ones. This matches the persisted-layout contract and is kept
    /// as-is.
    pub fn dump(&self, mut emit: impl FnMut(&str)) -> PlogResult<()> {
        let record = ChannelRecord::load(&*self.region)?;

        // Refresh the whole described buffer before reading.
        self.region
            .flush(record.buffer_offset as usize, record.buffer_length as usize)?;

        let mut slot = [0u8; LOG_ENTRY_SIZE];
        for i in 0..LOG_MAX_RECS {
            let slot_offset = record.ring_base() + i * LOG_ENTRY_SIZE;
            self.region.read(slot_offset, &mut slot)?;

            let text = slot_text(&slot);
            if !text.is_empty() {
                emit(text);
            }
        }
        Ok(())
    }

    /// Zero and flush the whole channel buffer (index word included).
    pub fn clear(&self) -> PlogResult<()> {
        let record = ChannelRecord::load(&*self.region)?;
        self.region.fill(
            record.buffer_offset as usize,
            0,
            record.buffer_length as usize,
        )?;
        self.region
            .flush(record.buffer_offset as usize, record.buffer_length as usize)
    }
}

/// Message text of a slot: bytes up to the first NUL, if valid UTF-8.
/// Corrupt slots read as empty rather than failing the dump.
fn slot_text(slot: &[u8; LOG_ENTRY_SIZE]) -> &str {
    let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
    std::str::from_utf8(&slot[..end]).unwrap_or("")
}
