//! Log capture engine: dual-mode boot-log collection.
//!
//! Before the shared channel is ready, messages land in a local
//! fixed-capacity ring so early-boot diagnostics are not lost while the
//! communication link comes up. Once [`CaptureEngine::switch_to_shared`]
//! runs, collection targets the shared ring directly. The transition is
//! one-way; the local ring is retained afterwards so its contents can be
//! replayed into the channel.

use crate::channel::SharedRing;
use crate::error::PlogResult;
use crate::layout::{LOG_ENTRY_MAX, LOG_ENTRY_SIZE, LOG_MAX_RECS};
use crate::region::MemoryRegion;
use std::sync::Arc;

/// One boot-log message, trimmed and truncated for slot storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    text: heapless::String<LOG_ENTRY_MAX>,
}

impl LogEntry {
    /// Build an entry: truncate to the slot capacity (on a character
    /// boundary), then strip trailing CR/LF.
    pub fn new(message: &str) -> LogEntry {
        let clipped = truncate_on_char_boundary(message, LOG_ENTRY_MAX);
        let trimmed = clipped.trim_end_matches(['\r', '\n']);

        let mut text = heapless::String::new();
        // Cannot overflow: trimmed is at most LOG_ENTRY_MAX bytes.
        let _ = text.push_str(trimmed);
        LogEntry { text }
    }

    /// Stored message text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// True when nothing remains after trimming.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The entry as one NUL-padded ring slot.
    pub fn slot_bytes(&self) -> [u8; LOG_ENTRY_SIZE] {
        let mut slot = [0u8; LOG_ENTRY_SIZE];
        slot[..self.text.len()].copy_from_slice(self.text.as_bytes());
        slot
    }
}

fn truncate_on_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// A collection strategy for one capture mode.
pub trait Collect {
    /// Persist one entry.
    fn collect(&mut self, entry: &LogEntry) -> PlogResult<()>;
}

/// Fixed-capacity ring used before the shared channel is ready.
///
/// The cursor advances modulo [`LOG_MAX_RECS`] *before* each write, so it
/// always names the most recent slot and the oldest entries are silently
/// overwritten once full.
pub struct LocalRing {
    slots: [heapless::String<LOG_ENTRY_MAX>; LOG_MAX_RECS],
    cursor: usize,
}

impl LocalRing {
    /// Empty ring, cursor at slot zero.
    pub fn new() -> LocalRing {
        LocalRing {
            slots: std::array::from_fn(|_| heapless::String::new()),
            cursor: 0,
        }
    }

    /// Non-empty slots in positional order `0..LOG_MAX_RECS`.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .filter(|slot| !slot.is_empty())
            .map(|slot| slot.as_str())
    }

    #[cfg(test)]
    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Default for LocalRing {
    fn default() -> Self {
        Self::new()
    }
}

impl Collect for LocalRing {
    fn collect(&mut self, entry: &LogEntry) -> PlogResult<()> {
        self.cursor = (self.cursor + 1) % LOG_MAX_RECS;
        self.slots[self.cursor].clear();
        let _ = self.slots[self.cursor].push_str(entry.as_str());
        Ok(())
    }
}

impl Collect for SharedRing {
    fn collect(&mut self, entry: &LogEntry) -> PlogResult<()> {
        SharedRing::collect(self, &entry.slot_bytes())
    }
}

/// Capture target. The transition is one-way: local first, shared once the
/// channel is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Channel not ready: buffer into the local ring.
    Local,
    /// Channel ready: write straight into the shared ring.
    SharedChannel,
}

/// Dual-mode collector over the local and shared rings.
pub struct CaptureEngine {
    mode: CaptureMode,
    local: LocalRing,
    shared: SharedRing,
}

impl CaptureEngine {
    /// New engine in local mode over the given shared region.
    pub fn new(region: Arc<dyn MemoryRegion>) -> CaptureEngine {
        CaptureEngine {
            mode: CaptureMode::Local,
            local: LocalRing::new(),
            shared: SharedRing::new(region),
        }
    }

    /// Current capture mode.
    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// Trim, truncate and persist one message via the active strategy.
    pub fn collect(&mut self, message: &str) -> PlogResult<()> {
        let entry = LogEntry::new(message);
        match self.mode {
            CaptureMode::Local => self.local.collect(&entry),
            CaptureMode::SharedChannel => self.shared.collect(&entry.slot_bytes()),
        }
    }

    /// Reset the shared write index and make the shared channel the capture
    /// target. Sole transition point; fails without switching if the channel
    /// record cannot be loaded.
    pub fn switch_to_shared(&mut self) -> PlogResult<()> {
        self.shared.reset_index()?;
        self.mode = CaptureMode::SharedChannel;
        Ok(())
    }

    /// Push every non-empty local slot (positional order) into the shared
    /// ring. Only meaningful after [`Self::switch_to_shared`].
    pub fn replay_local(&mut self) -> PlogResult<()> {
        for i in 0..LOG_MAX_RECS {
            if self.local.slots[i].is_empty() {
                continue;
            }
            let entry = LogEntry::new(self.local.slots[i].as_str());
            self.shared.collect(&entry.slot_bytes())?;
        }
        Ok(())
    }

    /// Shared ring accessor for the replay paths.
    pub fn shared_ring(&self) -> &SharedRing {
        &self.shared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelRecord;
    use crate::layout::{CHANNEL_RECORD_OFFSET, LOG_BUFFER_LEN};
    use crate::region::MappedRegion;

    fn seeded_region() -> Arc<dyn MemoryRegion> {
        let region: Arc<dyn MemoryRegion> =
            Arc::new(MappedRegion::anon(CHANNEL_RECORD_OFFSET + 8 + LOG_BUFFER_LEN).unwrap());
        ChannelRecord {
            buffer_offset: (CHANNEL_RECORD_OFFSET + 8) as u32,
            buffer_length: LOG_BUFFER_LEN as u32,
        }
        .store(&*region)
        .unwrap();
        region
    }

    #[test]
    fn test_entry_trims_trailing_crlf() {
        assert_eq!(LogEntry::new("boot ok\r\n").as_str(), "boot ok");
        assert_eq!(LogEntry::new("boot ok\n\r\n").as_str(), "boot ok");
        assert_eq!(LogEntry::new("\r\n").as_str(), "");
    }

    #[test]
    fn test_entry_keeps_interior_newlines() {
        // Only trailing CR/LF is stripped.
        assert_eq!(LogEntry::new("a\r\nb\r\n").as_str(), "a\r\nb");
    }

    #[test]
    fn test_entry_truncates_to_slot_capacity() {
        let long = "x".repeat(LOG_ENTRY_MAX + 100);
        let entry = LogEntry::new(&long);
        assert_eq!(entry.as_str().len(), LOG_ENTRY_MAX);
    }

    #[test]
    fn test_entry_truncation_respects_char_boundary() {
        let mut msg = "y".repeat(LOG_ENTRY_MAX - 1);
        msg.push('\u{00E9}'); // two bytes, straddles the limit
        let entry = LogEntry::new(&msg);
        assert_eq!(entry.as_str().len(), LOG_ENTRY_MAX - 1);
        assert!(entry.as_str().chars().all(|c| c == 'y'));
    }

    #[test]
    fn test_slot_bytes_nul_padded() {
        let slot = LogEntry::new("abc").slot_bytes();
        assert_eq!(&slot[..3], b"abc");
        assert!(slot[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_local_ring_cursor_advances_then_writes() {
        let mut ring = LocalRing::new();
        ring.collect(&LogEntry::new("first")).unwrap();
        // First message lands at slot one, not slot zero.
        assert_eq!(ring.cursor(), 1);
        assert_eq!(ring.slots[1].as_str(), "first");
        assert!(ring.slots[0].is_empty());
    }

    #[test]
    fn test_local_ring_keeps_last_n_in_relative_order() {
        let mut ring = LocalRing::new();
        for i in 0..LOG_MAX_RECS + 1 {
            ring.collect(&LogEntry::new(&format!("m{i}\r\n"))).unwrap();
        }

        // Ring order starting after the cursor is the original relative
        // order of the surviving (last N) messages.
        let cursor = ring.cursor();
        let chronological: Vec<&str> = (1..=LOG_MAX_RECS)
            .map(|step| ring.slots[(cursor + step) % LOG_MAX_RECS].as_str())
            .collect();
        let expected: Vec<String> = (1..=LOG_MAX_RECS).map(|i| format!("m{i}")).collect();
        assert_eq!(chronological, expected);
    }

    #[test]
    fn test_engine_starts_local_and_switches_once() {
        let mut engine = CaptureEngine::new(seeded_region());
        assert_eq!(engine.mode(), CaptureMode::Local);

        engine.collect("early message\r\n").unwrap();
        assert_eq!(engine.shared_ring().write_index().unwrap(), 0);

        engine.switch_to_shared().unwrap();
        assert_eq!(engine.mode(), CaptureMode::SharedChannel);

        engine.collect("late message\r\n").unwrap();
        assert_eq!(engine.shared_ring().write_index().unwrap(), 1);
    }

    #[test]
    fn test_switch_fails_without_channel_record() {
        let bare: Arc<dyn MemoryRegion> = Arc::new(MappedRegion::anon(LOG_BUFFER_LEN).unwrap());
        let mut engine = CaptureEngine::new(bare);

        assert!(engine.switch_to_shared().is_err());
        // No half-transition: capture stays local.
        assert_eq!(engine.mode(), CaptureMode::Local);
        assert!(engine.collect("still local").is_ok());
    }

    #[test]
    fn test_replay_local_pushes_non_empty_slots() {
        let mut engine = CaptureEngine::new(seeded_region());
        engine.collect("one\r\n").unwrap();
        engine.collect("two\r\n").unwrap();

        engine.switch_to_shared().unwrap();
        engine.replay_local().unwrap();

        let mut seen = Vec::new();
        engine
            .shared_ring()
            .dump(|text| seen.push(text.to_owned()))
            .unwrap();
        assert_eq!(seen, vec!["one".to_owned(), "two".to_owned()]);
    }
}
