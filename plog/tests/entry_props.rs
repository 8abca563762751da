//! Property tests for log entry normalisation.

use plog::LogEntry;
use plog::layout::LOG_ENTRY_MAX;
use proptest::prelude::*;

proptest! {
    #[test]
    fn entry_never_exceeds_max_bytes(text in ".{0,600}") {
        let entry = LogEntry::new(&text);
        prop_assert!(entry.as_str().len() <= LOG_ENTRY_MAX);
    }

    #[test]
    fn entry_is_a_prefix_of_the_input(text in ".{0,600}") {
        let entry = LogEntry::new(&text);
        prop_assert!(text.starts_with(entry.as_str()));
    }

    #[test]
    fn entry_has_no_trailing_line_breaks(text in ".{0,600}") {
        let entry = LogEntry::new(&text);
        let kept = entry.as_str();
        prop_assert!(!kept.ends_with('\r') && !kept.ends_with('\n'));
    }

    #[test]
    fn short_text_without_breaks_passes_through(text in "[a-zA-Z0-9 ]{0,200}") {
        let entry = LogEntry::new(&text);
        prop_assert_eq!(entry.as_str(), text.as_str());
    }

    #[test]
    fn slot_bytes_round_trip(text in "[^\\x00]{0,300}") {
        let entry = LogEntry::new(&text);
        let slot = entry.slot_bytes();
        let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
        prop_assert_eq!(std::str::from_utf8(&slot[..end]).unwrap(), entry.as_str());
    }
}
