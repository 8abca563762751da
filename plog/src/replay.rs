//! Log replay: shared-ring dump, FSBL log dump and boot-record hand-off.

use crate::error::{PlogError, PlogResult};
use crate::layout::{BOOT_DRAIN_SLEEP_MS, FSBL_LOG_SIZE};
use crate::logger::Logger;
use crate::stats::{ErrorCounter, Stat};

impl Logger {
    /// Print every non-empty shared-ring slot through the unsynchronized
    /// `printf` path, refreshing the channel buffer before reading.
    ///
    /// Slots are visited positionally `0..LOG_MAX_RECS`, not from the write
    /// index, so entries older than a wrap can print after newer ones.
    pub fn dump_log(&self) -> PlogResult<()> {
        self.guard()?;

        let _ = self.printf(format_args!(
            "\r\n======================================================================\r\n"
        ));
        let _ = self.printf(format_args!("Dumping log from shared memory...\r\n"));
        let _ = self.printf(format_args!(
            "======================================================================\r\n\r\n"
        ));

        let capture = self.capture.lock();
        let result = capture.shared_ring().dump(|text| {
            let _ = self.printf(format_args!("{text}\r\n"));
        });
        if let Err(PlogError::ChannelLoad) = &result {
            self.error(ErrorCounter::ChannelLoadFailed);
        }
        result
    }

    /// Print the FSBL boot log. The final token is always discarded: the
    /// producer may have left a partial or uninitialised tail.
    pub fn dump_fsbl_log(&self) -> PlogResult<()> {
        self.guard()?;

        let _ = self.printf(format_args!("FSBL boot logs:\r\n"));

        let tokens = self.read_fsbl_tokens()?;
        for token in tokens.iter().take(tokens.len().saturating_sub(1)) {
            let _ = self.printf(format_args!("{token}\r\n"));
        }
        Ok(())
    }

    /// Hand the accumulated boot records over to the shared channel.
    ///
    /// Resets the shared write index, switches capture to the shared ring
    /// (the one-way transition), replays the FSBL log through `collect`,
    /// pauses so a downstream reader can drain the first batch before the
    /// ring wraps, then replays the local pre-ready ring.
    ///
    /// Deliberately does not require the initialised flag: this runs in the
    /// transitional startup window, guarded by the sentinels alone.
    pub fn send_boot_records(&self) -> PlogResult<()> {
        self.guard_sentinels()?;

        {
            let mut capture = self.capture.lock();
            if let Err(err) = capture.switch_to_shared() {
                self.error(ErrorCounter::ChannelLoadFailed);
                return Err(err);
            }

            let tokens = self.read_fsbl_tokens()?;
            for token in tokens.iter().take(tokens.len().saturating_sub(1)) {
                if let Err(err) = capture.collect(token) {
                    self.count_collect_failure(&err);
                }
            }
        }

        // Let the reader consume the FSBL batch before local replay wraps
        // the ring. The capture mutex is not held across the sleep.
        self.sync.sleep_ms(BOOT_DRAIN_SLEEP_MS);

        let mut capture = self.capture.lock();
        capture.replay_local().inspect_err(|err| {
            self.count_collect_failure(err);
        })
    }

    /// Zero and flush the shared log buffer.
    pub fn clear_log(&self) -> PlogResult<()> {
        self.guard()?;

        let capture = self.capture.lock();
        capture.shared_ring().clear().inspect_err(|err| {
            if matches!(err, PlogError::ChannelLoad) {
                self.error(ErrorCounter::ChannelLoadFailed);
            }
        })
    }

    fn read_fsbl_tokens(&self) -> PlogResult<Vec<String>> {
        let mut raw = vec![0u8; self.fsbl.len().min(FSBL_LOG_SIZE)];
        self.fsbl.read(0, &mut raw)?;
        self.stat(Stat::FsblCopied);
        Ok(boot_tokens(&raw))
    }
}

/// Split a raw boot-log region into message tokens.
///
/// Reads up to the first NUL, then splits on CR/LF runs, skipping empty
/// tokens. The caller decides what to do with the possibly-partial tail.
fn boot_tokens(raw: &[u8]) -> Vec<String> {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    let text = String::from_utf8_lossy(&raw[..end]);
    text.split(['\r', '\n'])
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}
