//! Output arbitration: bounded formatting and gated emission.
//!
//! Both print entry points render into a fixed-size buffer, then try the
//! emission gate with a bounded wait. A timed-out or failed gate never drops
//! a message: the print proceeds unsynchronized and is counted as such.
//! Availability over exclusivity, by contract.

use crate::error::{PlogError, PlogResult};
use crate::layout::{EMIT_TIMEOUT_MS, PRINT_BUFFER_SIZE};
use crate::level::Verbosity;
use crate::logger::Logger;
use crate::stats::{ErrorCounter, Stat};
use crate::sync::Timeout;
use std::fmt;
use std::sync::atomic::Ordering;

/// `fmt::Write` adaptor that truncates instead of failing once the bounded
/// buffer is full.
struct TruncatingWriter<'a, const N: usize>(&'a mut heapless::String<N>);

impl<const N: usize> fmt::Write for TruncatingWriter<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.0.push_str(s).is_ok() {
            return Ok(());
        }
        for ch in s.chars() {
            if self.0.push(ch).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Render format arguments into the bounded print buffer.
pub(crate) fn render(args: fmt::Arguments<'_>) -> heapless::String<PRINT_BUFFER_SIZE> {
    let mut buf = heapless::String::new();
    let _ = fmt::write(&mut TruncatingWriter(&mut buf), args);
    buf
}

impl Logger {
    /// Task-safe print with verbosity checks.
    ///
    /// Under the gate, the rendered message goes to the console when the
    /// output threshold allows it and into the capture engine when the
    /// logging threshold allows it. On gate timeout the message is printed
    /// unconditionally on the unsynchronized fallback path.
    pub fn output(&self, level: Verbosity, args: fmt::Arguments<'_>) -> PlogResult<()> {
        self.guard()?;
        if !level.is_valid() {
            self.error(ErrorCounter::ValidationFailed);
            return Err(PlogError::InvalidLevel {
                value: level as u32,
            });
        }

        let buf = render(args);

        match self.sync.gate_acquire(Timeout::Millis(EMIT_TIMEOUT_MS)) {
            Ok(()) => {
                self.stat(Stat::GateAcquired);

                if self.output_level.load(Ordering::Relaxed) >= level as u32 {
                    self.console.write(&buf);
                    self.stat(Stat::SafePrint);
                }

                if self.logging_level.load(Ordering::Relaxed) >= level as u32 {
                    match self.capture.lock().collect(&buf) {
                        Ok(()) => self.stat(Stat::CollectOk),
                        Err(err) => self.count_collect_failure(&err),
                    }
                }

                match self.sync.gate_release() {
                    Ok(()) => self.stat(Stat::GateReleased),
                    Err(_) => self.error(ErrorCounter::GateReleaseFailed),
                }
                Ok(())
            }
            Err(_) => {
                // Gate busy or stuck: never silence diagnostics.
                self.error(ErrorCounter::GateAcquireFailed);
                self.console.write(&buf);
                self.stat(Stat::UnsafePrint);
                Ok(())
            }
        }
    }

    /// Task-safe print without verbosity checks. Never forwards to the
    /// capture engine; usable before initialisation (prints unsynchronized
    /// in that window).
    pub fn printf(&self, args: fmt::Arguments<'_>) -> PlogResult<()> {
        self.guard_sentinels()?;

        let buf = render(args);

        if !self.initialised.load(Ordering::Acquire) {
            self.console.write(&buf);
            self.stat(Stat::UnsafePrint);
            return Ok(());
        }

        match self.sync.gate_acquire(Timeout::Millis(EMIT_TIMEOUT_MS)) {
            Ok(()) => {
                self.stat(Stat::GateAcquired);
                self.console.write(&buf);
                self.stat(Stat::SafePrint);
                match self.sync.gate_release() {
                    Ok(()) => self.stat(Stat::GateReleased),
                    Err(_) => self.error(ErrorCounter::GateReleaseFailed),
                }
                Ok(())
            }
            Err(_) => {
                self.error(ErrorCounter::GateAcquireFailed);
                self.console.write(&buf);
                self.stat(Stat::UnsafePrint);
                Ok(())
            }
        }
    }

    pub(crate) fn count_collect_failure(&self, err: &PlogError) {
        match err {
            PlogError::ChannelLoad => self.error(ErrorCounter::ChannelLoadFailed),
            PlogError::ChannelStore { .. } => self.error(ErrorCounter::ChannelStoreFailed),
            _ => {}
        }
        self.error(ErrorCounter::CollectFailed);
    }
}

/// Print through the process-wide logger at the given level.
#[macro_export]
macro_rules! output {
    ($level:expr, $($arg:tt)*) => {
        if let Some(logger) = $crate::instance() {
            let _ = logger.output($level, ::core::format_args!($($arg)*));
        }
    };
}

/// Print through the process-wide logger, ignoring verbosity.
#[macro_export]
macro_rules! printf {
    ($($arg:tt)*) => {
        if let Some(logger) = $crate::instance() {
            let _ = logger.printf(::core::format_args!($($arg)*));
        }
    };
}

/// Error-level print through the process-wide logger.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { $crate::output!($crate::Verbosity::ErrorOnly, $($arg)*) };
}

/// Warning-level print through the process-wide logger.
#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => { $crate::output!($crate::Verbosity::Warning, $($arg)*) };
}

/// Info-level print through the process-wide logger.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { $crate::output!($crate::Verbosity::Info, $($arg)*) };
}

/// Debug-level print through the process-wide logger.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { $crate::output!($crate::Verbosity::Debug, $($arg)*) };
}
