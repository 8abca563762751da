//! Process-wide logger state, guard layer and level control.

use crate::capture::CaptureEngine;
use crate::console::{Console, StdoutConsole};
use crate::error::{PlogError, PlogResult};
use crate::level::Verbosity;
use crate::region::MemoryRegion;
use crate::stats::{CounterSet, ErrorCounter, Stat};
use crate::sync::{OsSync, SyncError, SyncPrimitives, Timeout};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tracing::debug;

// Corruption-detection sentinels bracketing the state. Written once at
// construction; a mismatch at any entry point aborts the operation.
const UPPER_FIREWALL: u32 = 0xBABE_CAFE;
const LOWER_FIREWALL: u32 = 0xDEAD_FACE;

/// External collaborators the logger is built over.
pub struct Providers {
    /// Lock and gate primitives.
    pub sync: Arc<dyn SyncPrimitives>,
    /// Console sink for rendered output.
    pub console: Arc<dyn Console>,
    /// Shared region holding the partition table and log channel.
    pub shared: Arc<dyn MemoryRegion>,
    /// Fixed region holding the FSBL boot log.
    pub fsbl: Arc<dyn MemoryRegion>,
}

impl Providers {
    /// Default providers: `parking_lot` primitives and stdout, over the
    /// given regions.
    pub fn new(
        shared: Arc<dyn MemoryRegion>,
        fsbl: Arc<dyn MemoryRegion>,
    ) -> Result<Providers, SyncError> {
        Ok(Providers {
            sync: Arc::new(OsSync::create()?),
            console: Arc::new(StdoutConsole),
            shared,
            fsbl,
        })
    }
}

/// Printing and logging state: verbosity thresholds, the dual-mode capture
/// engine, provider handles and instrumentation counters, bracketed by
/// corruption sentinels.
///
/// One instance per process is installed via [`init`]; explicit instances
/// remain constructible for embedding and tests.
pub struct Logger {
    upper_firewall: u32,

    pub(crate) initialised: AtomicBool,

    // Guarded by the provider lock; atomics only for safe shared access.
    pub(crate) output_level: AtomicU32,
    pub(crate) logging_level: AtomicU32,

    pub(crate) capture: Mutex<CaptureEngine>,

    pub(crate) sync: Arc<dyn SyncPrimitives>,
    pub(crate) console: Arc<dyn Console>,
    pub(crate) fsbl: Arc<dyn MemoryRegion>,

    pub(crate) stats: CounterSet<{ Stat::COUNT }>,
    pub(crate) errors: CounterSet<{ ErrorCounter::COUNT }>,

    lower_firewall: u32,
}

impl Logger {
    /// Build a logger over the given providers.
    ///
    /// Fails on an out-of-range level. The capture engine starts in local
    /// mode; the shared channel becomes the target only once
    /// [`Logger::send_boot_records`] runs.
    pub fn new(
        output_level: Verbosity,
        logging_level: Verbosity,
        providers: Providers,
    ) -> PlogResult<Logger> {
        if !output_level.is_valid() {
            return Err(PlogError::InvalidLevel {
                value: output_level as u32,
            });
        }
        if !logging_level.is_valid() {
            return Err(PlogError::InvalidLevel {
                value: logging_level as u32,
            });
        }

        let logger = Logger {
            upper_firewall: UPPER_FIREWALL,
            initialised: AtomicBool::new(false),
            output_level: AtomicU32::new(output_level as u32),
            logging_level: AtomicU32::new(logging_level as u32),
            capture: Mutex::new(CaptureEngine::new(Arc::clone(&providers.shared))),
            sync: providers.sync,
            console: providers.console,
            fsbl: providers.fsbl,
            stats: CounterSet::new(),
            errors: CounterSet::new(),
            lower_firewall: LOWER_FIREWALL,
        };

        logger.stat(Stat::LockCreated);
        logger.stat(Stat::GateCreated);
        logger.initialised.store(true, Ordering::Release);
        logger.stat(Stat::InitComplete);
        debug!(%output_level, %logging_level, "printing and logging module initialised");

        Ok(logger)
    }

    pub(crate) fn stat(&self, stat: Stat) {
        self.stats.bump(stat as usize);
    }

    pub(crate) fn error(&self, error: ErrorCounter) {
        self.errors.bump(error as usize);
    }

    fn sentinels_intact(&self) -> bool {
        self.upper_firewall == UPPER_FIREWALL && self.lower_firewall == LOWER_FIREWALL
    }

    /// Sentinel-only precondition, for the operations allowed to run in the
    /// startup window before full initialisation.
    pub(crate) fn guard_sentinels(&self) -> PlogResult<()> {
        if !self.sentinels_intact() {
            self.errors.bump(ErrorCounter::ValidationFailed as usize);
            return Err(PlogError::StateCorrupted);
        }
        Ok(())
    }

    /// Full precondition: sentinels intact and module initialised.
    pub(crate) fn guard(&self) -> PlogResult<()> {
        self.guard_sentinels()?;
        if !self.initialised.load(Ordering::Acquire) {
            self.error(ErrorCounter::ValidationFailed);
            return Err(PlogError::NotInitialised);
        }
        Ok(())
    }

    /// Run `op` under the level lock (blocking, unbounded wait).
    fn with_level_lock(&self, op: impl FnOnce()) -> PlogResult<()> {
        if let Err(source) = self.sync.lock_acquire(Timeout::Forever) {
            self.error(ErrorCounter::LockAcquireFailed);
            return Err(source.into());
        }
        self.stat(Stat::LockAcquired);

        op();

        match self.sync.lock_release() {
            Ok(()) => {
                self.stat(Stat::LockReleased);
                Ok(())
            }
            Err(source) => {
                self.error(ErrorCounter::LockReleaseFailed);
                Err(source.into())
            }
        }
    }

    fn validate_level(&self, level: Verbosity) -> PlogResult<()> {
        if !level.is_valid() {
            self.error(ErrorCounter::ValidationFailed);
            return Err(PlogError::InvalidLevel {
                value: level as u32,
            });
        }
        Ok(())
    }

    /// Set the console output verbosity threshold.
    pub fn set_output_level(&self, level: Verbosity) -> PlogResult<()> {
        self.guard()?;
        self.validate_level(level)?;
        self.with_level_lock(|| {
            self.output_level.store(level as u32, Ordering::Relaxed);
            self.stat(Stat::LevelChanged);
        })
    }

    /// Current console output verbosity threshold.
    pub fn output_level(&self) -> PlogResult<Verbosity> {
        self.guard()?;
        let mut raw = 0;
        self.with_level_lock(|| {
            raw = self.output_level.load(Ordering::Relaxed);
            self.stat(Stat::LevelRead);
        })?;
        Verbosity::from_raw(raw).ok_or(PlogError::InvalidLevel { value: raw })
    }

    /// Set the boot-log capture verbosity threshold.
    pub fn set_logging_level(&self, level: Verbosity) -> PlogResult<()> {
        self.guard()?;
        self.validate_level(level)?;
        self.with_level_lock(|| {
            self.logging_level.store(level as u32, Ordering::Relaxed);
            self.stat(Stat::LevelChanged);
        })
    }

    /// Current boot-log capture verbosity threshold.
    pub fn logging_level(&self) -> PlogResult<Verbosity> {
        self.guard()?;
        let mut raw = 0;
        self.with_level_lock(|| {
            raw = self.logging_level.load(Ordering::Relaxed);
            self.stat(Stat::LevelRead);
        })?;
        Verbosity::from_raw(raw).ok_or(PlogError::InvalidLevel { value: raw })
    }

    /// Print every stat and error counter with its label. Requires intact
    /// sentinels only, so statistics stay reachable from failure handlers.
    pub fn print_statistics(&self) -> PlogResult<()> {
        self.guard_sentinels()?;

        let _ = self.printf(format_args!(
            "============================================================\r\n"
        ));
        let _ = self.printf(format_args!("Printing & logging statistics:\r\n"));
        // Snapshot first so the report is not skewed by its own prints.
        let stats = self.stats.snapshot();
        let errors = self.errors.snapshot();
        for stat in Stat::ALL {
            let _ = self.printf(format_args!(
                "{:>40} . . . . {}\r\n",
                stat.label(),
                stats[stat as usize]
            ));
        }
        let _ = self.printf(format_args!(
            "------------------------------------------------------------\r\n"
        ));
        let _ = self.printf(format_args!("Printing & logging errors:\r\n"));
        for error in ErrorCounter::ALL {
            let _ = self.printf(format_args!(
                "{:>40} . . . . {}\r\n",
                error.label(),
                errors[error as usize]
            ));
        }
        let _ = self.printf(format_args!(
            "============================================================\r\n"
        ));

        Ok(())
    }

    /// Reset every stat and error counter to zero.
    pub fn clear_statistics(&self) -> PlogResult<()> {
        self.guard()?;
        self.stats.clear();
        self.errors.clear();
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn reset_initialised_for_test(&self) {
        self.initialised.store(false, Ordering::Release);
    }
}

static INSTANCE: OnceLock<Logger> = OnceLock::new();

/// Build the process-wide logger and install it. Callable exactly once;
/// a second call fails with [`PlogError::AlreadyInitialised`].
pub fn init(
    output_level: Verbosity,
    logging_level: Verbosity,
    providers: Providers,
) -> PlogResult<&'static Logger> {
    let logger = Logger::new(output_level, logging_level, providers)?;
    if INSTANCE.set(logger).is_err() {
        return Err(PlogError::AlreadyInitialised);
    }
    INSTANCE.get().ok_or(PlogError::NotInitialised)
}

/// The process-wide logger, if [`init`] has run.
pub fn instance() -> Option<&'static Logger> {
    INSTANCE.get()
}
