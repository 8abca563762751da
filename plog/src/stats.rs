//! Statistics and error instrumentation.
//!
//! Every operation bumps exactly one stat per successful sub-step and one
//! error per distinct failure branch. Counters are plain saturating-free
//! atomics; wrapping after 2^32 events is acceptable for diagnostics.

use std::sync::atomic::{AtomicU32, Ordering};

/// Success counters.
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    /// Overall initialisation completed.
    InitComplete,
    /// Level lock created.
    LockCreated,
    /// Emission gate created.
    GateCreated,
    /// Level lock acquired.
    LockAcquired,
    /// Level lock released.
    LockReleased,
    /// Emission gate acquired.
    GateAcquired,
    /// Emission gate released.
    GateReleased,
    /// Print emitted under the gate.
    SafePrint,
    /// Print emitted on the unsynchronized fallback path.
    UnsafePrint,
    /// Verbosity level changed.
    LevelChanged,
    /// Verbosity level read.
    LevelRead,
    /// Log entry collected.
    CollectOk,
    /// FSBL log region copied out.
    FsblCopied,
}

impl Stat {
    /// Number of stat kinds.
    pub const COUNT: usize = Stat::FsblCopied as usize + 1;

    /// Stable display label.
    pub const fn label(self) -> &'static str {
        match self {
            Stat::InitComplete => "init complete",
            Stat::LockCreated => "lock created",
            Stat::GateCreated => "gate created",
            Stat::LockAcquired => "lock acquired",
            Stat::LockReleased => "lock released",
            Stat::GateAcquired => "gate acquired",
            Stat::GateReleased => "gate released",
            Stat::SafePrint => "thread safe prints",
            Stat::UnsafePrint => "non thread safe prints",
            Stat::LevelChanged => "level changed",
            Stat::LevelRead => "level read",
            Stat::CollectOk => "log collect ok",
            Stat::FsblCopied => "fsbl log copied",
        }
    }

    /// All kinds in display order.
    pub const ALL: [Stat; Stat::COUNT] = [
        Stat::InitComplete,
        Stat::LockCreated,
        Stat::GateCreated,
        Stat::LockAcquired,
        Stat::LockReleased,
        Stat::GateAcquired,
        Stat::GateReleased,
        Stat::SafePrint,
        Stat::UnsafePrint,
        Stat::LevelChanged,
        Stat::LevelRead,
        Stat::CollectOk,
        Stat::FsblCopied,
    ];
}

/// Failure counters.
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCounter {
    /// Level lock creation failed.
    LockCreateFailed,
    /// Emission gate creation failed.
    GateCreateFailed,
    /// Level lock acquire failed.
    LockAcquireFailed,
    /// Level lock release failed.
    LockReleaseFailed,
    /// Emission gate acquire failed or timed out.
    GateAcquireFailed,
    /// Emission gate release failed.
    GateReleaseFailed,
    /// Precondition or argument validation failed.
    ValidationFailed,
    /// Log-channel record load failed.
    ChannelLoadFailed,
    /// Shared ring slot store failed.
    ChannelStoreFailed,
    /// Log collection failed.
    CollectFailed,
}

impl ErrorCounter {
    /// Number of error kinds.
    pub const COUNT: usize = ErrorCounter::CollectFailed as usize + 1;

    /// Stable display label.
    pub const fn label(self) -> &'static str {
        match self {
            ErrorCounter::LockCreateFailed => "lock create failed",
            ErrorCounter::GateCreateFailed => "gate create failed",
            ErrorCounter::LockAcquireFailed => "lock acquire failed",
            ErrorCounter::LockReleaseFailed => "lock release failed",
            ErrorCounter::GateAcquireFailed => "gate acquire failed",
            ErrorCounter::GateReleaseFailed => "gate release failed",
            ErrorCounter::ValidationFailed => "validation failed",
            ErrorCounter::ChannelLoadFailed => "channel load failed",
            ErrorCounter::ChannelStoreFailed => "channel store failed",
            ErrorCounter::CollectFailed => "log collect failed",
        }
    }

    /// All kinds in display order.
    pub const ALL: [ErrorCounter; ErrorCounter::COUNT] = [
        ErrorCounter::LockCreateFailed,
        ErrorCounter::GateCreateFailed,
        ErrorCounter::LockAcquireFailed,
        ErrorCounter::LockReleaseFailed,
        ErrorCounter::GateAcquireFailed,
        ErrorCounter::GateReleaseFailed,
        ErrorCounter::ValidationFailed,
        ErrorCounter::ChannelLoadFailed,
        ErrorCounter::ChannelStoreFailed,
        ErrorCounter::CollectFailed,
    ];
}

/// Fixed array of event counters.
pub struct CounterSet<const N: usize> {
    counts: [AtomicU32; N],
}

impl<const N: usize> CounterSet<N> {
    /// All counters at zero.
    pub fn new() -> CounterSet<N> {
        CounterSet {
            counts: std::array::from_fn(|_| AtomicU32::new(0)),
        }
    }

    /// Increment one counter.
    pub fn bump(&self, index: usize) {
        if index < N {
            self.counts[index].fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Current value of one counter.
    pub fn get(&self, index: usize) -> u32 {
        if index < N {
            self.counts[index].load(Ordering::Relaxed)
        } else {
            0
        }
    }

    /// Copy of every counter value.
    pub fn snapshot(&self) -> [u32; N] {
        std::array::from_fn(|i| self.counts[i].load(Ordering::Relaxed))
    }

    /// Reset every counter to zero.
    pub fn clear(&self) {
        for count in &self.counts {
            count.store(0, Ordering::Relaxed);
        }
    }
}

impl<const N: usize> Default for CounterSet<N> {
    fn default() -> Self {
        Self::new()
    }
}
