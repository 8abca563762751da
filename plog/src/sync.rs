//! Synchronization provider seam.
//!
//! Two primitives serialize this module: a mutual-exclusion *lock* guarding
//! the verbosity levels (blocking, unbounded wait, not reentrant) and a
//! binary counting *gate* serializing console/log emission (bounded wait;
//! callers fall back to an unsynchronized path on timeout). Both are modelled
//! with explicit acquire/release so every failure branch stays distinct and
//! countable.

use parking_lot::RawMutex;
use parking_lot::lock_api::{RawMutex as _, RawMutexTimed as _};
use std::time::Duration;
use thiserror::Error;

/// Wait bound for an acquire operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Block until the primitive is available.
    Forever,
    /// Give up after the given number of milliseconds.
    Millis(u64),
}

/// Errors reported by the synchronization provider
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    /// Primitive could not be created
    #[error("Failed to create {name}")]
    Create {
        /// Primitive name
        name: &'static str,
    },

    /// Bounded acquire timed out
    #[error("Timed out acquiring {name}")]
    Timeout {
        /// Primitive name
        name: &'static str,
    },

    /// Acquire failed outright
    #[error("Failed to acquire {name}")]
    Acquire {
        /// Primitive name
        name: &'static str,
    },

    /// Release failed
    #[error("Failed to release {name}")]
    Release {
        /// Primitive name
        name: &'static str,
    },
}

/// Result type for synchronization operations
pub type SyncResult = Result<(), SyncError>;

/// Opaque provider of the lock and gate primitives.
///
/// `release` must only be called after a successful `acquire` on the same
/// primitive; the provider does not track ownership.
pub trait SyncPrimitives: Send + Sync {
    /// Acquire the level lock.
    fn lock_acquire(&self, timeout: Timeout) -> SyncResult;
    /// Release the level lock.
    fn lock_release(&self) -> SyncResult;
    /// Acquire the emission gate.
    fn gate_acquire(&self, timeout: Timeout) -> SyncResult;
    /// Release the emission gate.
    fn gate_release(&self) -> SyncResult;
    /// Suspend the calling task for the given interval.
    fn sleep_ms(&self, ms: u64);
}

const LOCK_NAME: &str = "level lock";
const GATE_NAME: &str = "emit gate";

/// Production provider backed by `parking_lot` raw mutexes.
pub struct OsSync {
    lock: RawMutex,
    gate: RawMutex,
}

impl OsSync {
    /// Create both primitives. Returns a result per the provider contract
    /// even though `parking_lot` construction cannot fail.
    pub fn create() -> Result<OsSync, SyncError> {
        Ok(OsSync {
            lock: RawMutex::INIT,
            gate: RawMutex::INIT,
        })
    }

    fn acquire(raw: &RawMutex, timeout: Timeout, name: &'static str) -> SyncResult {
        match timeout {
            Timeout::Forever => {
                raw.lock();
                Ok(())
            }
            Timeout::Millis(ms) => {
                if raw.try_lock_for(Duration::from_millis(ms)) {
                    Ok(())
                } else {
                    Err(SyncError::Timeout { name })
                }
            }
        }
    }

    fn release(raw: &RawMutex) -> SyncResult {
        // Contract: only called while held by the acquiring context.
        unsafe { raw.unlock() };
        Ok(())
    }
}

impl SyncPrimitives for OsSync {
    fn lock_acquire(&self, timeout: Timeout) -> SyncResult {
        Self::acquire(&self.lock, timeout, LOCK_NAME)
    }

    fn lock_release(&self) -> SyncResult {
        Self::release(&self.lock)
    }

    fn gate_acquire(&self, timeout: Timeout) -> SyncResult {
        Self::acquire(&self.gate, timeout, GATE_NAME)
    }

    fn gate_release(&self) -> SyncResult {
        Self::release(&self.gate)
    }

    fn sleep_ms(&self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}
