//! # Printing & Logging Library
//!
//! Task-safe formatted output with runtime-adjustable verbosity, plus a
//! persistent boot log that survives across firmware stages by writing into
//! a memory region shared with another processor.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   output!/printf!   ┌─────────────────┐
//! │   Callers    ├────────────────────►│ Output          │──► Console
//! │ (any task)   │                     │ Arbitration     │
//! └──────────────┘                     └───────┬─────────┘
//!                                              │ logging level met
//!                                      ┌───────▼─────────┐
//!                   before ready ──────┤ Capture Engine  ├────── after ready
//!                  ┌─────────────┐     └─────────────────┘    ┌─────────────┐
//!                  │ Local ring  │                            │ Shared ring │
//!                  │ (in-process)│── send_boot_records() ────►│ (flushed to │
//!                  └─────────────┘       replays both         │  remote CPU)│
//!                                                             └─────────────┘
//! ```
//!
//! Messages collected before the shared channel is up are buffered in a
//! local fixed-capacity ring; [`Logger::send_boot_records`] performs the
//! one-way switch to the shared ring and replays the FSBL log and the local
//! ring into it. Every write into the shared ring is flushed before the
//! write index advances, so the remote reader never observes a partial
//! record.
//!
//! ## Usage
//!
//! ```rust
//! use plog::{MappedRegion, MemoryRegion, Providers, Verbosity};
//! use std::sync::Arc;
//!
//! # fn main() -> plog::PlogResult<()> {
//! let shared: Arc<dyn MemoryRegion> = Arc::new(MappedRegion::anon(0x4000)?);
//! let fsbl: Arc<dyn MemoryRegion> = Arc::new(MappedRegion::anon(plog::layout::FSBL_LOG_SIZE)?);
//!
//! let logger = plog::init(
//!     Verbosity::Info,
//!     Verbosity::Info,
//!     Providers::new(shared, fsbl).map_err(plog::PlogError::from)?,
//! )?;
//!
//! logger.output(Verbosity::Info, format_args!("boot stage {} up\r\n", 2))?;
//! plog::log_info!("also via the macro: x={}\r\n", 5);
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure model
//!
//! No operation panics or terminates the process: every failure is a
//! [`PlogError`] plus an incremented error counter. Print paths degrade to
//! an unsynchronized console write instead of dropping messages when the
//! emission gate times out.
//!
//! ## Thread safety
//!
//! - [`Logger`]: all operations take `&self` and are safe from any task.
//! - The level lock blocks unbounded and is not reentrant.
//! - The shared ring assumes a single local writer; a remote processor may
//!   read concurrently, hence the flush discipline.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod capture;
pub mod channel;
pub mod console;
pub mod error;
pub mod layout;
pub mod level;
pub mod logger;
pub mod output;
pub mod region;
pub mod replay;
pub mod stats;
pub mod sync;

pub use capture::{CaptureMode, LogEntry};
pub use channel::{ChannelRecord, SharedRing};
pub use console::{BufferConsole, Console, StdoutConsole};
pub use error::{PlogError, PlogResult};
pub use level::Verbosity;
pub use logger::{Logger, Providers, init, instance};
pub use region::{MappedRegion, MemoryRegion};
pub use stats::{ErrorCounter, Stat};
pub use sync::{OsSync, SyncError, SyncPrimitives, Timeout};
