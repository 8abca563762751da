//! # Boot-Log Diagnostic Tool
//!
//! Command-line front end for the printing & logging library: seeds the
//! shared log channel, emits test messages through the arbitration path,
//! and replays or clears the persistent boot log.
//!
//! # Usage
//!
//! ```bash
//! # Seed the channel record and zero the log buffer
//! plog_diagnostic --shm-path /dev/shm/boot_log --fsbl-path /dev/shm/fsbl_log init-channel
//!
//! # Emit a message, then dump the shared log
//! plog_diagnostic -c plog.toml emit --level info "axis homed"
//! plog_diagnostic -c plog.toml dump
//! ```

use clap::{Parser, Subcommand};
use plog::layout::{FSBL_LOG_SIZE, LOG_BUFFER_LEN};
use plog::{ChannelRecord, Logger, MappedRegion, MemoryRegion, Providers, SharedRing, Verbosity};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::{ConfigError, DiagnosticConfig};

/// Inspect and drive the boot-log channel in shared memory.
#[derive(Parser, Debug)]
#[command(name = "plog_diagnostic")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Inspect and drive the boot-log channel in shared memory")]
struct Args {
    /// Path to a TOML configuration file. CLI flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File backing the shared memory region.
    #[arg(long, value_name = "FILE")]
    shm_path: Option<PathBuf>,

    /// File backing the FSBL boot-log region.
    #[arg(long, value_name = "FILE")]
    fsbl_path: Option<PathBuf>,

    /// Console output threshold (error|warning|info|debug).
    #[arg(long)]
    output_level: Option<Verbosity>,

    /// Boot-log capture threshold (error|warning|info|debug).
    #[arg(long)]
    logging_level: Option<Verbosity>,

    /// Enable verbose internal logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed the channel record and zero the log buffer.
    InitChannel,
    /// Emit one message through the arbitration path.
    Emit {
        /// Message level.
        #[arg(long, default_value = "info")]
        level: Verbosity,
        /// Message text.
        message: String,
    },
    /// Print every record in the shared log buffer.
    Dump,
    /// Print the FSBL boot log.
    DumpFsbl,
    /// Switch capture to the shared channel and replay boot records.
    SendBootRecords,
    /// Zero the shared log buffer.
    ClearLog,
    /// Print stat and error counters.
    Stats,
    /// Reset stat and error counters.
    ClearStats,
}

/// Fully resolved settings: config file values with CLI overrides applied.
struct Settings {
    shm_path: PathBuf,
    fsbl_path: PathBuf,
    shm_len: usize,
    buffer_offset: u32,
    output_level: Verbosity,
    logging_level: Verbosity,
}

impl Settings {
    fn resolve(args: &Args) -> Result<Settings, ConfigError> {
        let config = match &args.config {
            Some(path) => Some(DiagnosticConfig::load(path)?),
            None => None,
        };

        let shm_path = args
            .shm_path
            .clone()
            .or_else(|| config.as_ref().map(|c| c.shm_path.clone()))
            .ok_or_else(|| {
                ConfigError::ValidationError("shm_path required (flag or config file)".into())
            })?;
        let fsbl_path = args
            .fsbl_path
            .clone()
            .or_else(|| config.as_ref().map(|c| c.fsbl_path.clone()))
            .ok_or_else(|| {
                ConfigError::ValidationError("fsbl_path required (flag or config file)".into())
            })?;

        let output_level = match args.output_level {
            Some(level) => level,
            None => config
                .as_ref()
                .map(DiagnosticConfig::parsed_output_level)
                .transpose()?
                .unwrap_or(Verbosity::Info),
        };
        let logging_level = match args.logging_level {
            Some(level) => level,
            None => config
                .as_ref()
                .map(DiagnosticConfig::parsed_logging_level)
                .transpose()?
                .unwrap_or(Verbosity::Info),
        };

        Ok(Settings {
            shm_path,
            fsbl_path,
            shm_len: config
                .as_ref()
                .map(|c| c.shm_len)
                .unwrap_or_else(config::default_shm_len),
            buffer_offset: config
                .as_ref()
                .map(|c| c.buffer_offset)
                .unwrap_or_else(config::default_buffer_offset),
            output_level,
            logging_level,
        })
    }

    fn shared_region(&self) -> plog::PlogResult<Arc<dyn MemoryRegion>> {
        Ok(Arc::new(MappedRegion::open(&self.shm_path, self.shm_len)?))
    }

    fn fsbl_region(&self) -> plog::PlogResult<Arc<dyn MemoryRegion>> {
        Ok(Arc::new(MappedRegion::open(&self.fsbl_path, FSBL_LOG_SIZE)?))
    }

    fn logger(&self) -> plog::PlogResult<Logger> {
        let providers = Providers::new(self.shared_region()?, self.fsbl_region()?)?;
        Logger::new(self.output_level, self.logging_level, providers)
    }
}

fn main() {
    if let Err(e) = run() {
        error!("plog_diagnostic failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_tracing(&args);

    let settings = Settings::resolve(&args)?;

    match &args.command {
        Command::InitChannel => {
            let shared = settings.shared_region()?;
            ChannelRecord {
                buffer_offset: settings.buffer_offset,
                buffer_length: LOG_BUFFER_LEN as u32,
            }
            .store(&*shared)?;
            SharedRing::new(shared).clear()?;
            info!(path = %settings.shm_path.display(), "log channel initialised");
        }
        Command::Emit { level, message } => {
            settings
                .logger()?
                .output(*level, format_args!("{message}\r\n"))?;
        }
        Command::Dump => settings.logger()?.dump_log()?,
        Command::DumpFsbl => settings.logger()?.dump_fsbl_log()?,
        Command::SendBootRecords => settings.logger()?.send_boot_records()?,
        Command::ClearLog => {
            settings.logger()?.clear_log()?;
            info!("log buffer cleared");
        }
        Command::Stats => settings.logger()?.print_statistics()?,
        Command::ClearStats => {
            settings.logger()?.clear_statistics()?;
            info!("statistics cleared");
        }
    }

    Ok(())
}

fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
