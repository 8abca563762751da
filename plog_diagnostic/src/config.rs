//! TOML configuration for the diagnostic tool.
//!
//! # TOML Example
//!
//! ```toml
//! shm_path = "/dev/shm/boot_log"
//! fsbl_path = "/dev/shm/fsbl_log"
//! output_level = "info"
//! logging_level = "debug"
//! ```

use plog::Verbosity;
use plog::layout::{CHANNEL_RECORD_OFFSET, CHANNEL_RECORD_SIZE, LOG_BUFFER_LEN};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Region length that exactly fits the channel record plus the log buffer.
pub(crate) fn default_shm_len() -> usize {
    CHANNEL_RECORD_OFFSET + CHANNEL_RECORD_SIZE + LOG_BUFFER_LEN
}

/// Log buffer placed immediately after the channel record.
pub(crate) fn default_buffer_offset() -> u32 {
    (CHANNEL_RECORD_OFFSET + CHANNEL_RECORD_SIZE) as u32
}

fn default_level() -> String {
    "info".to_string()
}

/// Diagnostic tool configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticConfig {
    /// File backing the shared memory region.
    pub shm_path: PathBuf,

    /// File backing the FSBL boot-log region.
    pub fsbl_path: PathBuf,

    /// Total length of the shared region in bytes.
    #[serde(default = "default_shm_len")]
    pub shm_len: usize,

    /// Offset of the log buffer inside the shared region.
    #[serde(default = "default_buffer_offset")]
    pub buffer_offset: u32,

    /// Console output threshold.
    #[serde(default = "default_level")]
    pub output_level: String,

    /// Boot-log capture threshold.
    #[serde(default = "default_level")]
    pub logging_level: String,
}

impl DiagnosticConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<DiagnosticConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        let config: DiagnosticConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// The buffer must sit past the channel record and fit in the region,
    /// and both thresholds must name known levels.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let record_end = (CHANNEL_RECORD_OFFSET + CHANNEL_RECORD_SIZE) as u32;
        if self.buffer_offset < record_end {
            return Err(ConfigError::ValidationError(format!(
                "buffer_offset {:#x} overlaps the channel record",
                self.buffer_offset
            )));
        }
        let end = self.buffer_offset as usize + LOG_BUFFER_LEN;
        if end > self.shm_len {
            return Err(ConfigError::ValidationError(format!(
                "log buffer ends at {end:#x}, past shm_len {:#x}",
                self.shm_len
            )));
        }
        self.parsed_output_level()?;
        self.parsed_logging_level()?;
        Ok(())
    }

    /// Console output threshold as a level.
    pub fn parsed_output_level(&self) -> Result<Verbosity, ConfigError> {
        self.output_level
            .parse()
            .map_err(ConfigError::ValidationError)
    }

    /// Boot-log capture threshold as a level.
    pub fn parsed_logging_level(&self) -> Result<Verbosity, ConfigError> {
        self.logging_level
            .parse()
            .map_err(ConfigError::ValidationError)
    }
}
