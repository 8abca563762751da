//! Verbosity levels for output and logging thresholds.
//!
//! Levels are ordered least to most verbose. `Max` is a range sentinel used
//! only for validation and is never a valid threshold or message level.

use std::fmt;
use std::str::FromStr;

/// Ordered verbosity level.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Errors only.
    ErrorOnly = 0,
    /// Warnings and errors.
    Warning = 1,
    /// General information.
    Info = 2,
    /// Most verbose, development detail.
    Debug = 3,
    /// Range sentinel. Never a valid level.
    Max = 4,
}

impl Verbosity {
    /// Number of valid levels (the sentinel's raw value).
    pub const COUNT: u32 = Verbosity::Max as u32;

    /// True for every level strictly below the sentinel.
    pub const fn is_valid(self) -> bool {
        (self as u32) < Verbosity::COUNT
    }

    /// Convert a raw value back into a level. The sentinel and anything
    /// above it are rejected.
    pub const fn from_raw(value: u32) -> Option<Verbosity> {
        match value {
            0 => Some(Verbosity::ErrorOnly),
            1 => Some(Verbosity::Warning),
            2 => Some(Verbosity::Info),
            3 => Some(Verbosity::Debug),
            _ => None,
        }
    }

    /// Stable lowercase label, also accepted by [`FromStr`].
    pub const fn label(self) -> &'static str {
        match self {
            Verbosity::ErrorOnly => "error",
            Verbosity::Warning => "warning",
            Verbosity::Info => "info",
            Verbosity::Debug => "debug",
            Verbosity::Max => "max",
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Verbosity::ErrorOnly),
            "warning" | "warn" => Ok(Verbosity::Warning),
            "info" => Ok(Verbosity::Info),
            "debug" => Ok(Verbosity::Debug),
            other => Err(format!("unknown verbosity level: {other}")),
        }
    }
}
