//! Reader and dataset configuration.

use std::env;
use std::path::PathBuf;

/// Environment variable that overrides the dataset working directory.
pub const WORKING_DIRECTORY_ENV: &str = "RECSET_WORKING_DIRECTORY";

/// Configuration shared by readers and dataset adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root directory under which each dataset keeps its files.
    pub working_directory: PathBuf,

    /// Whether TFRecord frame checksums are verified.
    pub verify_crc: bool,

    /// Whether a short read of RecordIO padding is a framing error.
    ///
    /// Off by default: a truncated final padding is logged and ignored.
    pub strict_padding: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            working_directory: env::temp_dir().join("recset"),
            verify_crc: true,
            strict_padding: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a default configuration, taking the working directory from
    /// `RECSET_WORKING_DIRECTORY` when it is set and non-empty.
    #[must_use]
    pub fn from_env() -> Self {
        let config = Self::default();
        match env::var_os(WORKING_DIRECTORY_ENV) {
            Some(dir) if !dir.is_empty() => config.working_directory(dir),
            _ => config,
        }
    }

    /// Sets the working directory.
    #[must_use]
    pub fn working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = dir.into();
        self
    }

    /// Sets whether TFRecord checksums are verified.
    #[must_use]
    pub const fn verify_crc(mut self, value: bool) -> Self {
        self.verify_crc = value;
        self
    }

    /// Sets whether short padding reads are errors.
    #[must_use]
    pub const fn strict_padding(mut self, value: bool) -> Self {
        self.strict_padding = value;
        self
    }
}
