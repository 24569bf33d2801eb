//! File logging.
//!
//! Library code only emits `tracing` events. Applications that want them
//! on disk call [`init_file_logging`] once at startup; it installs a global
//! `tracing-subscriber` formatter that writes one line per event with
//! level, timestamp, message, and source location.

use crate::error::{Error, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;

/// Default log file, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "varstore.log";

/// Log sink settings.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// File the log lines go to
    pub path: PathBuf,
    /// Most verbose level recorded
    pub level: Level,
    /// Truncate the file on init instead of appending
    pub truncate: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            path: PathBuf::from(DEFAULT_LOG_FILE),
            level: Level::DEBUG,
            truncate: true,
        }
    }
}

impl LogConfig {
    /// Default settings writing to `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        LogConfig {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Set the maximum level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Keep existing log contents.
    pub fn append(mut self) -> Self {
        self.truncate = false;
        self
    }
}

/// Install a global subscriber writing to the configured file.
///
/// # Errors
///
/// - [`Error::Io`] if the log file cannot be opened
/// - [`Error::Logging`] if a global subscriber is already installed
pub fn init_file_logging(config: &LogConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(config.truncate)
        .append(!config.truncate)
        .open(&config.path)?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(config.level)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
