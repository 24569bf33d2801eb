//! Save modes.
//!
//! Defines how a save replaces the file already on disk.

/// How a blob write replaces the previous file.
///
/// # Mode Comparison
///
/// | Mode | Interrupted write leaves | Extra I/O |
/// |------|--------------------------|-----------|
/// | Atomic | previous version intact | temp file, fsync, rename, directory fsync |
/// | Direct | truncated or partial file | none |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveMode {
    /// Write a sibling temp file, fsync it, rename over the target, then
    /// fsync the directory so the rename itself is durable.
    #[default]
    Atomic,

    /// Truncate the target and write in place.
    ///
    /// The old contents are gone the moment the write begins.
    Direct,
}

impl SaveMode {
    /// Check if this mode stages writes through a temp file.
    pub fn is_staged(&self) -> bool {
        matches!(self, SaveMode::Atomic)
    }

    /// Human-readable description of the mode.
    pub fn description(&self) -> &'static str {
        match self {
            SaveMode::Atomic => "Atomic replace (temp file + rename)",
            SaveMode::Direct => "Direct overwrite (truncate + write)",
        }
    }
}
