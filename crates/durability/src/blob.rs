//! Single-file blob persistence
//!
//! A [`BlobFile`] stores exactly one serde value per file, encoded with
//! bincode. There is no header, version, or checksum: the file is the
//! encoded value and nothing else, and readers are responsible for
//! checking that what comes back has the shape they expect.
//!
//! ## Write path
//!
//! ```text
//! Atomic: encode -> write .<name>.tmp -> fsync -> rename over <name> -> fsync dir
//! Direct: encode -> truncate <name> -> write -> fsync
//! ```
//!
//! Encoding happens before the target is touched, so an encode failure
//! never damages the existing file in either mode.

use crate::error::{DurabilityError, Result};
use crate::mode::SaveMode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A file holding one bincode-encoded value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobFile {
    path: PathBuf,
    mode: SaveMode,
}

impl BlobFile {
    /// Create a handle for `path`. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>, mode: SaveMode) -> Self {
        BlobFile {
            path: path.into(),
            mode,
        }
    }

    /// Target file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save mode used by [`BlobFile::write`]
    pub fn mode(&self) -> SaveMode {
        self.mode
    }

    /// Check whether the target file currently exists
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Encode `value` and replace the file with it.
    ///
    /// Returns the number of bytes written.
    pub fn write<T: Serialize + ?Sized>(&self, value: &T) -> Result<u64> {
        let bytes =
            bincode::serialize(value).map_err(|e| DurabilityError::Encode(e.to_string()))?;

        match self.mode {
            SaveMode::Atomic => self.write_staged(&bytes)?,
            SaveMode::Direct => write_synced(&self.path, &bytes)?,
        }

        debug!(
            "Wrote {} bytes to {} ({:?})",
            bytes.len(),
            self.path.display(),
            self.mode
        );
        Ok(bytes.len() as u64)
    }

    /// Read and decode the file.
    pub fn read<T: DeserializeOwned>(&self) -> Result<T> {
        let bytes = fs::read(&self.path).map_err(|e| DurabilityError::io(&self.path, e))?;
        let value = bincode::deserialize(&bytes).map_err(|e| DurabilityError::Decode {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        debug!("Read {} bytes from {}", bytes.len(), self.path.display());
        Ok(value)
    }

    /// Sibling path used to stage atomic writes
    pub fn staging_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parent = self.path.parent().unwrap_or_else(|| Path::new(""));
        parent.join(format!(".{}.tmp", name))
    }

    fn write_staged(&self, bytes: &[u8]) -> Result<()> {
        let staging = self.staging_path();
        if let Err(e) = write_synced(&staging, bytes) {
            discard(&staging);
            return Err(e);
        }
        if let Err(e) = fs::rename(&staging, &self.path) {
            discard(&staging);
            return Err(DurabilityError::io(&self.path, e));
        }
        sync_parent_dir(&self.path)
    }
}

/// Flush the directory entry so a completed rename survives a crash.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| DurabilityError::io(dir, e))
}

// Directories cannot be opened for syncing here.
#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> Result<()> {
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| DurabilityError::io(path, e))?;
    file.write_all(bytes)
        .map_err(|e| DurabilityError::io(path, e))?;
    file.sync_all().map_err(|e| DurabilityError::io(path, e))?;
    Ok(())
}

fn discard(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            warn!("Failed to remove staging file {}: {}", path.display(), e);
        }
    }
}
