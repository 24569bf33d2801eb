//! Dirty-file registry.
//!
//! Tracks which store files have in-memory changes that have not reached
//! disk. A registry is an explicit object: stores receive a handle when they
//! are constructed, a [`Session`](crate::Session) owns one, and sweeping is a
//! method on the session rather than ambient global state.

use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Set of store paths with unsaved changes.
///
/// Cloning yields another handle onto the same set. Registration is
/// idempotent.
#[derive(Debug, Clone, Default)]
pub struct DirtyRegistry {
    paths: Arc<Mutex<BTreeSet<PathBuf>>>,
}

impl DirtyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` as dirty. Returns `true` if it was not already.
    pub fn mark(&self, path: &Path) -> bool {
        self.paths.lock().insert(path.to_path_buf())
    }

    /// Record `path` as saved. Returns `true` if it had been dirty.
    pub fn clear(&self, path: &Path) -> bool {
        self.paths.lock().remove(path)
    }

    /// Check if `path` is dirty.
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.lock().contains(path)
    }

    /// Number of dirty paths.
    pub fn len(&self) -> usize {
        self.paths.lock().len()
    }

    /// Check if nothing is dirty.
    pub fn is_empty(&self) -> bool {
        self.paths.lock().is_empty()
    }

    /// Copy of the dirty set, sorted. Later changes do not affect it.
    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.paths.lock().iter().cloned().collect()
    }
}
