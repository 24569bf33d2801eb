//! Sessions: the owner of a dirty registry.
//!
//! A [`Session`] bundles the three things every store needs besides its
//! path: a [`DirtyRegistry`] to report to, a default [`Scope`] for name
//! resolution, and a [`StoreConfig`]. Stores opened through the same
//! session share its registry, and [`Session::save_all_open`] sweeps it.

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::guard::StoreGuard;
use crate::registry::DirtyRegistry;
use crate::scope::Scope;
use crate::store::VariableStore;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use varstore_core::with_extension_suffix;
use varstore_durability::SaveMode;

/// Store factory and dirty-registry owner.
///
/// # Example
///
/// ```ignore
/// let session = Session::builder().direct_saves().build();
/// let mut store = session.open("state");
/// store.add_by_name("x")?;
/// session.save_all_open();
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    config: StoreConfig,
    registry: DirtyRegistry,
    default_scope: Scope,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Session with default settings, a fresh registry, and the global scope.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for session configuration.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Store configuration applied to every store this session opens.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The session's dirty registry.
    pub fn registry(&self) -> &DirtyRegistry {
        &self.registry
    }

    /// Scope used when none is given.
    pub fn default_scope(&self) -> &Scope {
        &self.default_scope
    }

    /// Normalized path a store opened with `path` would use.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        with_extension_suffix(path, &self.config.extension)
    }

    /// Empty store for `path` using the default scope. Nothing is read.
    pub fn open(&self, path: impl AsRef<Path>) -> VariableStore {
        self.open_with_scope(path, &self.default_scope)
    }

    /// Empty store for `path` resolving names against `scope`.
    pub fn open_with_scope(&self, path: impl AsRef<Path>, scope: &Scope) -> VariableStore {
        VariableStore::with_config(path, scope, &self.registry, &self.config)
    }

    /// Scoped store for `path` using the default scope.
    ///
    /// See [`VariableStore::acquire`].
    pub fn acquire(&self, path: impl AsRef<Path>) -> Result<StoreGuard> {
        self.open(path).acquire()
    }

    /// Scoped store for `path` resolving names against `scope`.
    pub fn acquire_with_scope(&self, path: impl AsRef<Path>, scope: &Scope) -> Result<StoreGuard> {
        self.open_with_scope(path, scope).acquire()
    }

    /// Paths with unsaved changes, sorted.
    pub fn dirty_paths(&self) -> Vec<PathBuf> {
        self.registry.snapshot()
    }

    /// Reload and re-save every dirty path.
    ///
    /// Works on a snapshot of the registry taken up front. Each path gets a
    /// transient store with the default scope that loads the file and
    /// saves it straight back. In-memory changes held by other store
    /// instances are not consulted. A failing path is logged, recorded in
    /// the report, and stays dirty; the sweep always visits every path.
    pub fn save_all_open(&self) -> SweepReport {
        let paths = self.registry.snapshot();
        info!("Sweeping {} unsaved store file(s)", paths.len());

        let mut report = SweepReport::default();
        for path in paths {
            let mut store = VariableStore::at_path(
                path.clone(),
                &self.default_scope,
                &self.registry,
                self.config.save_mode,
            );
            match store.load().and_then(|()| store.save()) {
                Ok(()) => report.saved.push(path),
                Err(e) => {
                    warn!("Sweep could not persist {}: {}", path.display(), e);
                    report.failed.push((path, e));
                }
            }
        }

        info!(
            "Sweep finished: {} saved, {} failed",
            report.saved.len(),
            report.failed.len()
        );
        report
    }
}

/// Outcome of [`Session::save_all_open`].
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Paths reloaded and saved
    pub saved: Vec<PathBuf>,
    /// Paths that failed, with the reason
    pub failed: Vec<(PathBuf, Error)>,
}

impl SweepReport {
    /// Check if every visited path was saved.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Builder for session configuration.
///
/// # Example
///
/// ```ignore
/// let scope = Scope::new();
/// let session = Session::builder()
///     .extension("vars")
///     .default_scope(scope.clone())
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionBuilder {
    config: StoreConfig,
    registry: Option<DirtyRegistry>,
    default_scope: Option<Scope>,
}

impl SessionBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// File extension for store paths (default `db`).
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.config.extension = ext.into();
        self
    }

    /// How saves replace existing files.
    pub fn save_mode(mut self, mode: SaveMode) -> Self {
        self.config.save_mode = mode;
        self
    }

    /// Stage saves through a temp file and rename (default).
    pub fn atomic_saves(self) -> Self {
        self.save_mode(SaveMode::Atomic)
    }

    /// Truncate and overwrite store files in place.
    pub fn direct_saves(self) -> Self {
        self.save_mode(SaveMode::Direct)
    }

    /// Scope used when a store is opened without one.
    pub fn default_scope(mut self, scope: Scope) -> Self {
        self.default_scope = Some(scope);
        self
    }

    /// Share an existing registry instead of creating one.
    pub fn registry(mut self, registry: DirtyRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Build the session.
    pub fn build(self) -> Session {
        Session {
            config: self.config,
            registry: self.registry.unwrap_or_default(),
            default_scope: self
                .default_scope
                .unwrap_or_else(|| Scope::global().clone()),
        }
    }
}
