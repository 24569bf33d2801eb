//! The variable store.
//!
//! A [`VariableStore`] maps variable names to shared values and persists
//! the whole mapping as one blob in one file. Names come from one of two
//! places:
//!
//! - **explicitly**, via [`add_by_name`](VariableStore::add_by_name),
//!   [`update`](VariableStore::update) and the `*_by_name` operations
//! - **by identity**, via [`add`](VariableStore::add),
//!   [`delete`](VariableStore::delete) and [`replace`](VariableStore::replace),
//!   which look the value's `Arc` up in the caller's [`Scope`]
//!
//! Identity resolution is a convenience: first match wins and the answer
//! depends on binding order. Prefer the explicit operations whenever the
//! name is known.
//!
//! Every change to the entries marks the store's path in its
//! [`DirtyRegistry`]; a successful [`save`](VariableStore::save) clears it.
//! Every failure is both logged and returned.
//!
//! # Example
//!
//! ```ignore
//! let scope = Scope::new();
//! let registry = DirtyRegistry::new();
//! let mut store = VariableStore::new("state", &scope, &registry);
//!
//! let x = scope.bind("x", 42);
//! store.add(&x)?;
//! assert_eq!(store.get("x"), Some(x));
//! store.save()?;
//! ```

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::guard::StoreGuard;
use crate::registry::DirtyRegistry;
use crate::scope::{Scope, ScopeRef};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use varstore_core::{with_extension_suffix, Value};
use varstore_durability::{BlobFile, SaveMode};

/// Named variables backed by a single file.
#[derive(Debug)]
pub struct VariableStore {
    entries: BTreeMap<String, Arc<Value>>,
    scope: ScopeRef,
    registry: DirtyRegistry,
    blob: BlobFile,
}

impl VariableStore {
    /// Create an empty store for `path` with default configuration.
    ///
    /// The path gets the `.db` extension if it is missing. Nothing is read
    /// from disk and the store is not marked dirty.
    pub fn new(path: impl AsRef<Path>, scope: &Scope, registry: &DirtyRegistry) -> Self {
        Self::with_config(path, scope, registry, &StoreConfig::default())
    }

    /// Create an empty store with explicit configuration.
    pub fn with_config(
        path: impl AsRef<Path>,
        scope: &Scope,
        registry: &DirtyRegistry,
        config: &StoreConfig,
    ) -> Self {
        let path = with_extension_suffix(path, &config.extension);
        Self::at_path(path, scope, registry, config.save_mode)
    }

    /// Create a store for an already-normalized path.
    pub(crate) fn at_path(
        path: PathBuf,
        scope: &Scope,
        registry: &DirtyRegistry,
        mode: SaveMode,
    ) -> Self {
        VariableStore {
            entries: BTreeMap::new(),
            scope: scope.downgrade(),
            registry: registry.clone(),
            blob: BlobFile::new(path, mode),
        }
    }

    /// File this store saves to and loads from.
    pub fn path(&self) -> &Path {
        self.blob.path()
    }

    /// Scope used for identity resolution.
    pub fn scope(&self) -> &ScopeRef {
        &self.scope
    }

    /// Registry this store reports to.
    pub fn registry(&self) -> &DirtyRegistry {
        &self.registry
    }

    /// Check if the store's path is registered as having unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.registry.contains(self.path())
    }

    // =========================================================================
    // Name resolution
    // =========================================================================

    /// Name of the first scope binding that is the same allocation as
    /// `value`, or `None`.
    pub fn resolve_name(&self, value: &Arc<Value>) -> Option<String> {
        self.scope.resolve_name(value)
    }

    fn resolve_or_fail(&self, op: &str, value: &Arc<Value>) -> Result<String> {
        self.resolve_name(value).ok_or_else(|| {
            failed(
                op,
                Error::NameResolution {
                    type_name: value.type_name(),
                },
            )
        })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a value under the name it is bound to in the scope.
    ///
    /// Returns the resolved name.
    ///
    /// # Errors
    ///
    /// - [`Error::NameResolution`] if no scope binding is this value
    /// - [`Error::InvalidName`] if the binding's name is empty
    /// - [`Error::DuplicateKey`] if the name is already stored
    pub fn add(&mut self, value: &Arc<Value>) -> Result<String> {
        let name = self.resolve_or_fail("add variable", value)?;
        check_name("add variable", &name)?;
        if self.entries.contains_key(&name) {
            return Err(failed("add variable", Error::DuplicateKey(name)));
        }
        self.entries.insert(name.clone(), Arc::clone(value));
        self.mark_dirty();
        debug!("Added '{}' to {}", name, self.path().display());
        Ok(name)
    }

    /// Copy the scope's current binding for `name` into the store.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] if `name` is empty
    /// - [`Error::NotFound`] if `name` is not bound in the scope
    /// - [`Error::DuplicateKey`] if `name` is already stored
    pub fn add_by_name(&mut self, name: &str) -> Result<()> {
        let op = "add variable by name";
        check_name(op, name)?;
        let value = self.scope.lookup(name).ok_or_else(|| {
            failed(op, Error::NotFound(format!("variable '{}' in scope", name)))
        })?;
        if self.entries.contains_key(name) {
            return Err(failed(op, Error::DuplicateKey(name.to_string())));
        }
        self.entries.insert(name.to_string(), value);
        self.mark_dirty();
        debug!("Added '{}' to {}", name, self.path().display());
        Ok(())
    }

    /// [`add`](Self::add) each value in order, skipping failures.
    ///
    /// A failure is logged and does not stop the remaining values.
    /// Returns how many were added.
    pub fn add_multiple<'a, I>(&mut self, values: I) -> usize
    where
        I: IntoIterator<Item = &'a Arc<Value>>,
    {
        let mut added = 0;
        for value in values {
            match self.add(value) {
                Ok(_) => added += 1,
                Err(e) => warn!("Skipping value in add_multiple: {}", e),
            }
        }
        added
    }

    /// Remove the entry for the name `value` is bound to in the scope.
    ///
    /// Returns the removed value.
    ///
    /// # Errors
    ///
    /// - [`Error::NameResolution`] if no scope binding is this value
    /// - [`Error::NotFound`] if the resolved name is not stored
    pub fn delete(&mut self, value: &Arc<Value>) -> Result<Arc<Value>> {
        let name = self.resolve_or_fail("delete variable", value)?;
        self.remove_entry("delete variable", &name)
    }

    /// Remove the entry stored under `name`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] if `name` is empty
    /// - [`Error::NotFound`] if `name` is not stored
    pub fn delete_by_name(&mut self, name: &str) -> Result<Arc<Value>> {
        check_name("delete variable", name)?;
        self.remove_entry("delete variable", name)
    }

    /// Remove the entry named by a dynamically-typed key.
    ///
    /// # Errors
    ///
    /// - [`Error::TypeMismatch`] if `key` is not a `Value::String`
    /// - anything [`delete_by_name`](Self::delete_by_name) returns
    pub fn delete_key(&mut self, key: &Value) -> Result<Arc<Value>> {
        match key.as_str() {
            Some(name) => self.delete_by_name(name),
            None => Err(failed(
                "delete variable",
                Error::type_mismatch("String", key.type_name()),
            )),
        }
    }

    fn remove_entry(&mut self, op: &str, name: &str) -> Result<Arc<Value>> {
        let removed = self
            .entries
            .remove(name)
            .ok_or_else(|| failed(op, Error::NotFound(format!("variable '{}'", name))))?;
        self.mark_dirty();
        debug!("Deleted '{}' from {}", name, self.path().display());
        Ok(removed)
    }

    /// Overwrite an existing entry with `value`, found by identity.
    ///
    /// Never creates an entry.
    ///
    /// # Errors
    ///
    /// - [`Error::NameResolution`] if no scope binding is this value
    /// - [`Error::NotFound`] if the resolved name is not stored
    pub fn replace(&mut self, value: &Arc<Value>) -> Result<()> {
        let op = "replace variable";
        let name = self.resolve_or_fail(op, value)?;
        match self.entries.get_mut(&name) {
            Some(slot) => *slot = Arc::clone(value),
            None => return Err(failed(op, Error::NotFound(format!("variable '{}'", name)))),
        }
        self.mark_dirty();
        debug!("Replaced '{}' in {}", name, self.path().display());
        Ok(())
    }

    /// Merge `mapping` into the store.
    ///
    /// With `overwrite` every key is written; without it only keys that are
    /// not stored yet. All names are checked before anything is written.
    /// Returns the number of entries written.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] if any key is empty (nothing is written)
    pub fn update<I, K, V>(&mut self, mapping: I, overwrite: bool) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Arc<Value>>,
    {
        let items: Vec<(String, Arc<Value>)> = mapping
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        if let Some((name, _)) = items.iter().find(|(name, _)| name.is_empty()) {
            return Err(failed("update variables", Error::InvalidName(name.clone())));
        }

        let mut written = 0;
        for (name, value) in items {
            if overwrite || !self.entries.contains_key(&name) {
                self.entries.insert(name, value);
                written += 1;
            }
        }
        if written > 0 {
            self.mark_dirty();
        }
        debug!(
            "Updated {} entries in {} (overwrite={})",
            written,
            self.path().display(),
            overwrite
        );
        Ok(written)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.mark_dirty();
        debug!("Cleared {}", self.path().display());
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Value stored under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<Value>> {
        self.entries.get(name).cloned()
    }

    /// Value stored under `name`, or `default`.
    pub fn get_or(&self, name: &str, default: impl Into<Arc<Value>>) -> Arc<Value> {
        self.get(name).unwrap_or_else(|| default.into())
    }

    /// Value stored under `name`, failing when absent.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if `name` is not stored
    pub fn require(&self, name: &str) -> Result<Arc<Value>> {
        self.get(name).ok_or_else(|| {
            failed(
                "look up variable",
                Error::NotFound(format!("variable '{}'", name)),
            )
        })
    }

    /// Check if `name` is stored.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Value>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Write all entries to the store file, replacing it.
    ///
    /// On success the path leaves the dirty registry. On failure it stays
    /// registered and the error is returned.
    pub fn save(&self) -> Result<()> {
        let snapshot = Value::Object(
            self.entries
                .iter()
                .map(|(name, value)| (name.clone(), Value::clone(value)))
                .collect(),
        );
        let bytes = self.blob.write(&snapshot).map_err(|e| {
            failed(
                &format!("save to {}", self.path().display()),
                Error::from(e),
            )
        })?;
        self.registry.clear(self.path());
        info!(
            "Saved {} variables ({} bytes) to {}",
            self.entries.len(),
            bytes,
            self.path().display()
        );
        Ok(())
    }

    /// Replace all entries with the contents of the store file.
    ///
    /// Entries are replaced wholesale, not merged, and the store is marked
    /// dirty. On failure the entries are left untouched.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the file is missing or unreadable
    /// - [`Error::Corruption`] if the blob cannot be decoded or holds an
    ///   empty name
    /// - [`Error::TypeMismatch`] if the blob is not a name -> value mapping
    pub fn load(&mut self) -> Result<()> {
        let op = format!("load file {}", self.path().display());
        let decoded: Value = self
            .blob
            .read()
            .map_err(|e| failed(&op, Error::from(e)))?;
        let map = decoded.into_object().map_err(|other| {
            failed(&op, Error::type_mismatch("Object", other.type_name()))
        })?;
        if map.contains_key("") {
            return Err(failed(
                &op,
                Error::Corruption("empty variable name in stored mapping".to_string()),
            ));
        }

        self.entries = map
            .into_iter()
            .map(|(name, value)| (name, Arc::new(value)))
            .collect();
        self.mark_dirty();
        info!(
            "Loaded {} variables from {}",
            self.entries.len(),
            self.path().display()
        );
        Ok(())
    }

    /// Open the store as a scoped resource that saves when dropped.
    ///
    /// If the file exists it is loaded now and a load failure is returned.
    /// Otherwise the store starts empty and is marked dirty.
    pub fn acquire(mut self) -> Result<StoreGuard> {
        if self.blob.exists() {
            self.load()?;
        } else {
            debug!(
                "{} does not exist yet, starting empty",
                self.path().display()
            );
            self.mark_dirty();
        }
        Ok(StoreGuard::new(self))
    }

    // =========================================================================
    // Display
    // =========================================================================

    /// Print one `name = value` line per entry to stdout.
    pub fn display(&self) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(e) = self.write_entries(&mut out) {
            warn!("Failed to display {}: {}", self.path().display(), e);
        }
    }

    /// Write one `name = value` line per entry, sorted by name.
    pub fn write_entries<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (name, value) in &self.entries {
            writeln!(out, "{} = {}", name, value)?;
        }
        Ok(())
    }

    fn mark_dirty(&self) {
        if self.registry.mark(self.path()) {
            debug!("Marked {} as unsaved", self.path().display());
        }
    }
}

/// Stored names are never empty; a file holding one would not load back.
fn check_name(op: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(failed(op, Error::InvalidName(name.to_string())));
    }
    Ok(())
}

/// Log a failed operation and hand the error back for propagation.
fn failed(op: &str, err: Error) -> Error {
    error!("Failed to {}: {}", op, err);
    err
}
