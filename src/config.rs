//! Store configuration.

use varstore_core::DEFAULT_EXTENSION;
use varstore_durability::SaveMode;

/// Per-store settings.
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig::default().extension("vars").save_mode(SaveMode::Direct);
/// let store = VariableStore::with_config("state", &scope, &registry, &config);
/// assert!(store.path().ends_with("state.vars"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Extension appended to store file names (without the dot)
    pub extension: String,
    /// How saves replace the existing file
    pub save_mode: SaveMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            extension: DEFAULT_EXTENSION.to_string(),
            save_mode: SaveMode::default(),
        }
    }
}

impl StoreConfig {
    /// Set the file extension.
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = ext.into();
        self
    }

    /// Set the save mode.
    pub fn save_mode(mut self, mode: SaveMode) -> Self {
        self.save_mode = mode;
        self
    }
}
