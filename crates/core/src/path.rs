//! Store file naming
//!
//! Every store file carries a fixed extension. Callers may pass either
//! `data` or `data.db`; both name the same file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Extension appended to store files when none is configured
pub const DEFAULT_EXTENSION: &str = "db";

/// Append `.<ext>` to `path` unless its file name already ends with it.
///
/// An existing, different extension is kept: `notes.txt` becomes
/// `notes.txt.db`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use varstore_core::path::with_extension_suffix;
///
/// assert_eq!(with_extension_suffix("data", "db"), Path::new("data.db"));
/// assert_eq!(with_extension_suffix("data.db", "db"), Path::new("data.db"));
/// ```
pub fn with_extension_suffix(path: impl AsRef<Path>, ext: &str) -> PathBuf {
    let path = path.as_ref();
    let ext = ext.trim_start_matches('.');
    if ext.is_empty() {
        return path.to_path_buf();
    }

    let suffix = format!(".{}", ext);
    let has_suffix = path
        .file_name()
        .map(|name| name.to_string_lossy().ends_with(&suffix))
        .unwrap_or(false);
    if has_suffix {
        return path.to_path_buf();
    }

    let mut raw = OsString::from(path.as_os_str());
    raw.push(&suffix);
    PathBuf::from(raw)
}
