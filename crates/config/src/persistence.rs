//! JSON-backed stores.
//!
//! Every piece of local state (settings, watchlist, cache) lives in its own
//! JSON file and is wrapped in a [`Persisted`] value that tracks whether it
//! changed since the last write.
//!
//! # File Locations
//!
//! | Store | Location |
//! |-------|----------|
//! | Settings | `~/.config/ghwatch/config.json` |
//! | Watchlist | `~/.local/share/ghwatch/watchlist.json` |
//! | Cache | `~/.cache/ghwatch/cache.json` |
//!
//! Files are read with the JSON5 parser so hand-edited settings may carry
//! comments and trailing commas; they are always written back as plain JSON.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};

/// Directory name used under the platform config/data/cache directories.
const APP_DIR: &str = "ghwatch";

/// Returns the settings file path (`~/.config/ghwatch/config.json`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR).join("config.json"))
        .ok_or(ConfigError::NoHomeDirectory)
}

/// Returns the watchlist file path (`~/.local/share/ghwatch/watchlist.json`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn watchlist_path() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR).join("watchlist.json"))
        .ok_or(ConfigError::NoHomeDirectory)
}

/// Returns the cache file path (`~/.cache/ghwatch/cache.json`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn cache_path() -> Result<PathBuf> {
    dirs::cache_dir()
        .map(|d| d.join(APP_DIR).join("cache.json"))
        .ok_or(ConfigError::NoHomeDirectory)
}

/// Reads and parses a JSON or JSON5 file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_json_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    // JSON5 parser handles both JSON5 and JSON
    serde_json5::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Writes a value as JSON, creating parent directories if needed.
///
/// The content goes to a temporary file next to `path` that is then renamed
/// over it, so an interrupted write leaves the previous file intact.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized or the file cannot be
/// written.
pub fn write_json_file<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let write_error = |source: std::io::Error| ConfigError::WriteFile {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.exists() {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }

    let content = serde_json::to_string(value)?;

    let mut file = NamedTempFile::new_in(parent).map_err(write_error)?;
    file.write_all(content.as_bytes()).map_err(write_error)?;
    file.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}

/// A value loaded from, and written back to, a single JSON file.
///
/// Reads go through [`get`](Self::get); any mutable access marks the value
/// dirty. [`save`](Self::save) only touches the disk when dirty, so calling it
/// repeatedly is cheap. Dropping a dirty value saves it as a last resort.
///
/// # Examples
///
/// ```no_run
/// use std::collections::BTreeMap;
/// use ghwatch_config::Persisted;
///
/// # fn example() -> ghwatch_config::Result<()> {
/// let mut counts: Persisted<BTreeMap<String, u32>> = Persisted::load("/tmp/counts.json")?;
/// *counts.get_mut().entry("runs".to_string()).or_default() += 1;
/// assert!(counts.save()?);
/// assert!(!counts.save()?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Persisted<T: Serialize> {
    path: PathBuf,
    value: T,
    dirty: bool,
}

impl<T: Serialize + DeserializeOwned + Default> Persisted<T> {
    /// Loads the value from `path`, or starts from `T::default()` if the file
    /// does not exist.
    ///
    /// Fields missing from the file take their serde defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let value = if path.exists() {
            debug!(path = %path.display(), "loading store");
            read_json_file(&path)?
        } else {
            debug!(path = %path.display(), "store file not found, using defaults");
            T::default()
        };

        Ok(Self {
            path,
            value,
            dirty: false,
        })
    }
}

impl<T: Serialize> Persisted<T> {
    /// Wraps an in-memory value that will be written to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, value: T) -> Self {
        Self {
            path: path.into(),
            value,
            dirty: false,
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the current value.
    #[must_use]
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Returns the value for mutation and marks it dirty.
    pub fn get_mut(&mut self) -> &mut T {
        self.dirty = true;
        &mut self.value
    }

    /// Applies `f` to the value and marks it dirty.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        f(self.get_mut())
    }

    /// Returns whether there are unsaved changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Writes the value to disk if it changed.
    ///
    /// Returns `true` if a write happened.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written; the value stays dirty.
    pub fn save(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }

        write_json_file(&self.path, &self.value)?;
        self.dirty = false;
        info!(path = %self.path.display(), "saved");
        Ok(true)
    }
}

impl<T: Serialize> Drop for Persisted<T> {
    fn drop(&mut self) {
        if let Err(e) = self.save() {
            warn!(path = %self.path.display(), error = %e, "failed to save store on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct TestStore {
        name: String,
        values: Vec<i32>,
        extra: BTreeMap<String, i64>,
    }

    #[test]
    fn read_json5_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.json5");
        std::fs::write(
            &path,
            r#"
            {
                // This is a comment
                name: "test",
                values: [1, 2,],
            }
            "#,
        )
        .unwrap();

        let store: TestStore = read_json_file(&path).unwrap();
        assert_eq!(store.name, "test");
        assert_eq!(store.values, vec![1, 2]);
    }

    #[test]
    fn read_invalid_json_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("invalid.json");
        std::fs::write(&path, "not valid json").unwrap();

        let err = read_json_file::<TestStore>(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("invalid.json"));
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let store: Persisted<TestStore> = Persisted::load(dir.path().join("missing.json")).unwrap();
        assert_eq!(store.get(), &TestStore::default());
        assert!(!store.is_dirty());
    }

    #[test]
    fn load_merges_over_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{"name": "partial"}"#).unwrap();

        let store: Persisted<TestStore> = Persisted::load(&path).unwrap();
        assert_eq!(store.get().name, "partial");
        assert!(store.get().values.is_empty());
    }

    #[test]
    fn save_is_noop_when_clean() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clean.json");
        let mut store: Persisted<TestStore> = Persisted::load(&path).unwrap();

        assert!(!store.save().unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn second_save_without_mutation_does_not_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("twice.json");
        let mut store: Persisted<TestStore> = Persisted::load(&path).unwrap();

        store.get_mut().values.push(7);
        assert!(store.save().unwrap());
        assert!(path.exists());

        // Removing the file shows the second save never touches the disk
        std::fs::remove_file(&path).unwrap();
        assert!(!store.save().unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn save_overwrites_and_roundtrips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store: Persisted<TestStore> = Persisted::load(&path).unwrap();
        store.update(|s| s.name = "first".to_string());
        store.save().unwrap();
        store.update(|s| s.name = "second".to_string());
        store.save().unwrap();

        let loaded: Persisted<TestStore> = Persisted::load(&path).unwrap();
        assert_eq!(loaded.get().name, "second");
    }

    #[test]
    fn write_replaces_file_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{"name": "old"}"#).unwrap();

        let store = TestStore {
            name: "new".to_string(),
            ..TestStore::default()
        };
        write_json_file(&path, &store).unwrap();

        let loaded: TestStore = read_json_file(&path).unwrap();
        assert_eq!(loaded.name, "new");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn failed_write_leaves_directory_clean() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("occupied");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep.txt"), "x").unwrap();

        let err = write_json_file(&target, &TestStore::default()).unwrap_err();
        assert!(matches!(err, ConfigError::WriteFile { .. }));
        assert_eq!(std::fs::read_to_string(target.join("keep.txt")).unwrap(), "x");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn drop_saves_dirty_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dropped.json");
        {
            let mut store: Persisted<TestStore> = Persisted::load(&path).unwrap();
            store.get_mut().extra.insert("k".to_string(), 1);
        }

        let loaded: Persisted<TestStore> = Persisted::load(&path).unwrap();
        assert_eq!(loaded.get().extra.get("k"), Some(&1));
    }

    #[test]
    fn drop_does_not_write_clean_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("untouched.json");
        {
            let store: Persisted<TestStore> = Persisted::load(&path).unwrap();
            let _ = store.get();
        }
        assert!(!path.exists());
    }
}
