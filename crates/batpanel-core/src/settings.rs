//! Persistent user preferences.
//!
//! A small key/value store of booleans, written through to a TOML file on
//! every change. The battery widget keeps its "show percentage" toggle here.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Key of the "show percentage next to the icon" preference.
pub const SHOW_PERCENTAGE_KEY: &str = "battery-show-percentage";

/// Value used when the preference has never been written.
pub const DEFAULT_SHOW_PERCENTAGE: bool = true;

/// A store of named boolean settings.
pub trait SettingsStore {
    fn get_bool(&self, key: &str) -> Option<bool>;

    fn set_bool(&self, key: &str, value: bool) -> Result<()>;
}

/// Settings kept in memory only.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: RefCell<BTreeMap<String, bool>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.borrow().get(key).copied()
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.values.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

/// Settings persisted as a flat TOML table.
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    values: RefCell<BTreeMap<String, bool>>,
}

impl FileSettingsStore {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store. A file that can't be read or parsed
    /// is logged and treated as empty; it is overwritten on the next write.
    pub fn open(path: &Path) -> Self {
        let values = match Self::read_values(path) {
            Ok(values) => values,
            Err(e) => {
                warn!("Ignoring unreadable settings file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        debug!("Opened settings {} ({} value(s))", path.display(), values.len());

        Self {
            path: path.to_path_buf(),
            values: RefCell::new(values),
        }
    }

    /// Open the store at the default location.
    pub fn open_default() -> Result<Self> {
        Ok(Self::open(&default_settings_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_values(path: &Path) -> Result<BTreeMap<String, bool>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    fn save(&self) -> Result<()> {
        let contents = toml::to_string_pretty(&*self.values.borrow())?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.path, contents)?;
        debug!("Settings saved to {}", self.path.display());
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.borrow().get(key).copied()
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.values.borrow_mut().insert(key.to_string(), value);
        self.save()
    }
}

/// Default settings file location.
///
/// `$XDG_STATE_HOME/batpanel/settings.toml`, falling back to
/// `~/.local/state/batpanel/settings.toml`.
pub fn default_settings_path() -> Result<PathBuf> {
    if let Ok(state_home) = env::var("XDG_STATE_HOME")
        && !state_home.is_empty()
    {
        return Ok(PathBuf::from(state_home).join("batpanel/settings.toml"));
    }

    if let Ok(home) = env::var("HOME") {
        return Ok(PathBuf::from(home).join(".local/state/batpanel/settings.toml"));
    }

    Err(Error::NoSettingsDir)
}

/// The "show percentage" toggle, read once on mount and written on change.
pub struct PercentagePreference {
    store: Rc<dyn SettingsStore>,
    value: Cell<bool>,
}

impl PercentagePreference {
    pub fn load(store: Rc<dyn SettingsStore>) -> Self {
        let value = store
            .get_bool(SHOW_PERCENTAGE_KEY)
            .unwrap_or(DEFAULT_SHOW_PERCENTAGE);
        Self {
            store,
            value: Cell::new(value),
        }
    }

    pub fn get(&self) -> bool {
        self.value.get()
    }

    /// Update the preference and write it through to the store.
    ///
    /// A failed write is logged; the in-memory value still changes.
    pub fn set(&self, value: bool) {
        self.value.set(value);
        if let Err(e) = self.store.set_bool(SHOW_PERCENTAGE_KEY, value) {
            warn!("Failed to persist {}: {}", SHOW_PERCENTAGE_KEY, e);
        }
    }

    /// Flip the preference and return the new value.
    pub fn toggle(&self) -> bool {
        let next = !self.get();
        self.set(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_preference_defaults_to_true() {
        let store = Rc::new(MemorySettingsStore::new());
        let pref = PercentagePreference::load(store);
        assert!(pref.get());
    }

    #[test]
    fn test_preference_reads_stored_value() {
        let store = Rc::new(MemorySettingsStore::new());
        store.set_bool(SHOW_PERCENTAGE_KEY, false).unwrap();
        let pref = PercentagePreference::load(store);
        assert!(!pref.get());
    }

    #[test]
    fn test_toggle_writes_through() {
        let store = Rc::new(MemorySettingsStore::new());
        let pref = PercentagePreference::load(store.clone());

        assert!(!pref.toggle());
        assert_eq!(store.get_bool(SHOW_PERCENTAGE_KEY), Some(false));
        assert!(pref.toggle());
        assert_eq!(store.get_bool(SHOW_PERCENTAGE_KEY), Some(true));
    }

    #[test]
    fn test_file_store_round_trips_across_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/settings.toml");

        let store = FileSettingsStore::open(&path);
        assert_eq!(store.get_bool(SHOW_PERCENTAGE_KEY), None);
        store.set_bool(SHOW_PERCENTAGE_KEY, false).unwrap();
        assert!(path.exists());

        let reopened = FileSettingsStore::open(&path);
        assert_eq!(reopened.get_bool(SHOW_PERCENTAGE_KEY), Some(false));
    }

    #[test]
    fn test_file_store_ignores_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        let store = FileSettingsStore::open(&path);
        assert_eq!(store.get_bool(SHOW_PERCENTAGE_KEY), None);

        let pref = PercentagePreference::load(Rc::new(store));
        assert!(pref.get());
    }

    #[test]
    fn test_failed_write_still_updates_value() {
        let dir = TempDir::new().unwrap();
        // Parent "directory" is a regular file, so create_dir_all fails.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let store = Rc::new(FileSettingsStore::open(&blocker.join("settings.toml")));

        let pref = PercentagePreference::load(store);
        pref.set(false);
        assert!(!pref.get());
    }
}
