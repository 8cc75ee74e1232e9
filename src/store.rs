//! Persistent key-value slots backed by JSON files.
//!
//! Each slot is a single `<key>.json` file inside the data directory. Reads
//! fall back to a caller-supplied default and writes are best-effort: a
//! failure is logged and the in-memory value keeps serving the session.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Slot holding the task list.
pub const TASKS_KEY: &str = "todo-tasks";
/// Slot holding the dark-mode preference.
pub const DARK_MODE_KEY: &str = "dark-mode";

/// A directory of named JSON slots.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Store { dir: dir.into() }
    }

    /// File backing the given slot.
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read a slot, returning `default` when it is missing or unreadable.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let path = self.slot_path(key);
        if !path.exists() {
            return default;
        }
        let mut buf = String::new();
        match File::open(&path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(value) => value,
                Err(e) => {
                    warn!(slot = key, error = %e, "corrupt slot, using default");
                    default
                }
            },
            Err(e) => {
                warn!(slot = key, error = %e, "unreadable slot, using default");
                default
            }
        }
    }

    /// Write a slot, logging instead of failing.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_save(key, value) {
            warn!(slot = key, error = %e, "failed to persist slot");
        }
    }

    /// Write a slot via temp file + rename.
    pub fn try_save<T: Serialize>(&self, key: &str, value: &T) -> crate::error::Result<()> {
        let path = self.slot_path(key);
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(value)?;
        fs::create_dir_all(&self.dir)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(&tmp, &path)?;
        debug!(slot = key, bytes = data.len(), "slot saved");
        Ok(())
    }
}

/// A value mirrored into a store slot on every change.
#[derive(Debug)]
pub struct Persisted<T> {
    store: Store,
    key: &'static str,
    value: T,
}

impl<T: Serialize + DeserializeOwned> Persisted<T> {
    /// Bind `key` in `store`, reading its current value once.
    pub fn load(store: Store, key: &'static str, default: T) -> Self {
        let value = store.load(key, default);
        Persisted { store, key, value }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        self.flush();
    }

    /// Mutate the value and write it back.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let out = f(&mut self.value);
        self.flush();
        out
    }

    /// Mutate the value and write it back only if `f` succeeds.
    pub fn try_update<R, E>(&mut self, f: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E> {
        let out = f(&mut self.value)?;
        self.flush();
        Ok(out)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    fn flush(&self) {
        self.store.save(self.key, &self.value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_slot_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path());
        let v: Vec<u32> = store.load("nothing", vec![7]);
        assert_eq!(v, vec![7]);
    }

    #[test]
    fn test_load_corrupt_slot_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path());
        fs::write(store.slot_path(DARK_MODE_KEY), "{not json").unwrap();
        assert!(store.load(DARK_MODE_KEY, true));
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path());
        store.save("numbers", &vec![1, 2, 3]);
        let back: Vec<i32> = store.load("numbers", Vec::new());
        assert_eq!(back, vec![1, 2, 3]);
        assert!(!store.slot_path("numbers").with_extension("json.tmp").exists());
    }

    #[test]
    fn test_save_into_unwritable_location_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        // A regular file where the directory should be.
        let store = Store::open(&blocker);
        store.save("slot", &42);
        assert!(store.try_save("slot", &42).is_err());
        assert_eq!(store.load("slot", 0), 0);
    }

    #[test]
    fn test_persisted_writes_on_update() {
        let dir = tempfile::tempdir().unwrap();
        let mut flag = Persisted::load(Store::open(dir.path()), DARK_MODE_KEY, false);
        flag.update(|v| *v = !*v);
        assert!(*flag.get());

        let reopened = Persisted::load(Store::open(dir.path()), DARK_MODE_KEY, false);
        assert!(*reopened.get());
    }

    #[test]
    fn test_persisted_try_update_skips_write_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut counter = Persisted::load(Store::open(dir.path()), "counter", 1u32);
        let res: Result<(), &str> = counter.try_update(|_| Err("nope"));
        assert!(res.is_err());
        assert!(!counter.store().slot_path("counter").exists());
    }
}
