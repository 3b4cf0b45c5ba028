use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Durable key-value storage for application state.
///
/// Each key maps to one JSON file under the data directory. The store is
/// deliberately failure tolerant: a missing or unparseable slot yields the
/// caller-supplied default on `load`, and a failed `save` is logged and
/// swallowed so the in-memory state stays authoritative for the session.
/// Instances are constructed explicitly and passed to whoever needs them;
/// there is no process-wide store.
#[derive(Debug, Clone)]
pub struct PersistentStore {
    data_dir: PathBuf,
}

impl PersistentStore {
    /// Opens the store in the platform data directory, creating it if needed.
    pub fn open() -> Result<Self> {
        let data_dir = dirs::data_dir()
            .context("Failed to get data directory")?
            .join("jot");

        fs::create_dir_all(&data_dir)?;

        Ok(Self { data_dir })
    }

    /// Opens the store rooted at an explicit directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }

    /// Reads the value stored under `key`, falling back to `default` when the
    /// slot is absent, unreadable, or not valid JSON for `T`. Never blocks
    /// startup on corrupt storage; failures are logged and swallowed.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let path = self.slot_path(key);
        if !path.exists() {
            return default;
        }

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!(key, error = %e, "failed to read storage slot");
                return default;
            }
        };

        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "discarding unparseable storage slot");
                default
            }
        }
    }

    /// Serializes `value` and writes it under `key`. A failed write is logged
    /// and swallowed; callers keep their in-memory state either way.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string_pretty(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "failed to serialize storage slot");
                return;
            }
        };

        if let Err(e) = fs::write(self.slot_path(key), json) {
            warn!(key, error = %e, "failed to write storage slot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Note;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn load_missing_slot_returns_default() {
        let dir = tempdir().unwrap();
        let store = PersistentStore::with_dir(dir.path());

        let value: Vec<Note> = store.load("notes", vec![Note::new(1)]);
        assert_eq!(value.len(), 1);
        assert_eq!(value[0].id, 1);
    }

    #[test]
    fn save_then_load_round_trips_field_for_field() {
        let dir = tempdir().unwrap();
        let store = PersistentStore::with_dir(dir.path());

        let mut first = Note::new(10);
        first.title = String::from("Shopping");
        first.content = String::from("Buy milk and eggs");
        first.tags = vec![String::from("errands"), String::from("errands")];
        let second = Note::new(20);
        let notes = vec![first, second];

        store.save("notes", &notes);
        let loaded: Vec<Note> = store.load("notes", Vec::new());

        assert_eq!(loaded, notes);
    }

    #[test]
    fn corrupt_slot_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let store = PersistentStore::with_dir(dir.path());
        std::fs::write(dir.path().join("notes.json"), "{not json at all").unwrap();

        let value: Vec<Note> = store.load("notes", vec![Note::new(5)]);
        assert_eq!(value[0].id, 5);
    }

    #[test]
    fn wrong_shape_slot_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let store = PersistentStore::with_dir(dir.path());
        std::fs::write(dir.path().join("notes.json"), r#"{"unexpected": true}"#).unwrap();

        let value: Vec<Note> = store.load("notes", Vec::new());
        assert!(value.is_empty());
    }

    #[test]
    fn save_failure_is_swallowed() {
        // Point the store at a directory that does not exist; the write fails
        // but the call must not panic or surface an error.
        let store = PersistentStore::with_dir("/nonexistent/jot-test-slot");
        store.save("notes", &vec![Note::new(1)]);
    }

    #[test]
    fn slots_are_independent() {
        let dir = tempdir().unwrap();
        let store = PersistentStore::with_dir(dir.path());

        store.save("notes", &vec![Note::new(1)]);
        store.save("other", &vec![Note::new(2)]);

        let notes: Vec<Note> = store.load("notes", Vec::new());
        let other: Vec<Note> = store.load("other", Vec::new());
        assert_eq!(notes[0].id, 1);
        assert_eq!(other[0].id, 2);
    }
}
