use crate::models::note::{Note, welcome_notes};
use crate::models::storage::PersistentStore;
use anyhow::{Result, bail};
use chrono::Utc;

/// The in-memory note collection and the only component that mutates it.
///
/// Every mutating operation writes the whole collection back to its storage
/// slot before returning (write-through, never batched). Iteration order is
/// insertion order except that newly created notes go to the front, so the
/// list reads most-recent-first.
#[derive(Debug)]
pub struct NoteRepository {
    notes: Vec<Note>,
    last_id: i64,
    store: PersistentStore,
    slot: String,
}

impl NoteRepository {
    /// Loads the collection from `slot`, seeding the welcome note when the
    /// slot is absent or corrupt.
    pub fn load(store: PersistentStore, slot: &str) -> Self {
        let notes: Vec<Note> = store.load(slot, welcome_notes(Utc::now().timestamp_millis()));
        let last_id = notes.iter().map(|n| n.id).max().unwrap_or(0);

        Self {
            notes,
            last_id,
            store,
            slot: slot.to_string(),
        }
    }

    /// Next unique id: current wall-clock milliseconds, bumped past the last
    /// issued id when two creations land in the same millisecond.
    fn next_id(&mut self) -> i64 {
        let id = Utc::now().timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        id
    }

    /// The full collection in canonical order.
    pub fn list(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: i64) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Id of the first note in canonical order, if any.
    pub fn first_id(&self) -> Option<i64> {
        self.notes.first().map(|n| n.id)
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Creates an empty "New Note" at the front of the collection, persists,
    /// and returns a copy of it.
    pub fn create(&mut self) -> Note {
        let note = Note::new(self.next_id());
        self.notes.insert(0, note.clone());
        self.persist();
        note
    }

    /// Replaces the entry matching `note.id` in place (position unchanged)
    /// and persists. An unknown id is an error; nothing is written then.
    pub fn update(&mut self, note: Note) -> Result<()> {
        let Some(slot) = self.notes.iter_mut().find(|n| n.id == note.id) else {
            bail!("Note {} not found", note.id);
        };
        *slot = note;
        self.persist();
        Ok(())
    }

    /// Removes the entry with `id` and persists. Removing an absent id is a
    /// no-op on the collection but still issues the (idempotent) save.
    pub fn delete(&mut self, id: i64) {
        self.notes.retain(|n| n.id != id);
        self.persist();
    }

    fn persist(&self) {
        self.store.save(&self.slot, &self.notes);
    }
}
