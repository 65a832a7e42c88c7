//! Canonical occurrence store.
//!
//! An occurrence is one concrete dated instance of a template. Identity is
//! the composite key `(task_id, due_date)` and the store holds at most one
//! occurrence per key. `name`, `color` and `active` are derived from the
//! owning template on every engine run; `person` and `done` are sticky and
//! survive regeneration.
//!
//! The store is the single source of truth: both projections (today list,
//! calendar grid) are pure functions of its contents.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Storage;

const OCCURRENCES_SCHEMA_VERSION: &str = "rota.occurrences.v1";

/// Composite identity key for an occurrence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OccurrenceKey {
    pub task_id: String,
    pub due_date: NaiveDate,
}

impl OccurrenceKey {
    pub fn new(task_id: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            task_id: task_id.into(),
            due_date,
        }
    }
}

/// One dated instance of a template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Occurrence {
    pub task_id: String,
    pub name: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub person: String,
    #[serde(default)]
    pub done: bool,
    pub color: String,
    pub active: bool,
}

impl Occurrence {
    pub fn key(&self) -> OccurrenceKey {
        OccurrenceKey::new(self.task_id.clone(), self.due_date)
    }
}

/// On-disk shape of `occurrences.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccurrenceSnapshot {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub occurrences: Vec<Occurrence>,
}

impl OccurrenceSnapshot {
    pub fn new(occurrences: Vec<Occurrence>) -> Self {
        Self {
            schema_version: OCCURRENCES_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            occurrences,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

/// Index a slice of occurrences by identity key. Later entries win, which
/// cannot happen for engine output (one emission per key) but keeps a
/// hand-edited store file from panicking.
pub fn index_by_key(occurrences: &[Occurrence]) -> HashMap<OccurrenceKey, Occurrence> {
    occurrences
        .iter()
        .map(|occ| (occ.key(), occ.clone()))
        .collect()
}

/// The canonical store backing `occurrences.json`
#[derive(Debug, Clone)]
pub struct OccurrenceStore {
    storage: Storage,
}

impl OccurrenceStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// All occurrences in store order (ascending by due date)
    pub fn read_all(&self) -> Result<Vec<Occurrence>> {
        let snapshot: OccurrenceSnapshot = self
            .storage
            .read_json_or(&self.storage.occurrences_file(), OccurrenceSnapshot::empty)?;
        Ok(snapshot.occurrences)
    }

    /// Replace the whole store with a new occurrence set (single atomic write)
    pub fn replace_all(&self, occurrences: Vec<Occurrence>) -> Result<()> {
        let _lock = self.storage.lock()?;
        self.storage.write_json(
            &self.storage.occurrences_file(),
            &OccurrenceSnapshot::new(occurrences),
        )
    }

    /// Update the sticky fields of one occurrence in place.
    ///
    /// Returns the updated occurrence, or `None` if no entry matches the key
    /// (the store is left untouched in that case).
    pub fn update_fields(
        &self,
        key: &OccurrenceKey,
        person: Option<String>,
        done: Option<bool>,
    ) -> Result<Option<Occurrence>> {
        let _lock = self.storage.lock()?;
        let mut occurrences = self.read_all()?;

        let Some(entry) = occurrences
            .iter_mut()
            .find(|occ| occ.task_id == key.task_id && occ.due_date == key.due_date)
        else {
            return Ok(None);
        };

        if let Some(person) = person {
            entry.person = person;
        }
        if let Some(done) = done {
            entry.done = done;
        }
        let updated = entry.clone();

        self.storage.write_json(
            &self.storage.occurrences_file(),
            &OccurrenceSnapshot::new(occurrences),
        )?;
        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, OccurrenceStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::new(dir.path().to_path_buf());
        storage.init().expect("init");
        (dir, OccurrenceStore::new(storage))
    }

    fn occurrence(task_id: &str, due: NaiveDate) -> Occurrence {
        Occurrence {
            task_id: task_id.to_string(),
            name: format!("task {task_id}"),
            due_date: due,
            person: String::new(),
            done: false,
            color: "#000000".to_string(),
            active: true,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_store_reads_as_empty() {
        let (_dir, store) = store();
        assert!(store.read_all().expect("read").is_empty());
    }

    #[test]
    fn replace_all_round_trips() {
        let (_dir, store) = store();
        let occurrences = vec![
            occurrence("t1", date(2024, 1, 1)),
            occurrence("t1", date(2024, 1, 8)),
        ];
        store.replace_all(occurrences.clone()).expect("replace");
        assert_eq!(store.read_all().expect("read"), occurrences);
    }

    #[test]
    fn update_fields_targets_one_entry() {
        let (_dir, store) = store();
        store
            .replace_all(vec![
                occurrence("t1", date(2024, 1, 1)),
                occurrence("t1", date(2024, 1, 8)),
            ])
            .expect("replace");

        let key = OccurrenceKey::new("t1", date(2024, 1, 8));
        let updated = store
            .update_fields(&key, Some("Bob".to_string()), Some(true))
            .expect("update")
            .expect("matched");
        assert_eq!(updated.person, "Bob");
        assert!(updated.done);

        let all = store.read_all().expect("read");
        assert_eq!(all[0].person, "");
        assert!(!all[0].done);
        assert_eq!(all[1].person, "Bob");
        assert!(all[1].done);
    }

    #[test]
    fn update_fields_misses_without_touching_store() {
        let (_dir, store) = store();
        let before = vec![occurrence("t1", date(2024, 1, 1))];
        store.replace_all(before.clone()).expect("replace");

        let key = OccurrenceKey::new("t2", date(2024, 1, 1));
        let result = store
            .update_fields(&key, Some("Bob".to_string()), None)
            .expect("update");
        assert!(result.is_none());
        assert_eq!(store.read_all().expect("read"), before);
    }

    #[test]
    fn index_by_key_builds_composite_index() {
        let occurrences = vec![
            occurrence("t1", date(2024, 1, 1)),
            occurrence("t2", date(2024, 1, 1)),
        ];
        let index = index_by_key(&occurrences);
        assert_eq!(index.len(), 2);
        assert!(index.contains_key(&OccurrenceKey::new("t1", date(2024, 1, 1))));
        assert!(index.contains_key(&OccurrenceKey::new("t2", date(2024, 1, 1))));
    }
}
