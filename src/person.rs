//! Assignee registry.
//!
//! Maps a person's name to a display color used when rendering calendar
//! cells. Unregistered names fall back to black.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Storage;

const PERSONS_SCHEMA_VERSION: &str = "rota.persons.v1";

pub const DEFAULT_PERSON_COLOR: &str = "#000000";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersonRegistry {
    schema_version: String,
    persons: Vec<Person>,
}

impl Default for PersonRegistry {
    fn default() -> Self {
        Self {
            schema_version: PERSONS_SCHEMA_VERSION.to_string(),
            persons: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PersonDirectory {
    storage: Storage,
}

impl PersonDirectory {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    fn read_registry(&self) -> Result<PersonRegistry> {
        self.storage
            .read_json_or(&self.storage.persons_file(), PersonRegistry::default)
    }

    pub fn list(&self) -> Result<Vec<Person>> {
        Ok(self.read_registry()?.persons)
    }

    /// Add or update a person's display color
    pub fn set(&self, name: &str, color: &str) -> Result<Person> {
        let mut registry = self.read_registry()?;
        let person = Person {
            name: name.to_string(),
            color: color.to_string(),
        };
        match registry.persons.iter_mut().find(|p| p.name == name) {
            Some(existing) => *existing = person.clone(),
            None => registry.persons.push(person.clone()),
        }
        self.storage
            .write_json(&self.storage.persons_file(), &registry)?;
        Ok(person)
    }

    /// Name → color lookup table for the calendar renderer
    pub fn colors(&self) -> Result<HashMap<String, String>> {
        Ok(self
            .list()?
            .into_iter()
            .map(|person| (person.name, person.color))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> (tempfile::TempDir, PersonDirectory) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::new(dir.path().to_path_buf());
        storage.init().expect("init");
        (dir, PersonDirectory::new(storage))
    }

    #[test]
    fn set_inserts_then_updates() {
        let (_dir, directory) = directory();
        directory.set("Alice", "#F00").expect("set");
        directory.set("Alice", "#0F0").expect("update");

        let persons = directory.list().expect("list");
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0].color, "#0F0");
    }

    #[test]
    fn colors_builds_lookup() {
        let (_dir, directory) = directory();
        directory.set("Alice", "#F00").expect("set");
        directory.set("Bob", "#00F").expect("set");

        let colors = directory.colors().expect("colors");
        assert_eq!(colors.get("Alice").map(String::as_str), Some("#F00"));
        assert_eq!(colors.get("Bob").map(String::as_str), Some("#00F"));
        assert!(colors.get("Carol").is_none());
    }
}
