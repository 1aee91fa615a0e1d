//! In-memory storage, used in tests and as a scratch workspace.

use super::{Storage, StorageError, StorageResult};
use crate::board::BoardSet;
use std::collections::HashMap;
use std::sync::RwLock;

/// Board sets held in a map. Values are stored serialized so that load
/// always returns an independent copy, like the other backends.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, boards: &BoardSet) -> StorageResult<()> {
        let json = serde_json::to_string(boards)?;
        self.entries
            .write()
            .expect("storage lock poisoned")
            .insert(id.to_string(), json);
        Ok(())
    }

    fn load(&self, id: &str) -> StorageResult<BoardSet> {
        let entries = self.entries.read().expect("storage lock poisoned");
        let json = entries
            .get(id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        Ok(serde_json::from_str(json)?)
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        self.entries
            .write()
            .expect("storage lock poisoned")
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let mut ids: Vec<String> = self
            .entries
            .read()
            .expect("storage lock poisoned")
            .keys()
            .cloned()
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn exists(&self, id: &str) -> bool {
        self.entries
            .read()
            .expect("storage lock poisoned")
            .contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_round_trip() {
        let storage = MemoryStorage::new();
        let boards = BoardSet::new();
        storage.save("main", &boards).unwrap();

        let loaded = storage.load("main").unwrap();
        assert_eq!(loaded.current_board_id(), boards.current_board_id());
        assert_eq!(loaded.boards().len(), 1);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.load("nope"),
            Err(StorageError::NotFound(_))
        ));
        assert!(!storage.exists("nope"));
    }

    #[test]
    fn test_delete_and_list() {
        let storage = MemoryStorage::new();
        let boards = BoardSet::new();
        storage.save("b", &boards).unwrap();
        storage.save("a", &boards).unwrap();
        assert_eq!(storage.list().unwrap(), vec!["a", "b"]);

        storage.delete("a").unwrap();
        assert_eq!(storage.list().unwrap(), vec!["b"]);
        assert!(matches!(
            storage.delete("a"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_returns_independent_copy() {
        let storage = MemoryStorage::new();
        let boards = BoardSet::new();
        storage.save("main", &boards).unwrap();

        let mut first = storage.load("main").unwrap();
        let root = first.root_board_id().unwrap();
        first.board_mut(root).unwrap().title = "mutated".to_string();

        let second = storage.load("main").unwrap();
        assert_eq!(second.board(root).unwrap().title, "Home");
    }
}
