//! File-backed storage: one pretty-printed JSON file per workspace.

use super::{Storage, StorageError, StorageResult};
use crate::board::BoardSet;
use std::fs;
use std::path::PathBuf;

/// Stores each workspace as `<dir>/<id>.json`. Saves write to a temporary
/// file in the same directory and rename over the target, so a crash
/// mid-write never leaves a truncated workspace behind.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open storage rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, boards: &BoardSet) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(boards)?;
        let target = self.path_for(id);
        let tmp = self.dir.join(format!(".{id}.json.tmp"));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &target)?;
        Ok(())
    }

    fn load(&self, id: &str) -> StorageResult<BoardSet> {
        let path = self.path_for(id);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let path = self.path_for(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if !stem.starts_with('.') {
                        ids.push(stem.to_string());
                    }
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn exists(&self, id: &str) -> bool {
        self.path_for(id).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardSet;

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let boards = BoardSet::new();
        storage.save("main", &boards).unwrap();
        assert!(storage.exists("main"));

        let loaded = storage.load("main").unwrap();
        assert_eq!(loaded.current_board_id(), boards.current_board_id());
    }

    #[test]
    fn test_missing_workspace_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        assert!(matches!(
            storage.load("ghost"),
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            storage.delete("ghost"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_skips_non_json_and_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        storage.save("a", &BoardSet::new()).unwrap();
        storage.save("b", &BoardSet::new()).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join(".c.json.tmp"), "x").unwrap();

        assert_eq!(storage.list().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_corrupt_file_is_serde_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        assert!(matches!(
            storage.load("bad"),
            Err(StorageError::Serde(_))
        ));
    }

    #[test]
    fn test_overwrite_replaces_previous_save() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let mut boards = BoardSet::new();
        storage.save("main", &boards).unwrap();

        let root = boards.root_board_id().unwrap();
        boards.board_mut(root).unwrap().title = "renamed".to_string();
        storage.save("main", &boards).unwrap();

        let loaded = storage.load("main").unwrap();
        assert_eq!(loaded.board(root).unwrap().title, "renamed");
    }
}
