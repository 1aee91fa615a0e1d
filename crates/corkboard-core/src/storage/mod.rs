//! Persistence for whole board sets, keyed by a workspace id.
//!
//! Saves are synchronous and atomic per workspace: a save either replaces
//! the stored set completely or fails without touching it.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::board::BoardSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("workspace not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A place board sets can be saved to and loaded from.
pub trait Storage {
    fn save(&self, id: &str, boards: &BoardSet) -> StorageResult<()>;
    fn load(&self, id: &str) -> StorageResult<BoardSet>;
    fn delete(&self, id: &str) -> StorageResult<()>;
    fn list(&self) -> StorageResult<Vec<String>>;

    fn exists(&self, id: &str) -> bool {
        self.load(id).is_ok()
    }
}
