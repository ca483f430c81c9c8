//! Local filesystem storage backend.

use std::fs;
use std::path::PathBuf;

use crate::storage::{DatasetStorage, StorageError};

/// Reads the dataset from a file on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Create a storage backend for the dataset file at `path`.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DatasetStorage for LocalStorage {
    fn read_dataset(&self) -> Result<String, StorageError> {
        if !self.path.exists() {
            return Err(StorageError::NotFound(self.path.display().to_string()));
        }

        fs::read_to_string(&self.path)
            .map_err(|e| StorageError::ReadError(format!("{}: {e}", self.path.display())))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
