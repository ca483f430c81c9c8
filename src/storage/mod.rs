//! Dataset storage trait and implementations.
//!
//! A storage backend supplies the raw text of the dataset; parsing happens
//! in [`crate::dataset`]. This keeps the cache independent of where the
//! data lives (local file today, anything readable tomorrow).

pub mod local;

/// Errors that can occur while reading the dataset.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Dataset not found: {0}")]
    NotFound(String),

    #[error("Failed to read: {0}")]
    ReadError(String),
}

/// Trait for dataset storage backends.
pub trait DatasetStorage: Send + Sync {
    /// Read the full dataset text.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the dataset cannot be read.
    fn read_dataset(&self) -> Result<String, StorageError>;

    /// Human-readable location of the dataset, for logs and messages.
    fn location(&self) -> String;
}
