//! Byte-level persistence adapters for the catalog.
//!
//! The catalog is durable as one opaque blob (a JSON array of products); the
//! adapter only moves bytes. Every write replaces the previous blob in full.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not read catalog `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not write catalog `{path}`: {source}")]
    Write { path: PathBuf, source: std::io::Error },
}

#[async_trait]
pub trait CatalogStorage: Send + Sync {
    async fn read(&self) -> Result<Vec<u8>, StorageError>;
    async fn write(&self, bytes: &[u8]) -> Result<(), StorageError>;
}

/// Whole-file JSON storage. A file that does not exist yet reads as an empty
/// catalog; the first successful write creates it.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogStorage for JsonFileStorage {
    async fn read(&self) -> Result<Vec<u8>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(bytes),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(StorageError::Read { path: self.path.clone(), source }),
        }
    }

    async fn write(&self, bytes: &[u8]) -> Result<(), StorageError> {
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|source| StorageError::Write { path: self.path.clone(), source })
    }
}

/// Storage that never leaves the process. Backs tests and dry runs.
#[derive(Default)]
pub struct InMemoryStorage {
    bytes: RwLock<Vec<u8>>,
}

impl InMemoryStorage {
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: RwLock::new(bytes.into()) }
    }
}

#[async_trait]
impl CatalogStorage for InMemoryStorage {
    async fn read(&self) -> Result<Vec<u8>, StorageError> {
        Ok(self.bytes.read().await.clone())
    }

    async fn write(&self, bytes: &[u8]) -> Result<(), StorageError> {
        *self.bytes.write().await = bytes.to_vec();
        Ok(())
    }
}
