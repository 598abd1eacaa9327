use std::path::PathBuf;

use async_trait::async_trait;

use super::{StorageError, WorkbookStore};

/// Workbook on local disk. A missing file is an empty workbook, matching
/// the remote backend's not-found-yet case.
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl WorkbookStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, bytes: &[u8]) -> Result<(), StorageError> {
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}
