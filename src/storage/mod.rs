pub mod drive;
pub mod local;

use async_trait::async_trait;

pub use drive::DriveStore;
pub use local::LocalStore;

#[derive(Debug)]
pub enum StorageError {
    Workbook(String),
    Io(std::io::Error),
    Remote(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Workbook(msg) => write!(f, "Workbook error: {msg}"),
            StorageError::Io(err) => write!(f, "I/O error: {err}"),
            StorageError::Remote(msg) => write!(f, "Remote error: {msg}"),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

/// A place a workbook lives. `load` returns `None` when no workbook exists
/// yet; `store` rewrites the whole file.
#[async_trait]
pub trait WorkbookStore: Send + Sync {
    /// Short label for log lines.
    fn name(&self) -> &'static str;

    async fn load(&self) -> Result<Option<Vec<u8>>, StorageError>;

    async fn store(&self, bytes: &[u8]) -> Result<(), StorageError>;
}
