//! Fixed local file source (the sensor archive).

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::{StorageError, StorageResult};
use crate::locator::FileLister;

#[derive(Debug, Clone)]
pub struct LocalSource {
    path: PathBuf,
}

impl LocalSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The archive path, or `NoData` when it does not exist.
    pub fn resolve(&self) -> StorageResult<PathBuf> {
        if self.path.is_file() {
            Ok(self.path.clone())
        } else {
            Err(StorageError::NoData(format!(
                "archive not found: {}",
                self.path.display()
            )))
        }
    }
}

#[async_trait]
impl FileLister for LocalSource {
    async fn list_files(&self, prefix: &str) -> Vec<String> {
        let path = self.path.to_string_lossy();
        if path.starts_with(prefix) && self.path.is_file() {
            vec![path.into_owned()]
        } else {
            Vec::new()
        }
    }
}
