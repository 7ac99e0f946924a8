//! Storage errors.

use climate_common::PipeError;
use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    /// Nothing found for the requested time or path.
    #[error("{0}")]
    NoData(String),

    #[error("object store error: {0}")]
    Store(#[from] object_store::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage configuration error: {0}")]
    Config(String),
}

impl From<StorageError> for PipeError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NoData(what) => PipeError::NoData(what),
            StorageError::Io(e) => PipeError::Io(e),
            StorageError::Config(msg) => PipeError::Config(msg),
            StorageError::Store(e) => PipeError::source(e.to_string()),
        }
    }
}
