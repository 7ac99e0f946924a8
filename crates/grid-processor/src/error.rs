//! Error types for grid processing.

use climate_common::PipeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GridProcessorError>;

/// Errors that can occur during grid processing.
#[derive(Error, Debug)]
pub enum GridProcessorError {
    /// Source coordinates are unusable (no finite points, zero extent).
    #[error("invalid source grid: {0}")]
    InvalidGrid(String),

    /// Fields that must share coordinates do not.
    #[error("geometry mismatch: {0}")]
    GeometryMismatch(String),

    /// Nothing of the field lies strictly inside the window.
    #[error("no grid points inside window {0}")]
    EmptyCrop(String),

    /// The worker pool could not be created.
    #[error("worker pool error: {0}")]
    Pool(String),
}

impl GridProcessorError {
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }

    pub fn mismatch(msg: impl Into<String>) -> Self {
        Self::GeometryMismatch(msg.into())
    }
}

impl From<GridProcessorError> for PipeError {
    fn from(err: GridProcessorError) -> Self {
        match err {
            GridProcessorError::GeometryMismatch(msg) => PipeError::GeometryMismatch(msg),
            GridProcessorError::InvalidGrid(msg) => PipeError::GeometryMismatch(msg),
            GridProcessorError::EmptyCrop(window) => {
                PipeError::NoData(format!("grid points inside {}", window))
            }
            GridProcessorError::Pool(msg) => PipeError::Config(msg),
        }
    }
}
