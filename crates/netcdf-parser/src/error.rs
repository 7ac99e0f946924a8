//! Error types for sensor archive reads.

use climate_common::PipeError;
use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reported by the netcdf library
    #[error("NetCDF error: {0}")]
    Library(#[from] netcdf::Error),

    /// Requested data variable is not in the archive
    #[error("variable '{0}' not found in archive")]
    UnknownVariable(String),

    /// Missing required variable, dimension or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl From<NetCdfError> for PipeError {
    fn from(err: NetCdfError) -> Self {
        match err {
            NetCdfError::IoError(e) => PipeError::Io(e),
            NetCdfError::UnknownVariable(name) => PipeError::UnknownVariable(name),
            other => PipeError::decode(other.to_string()),
        }
    }
}
