//! Error types for GRIB2 reading.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Grib2Error>;

#[derive(Debug, Error)]
pub enum Grib2Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid GRIB2 data: {0}")]
    InvalidFormat(String),

    #[error("invalid section {section}: {reason}")]
    InvalidSection { section: u8, reason: String },

    #[error("unsupported template {section}.{template}")]
    UnsupportedTemplate { section: u8, template: u16 },

    /// The side-car index does not describe the file it sits next to.
    #[error("stale index {}: {reason}", path.display())]
    StaleIndex { path: PathBuf, reason: String },

    #[error("failed to decode values: {0}")]
    Decode(String),
}

impl Grib2Error {
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    pub fn section(section: u8, reason: impl Into<String>) -> Self {
        Self::InvalidSection {
            section,
            reason: reason.into(),
        }
    }

    pub fn stale(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::StaleIndex {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<Grib2Error> for climate_common::PipeError {
    fn from(err: Grib2Error) -> Self {
        match err {
            Grib2Error::Io(e) => climate_common::PipeError::Io(e),
            Grib2Error::StaleIndex { path, reason } => climate_common::PipeError::StaleIndex(
                format!("{}: {}", path.display(), reason),
            ),
            other => climate_common::PipeError::decode(other.to_string()),
        }
    }
}
