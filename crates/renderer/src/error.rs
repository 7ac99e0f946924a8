//! Rendering errors.

use climate_common::PipeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("unknown colormap '{0}'")]
    UnknownColormap(String),

    #[error("invalid value range [{vmin}, {vmax}]")]
    InvalidRange { vmin: f64, vmax: f64 },

    #[error("dimension mismatch: {0}")]
    Dimensions(String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

impl From<RenderError> for PipeError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Dimensions(msg) => PipeError::GeometryMismatch(msg),
            other => PipeError::render(other.to_string()),
        }
    }
}
