//! Request-level error taxonomy for the climate pipelines.

use thiserror::Error;

/// Result type alias using PipeError.
pub type PipeResult<T> = Result<T, PipeError>;

/// Everything that can end a pipeline request.
///
/// Failures never reach the client as raw errors: they are turned into a
/// failure payload whose `STATUS` comes from [`PipeError::status`].
#[derive(Debug, Error)]
pub enum PipeError {
    // === Client errors ===
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    // === Data errors ===
    #[error("no data available for {0}")]
    NoData(String),

    /// A side-car index stayed unusable after one rebuild.
    #[error("stale index: {0}")]
    StaleIndex(String),

    #[error("no message matching filter '{0}'")]
    MissingField(String),

    #[error("geometry mismatch: {0}")]
    GeometryMismatch(String),

    #[error("failed to decode source data: {0}")]
    Decode(String),

    // === Infrastructure errors ===
    #[error("source error: {0}")]
    Source(String),

    #[error("rendering failed: {0}")]
    Render(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipeError {
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::GeometryMismatch(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Short machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            PipeError::UnknownVariable(_) => "UNKNOWN_VARIABLE",
            PipeError::InvalidRequest(_) => "INVALID_REQUEST",
            PipeError::NoData(_) => "NO_DATA",
            PipeError::StaleIndex(_) => "STALE_INDEX",
            PipeError::MissingField(_) => "MISSING_FIELD",
            PipeError::GeometryMismatch(_) => "GEOMETRY_MISMATCH",
            _ => "ERROR",
        }
    }

    /// Value of the `STATUS` field in a failure payload. Never `"SUCCESS"`.
    pub fn status(&self) -> String {
        format!("{}: {}", self.code(), self)
    }

    /// True for errors caused by the request itself rather than the data.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipeError::UnknownVariable(_) | PipeError::InvalidRequest(_)
        )
    }

    /// HTTP status a service layer would answer with.
    pub fn http_status_code(&self) -> u16 {
        match self {
            PipeError::UnknownVariable(_) | PipeError::InvalidRequest(_) => 400,
            PipeError::NoData(_) | PipeError::MissingField(_) => 404,
            _ => 500,
        }
    }
}

impl From<serde_json::Error> for PipeError {
    fn from(err: serde_json::Error) -> Self {
        PipeError::Render(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_never_success() {
        let errors = [
            PipeError::UnknownVariable("xyz".into()),
            PipeError::NoData("2024-01-01 12z".into()),
            PipeError::geometry("lon axis differs"),
            PipeError::render("boom"),
        ];
        for err in &errors {
            assert_ne!(err.status(), "SUCCESS");
            assert!(err.status().starts_with(err.code()));
        }
    }

    #[test]
    fn test_client_errors() {
        assert!(PipeError::UnknownVariable("xyz".into()).is_client_error());
        assert!(!PipeError::geometry("x").is_client_error());
        assert_eq!(PipeError::NoData("x".into()).http_status_code(), 404);
    }
}
