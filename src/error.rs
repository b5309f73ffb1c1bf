//! Error types for Fusion Hub.

use thiserror::Error;

/// Library-level error type for Fusion Hub operations.
#[derive(Error, Debug)]
pub enum HubError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// A hosted model or upstream service call failed (network, auth, quota, bad response).
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Failed to stage uploaded file: {0}")]
    Staging(#[source] std::io::Error),

    #[error("Transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    #[error("Unknown surface: {0}")]
    UnknownSurface(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl From<reqwest::Error> for HubError {
    fn from(err: reqwest::Error) -> Self {
        HubError::Upstream(err.to_string())
    }
}

impl HubError {
    /// HTTP status used when the error is reported by the API server.
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            HubError::Upstream(_) => StatusCode::BAD_GATEWAY,
            HubError::TranscriptUnavailable(_) | HubError::UnknownSurface(_) => {
                StatusCode::NOT_FOUND
            }
            HubError::InvalidInput(_) | HubError::Json(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type alias for Fusion Hub operations.
pub type Result<T> = std::result::Result<T, HubError>;
