use thiserror::Error;

/// Result alias used by every client in this crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to parse upstream data, error: {0}")]
    ParseError(String),

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Deserialization error: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Upstream {service} responded with status {status}")]
    UnexpectedStatus {
        service: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("Token refresh failed: {0}")]
    AuthRefreshError(String),

    #[error("Lyrics not found for {artist} - {title}")]
    LyricsNotFound { artist: String, title: String },

    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
