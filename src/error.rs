//! Error types for background resolution.

use thiserror::Error;

/// Failure classes a background update can end in.
///
/// Local errors (configuration, arguments, IO) have no class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Network,
    MalformedResponse,
    Decode,
}

/// Crate-wide error type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackdropError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Image catalog is empty")]
    EmptyCatalog,

    #[error("IO error: {0}")]
    Io(String),
}

impl BackdropError {
    pub fn class(&self) -> Option<FailureClass> {
        match self {
            BackdropError::Network(_) | BackdropError::Http { .. } => Some(FailureClass::Network),
            BackdropError::MalformedResponse(_) | BackdropError::EmptyCatalog => {
                Some(FailureClass::MalformedResponse)
            }
            BackdropError::Decode(_) => Some(FailureClass::Decode),
            BackdropError::Config(_) | BackdropError::InvalidArgument(_) | BackdropError::Io(_) => {
                None
            }
        }
    }
}

impl From<reqwest::Error> for BackdropError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return BackdropError::Http {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            };
        }
        if err.is_decode() {
            return BackdropError::MalformedResponse(err.to_string());
        }
        BackdropError::Network(err.to_string())
    }
}

impl From<std::io::Error> for BackdropError {
    fn from(err: std::io::Error) -> Self {
        BackdropError::Io(err.to_string())
    }
}

impl From<config::ConfigError> for BackdropError {
    fn from(err: config::ConfigError) -> Self {
        BackdropError::Config(err.to_string())
    }
}
