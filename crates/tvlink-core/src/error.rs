//! Error types for tvlink Core

use thiserror::Error;

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, Error>;

/// Controller error types
#[derive(Error, Debug)]
pub enum Error {
    // Command errors
    #[error("URL is null")]
    UrlNull,

    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("Method not implemented: {0}")]
    NotImplemented(String),

    #[error("Player has been disposed")]
    Disposed,

    // Engine errors
    #[error("Engine rejected request: {0}")]
    Engine(String),

    // Network errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an engine error
    pub fn engine(msg: impl Into<String>) -> Self {
        Error::Engine(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns the error code reported across the method-call bridge
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::UrlNull => "URL_NULL",
            Error::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Error::NotImplemented(_) => "NOT_IMPLEMENTED",
            Error::Disposed => "DISPOSED",
            Error::Engine(_) => "ENGINE",
            Error::Network(_) => "NETWORK",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Json(_) => "JSON",
        }
    }
}

/// Failures while turning DRM key material into an engine configuration.
///
/// These never abort playback: the controller logs them and loads the
/// source without DRM.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrmError {
    #[error("Invalid license server URL: {0}")]
    InvalidLicenseUrl(String),

    #[error("Key value is empty")]
    EmptyKey,

    #[error("Malformed hex in {field}: {reason}")]
    MalformedHex { field: &'static str, reason: String },

    #[error("Failed to encode clear-key document: {0}")]
    Encode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::UrlNull.error_code(), "URL_NULL");
        assert_eq!(Error::Disposed.error_code(), "DISPOSED");
        assert_eq!(Error::engine("load failed").error_code(), "ENGINE");
    }

    #[test]
    fn test_url_null_message() {
        assert_eq!(Error::UrlNull.to_string(), "URL is null");
    }
}
