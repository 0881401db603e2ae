//! # Error Handling Module
//!
//! This module defines the error type shared by the configuration layer, the
//! access-log writer and the demo server, using the `thiserror` crate.
//!
//! ## Where errors do NOT flow
//! Logging must never break the HTTP data path. The access-log middleware and
//! its writer report failures to the process log and carry on; none of the
//! variants below is ever surfaced to an HTTP client because of logging.
//!
//! The counting transport is transparent: it hands the inner executor's error
//! back as a [`BoxError`] without wrapping it in [`TrafficLogError`].

use thiserror::Error;

/// Main result type used throughout the crate
pub type TrafficLogResult<T> = Result<T, TrafficLogError>;

/// Type-erased error crossing the client transport seam
///
/// Executors return their own error types boxed, so a chain of transports
/// can pass an error through untouched and callers can still downcast it.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error types for the traffic-log utilities
///
/// The `#[error("...")]` attribute from `thiserror` implements `Display`
/// with the given message.
#[derive(Debug, Error, Clone)]
pub enum TrafficLogError {
    /// Configuration-related errors (invalid config, missing files, etc.)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// I/O errors (log file operations, listener binding, etc.)
    #[error("I/O error: {message}")]
    Io { message: String },

    /// YAML parsing errors for configuration files
    #[error("YAML error: {message}")]
    Yaml { message: String },

    /// HTTP client errors (building the default client, etc.)
    #[error("HTTP client error: {message}")]
    HttpClient { message: String },

    /// Internal errors for unexpected failures
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl TrafficLogError {
    /// Create a configuration error with a custom message
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error with a custom message
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Short machine-readable name of the error kind, logged on startup failure
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration_error",
            Self::Io { .. } => "io_error",
            Self::Yaml { .. } => "yaml_error",
            Self::HttpClient { .. } => "http_client_error",
            Self::Internal { .. } => "internal_error",
        }
    }
}

impl From<std::io::Error> for TrafficLogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for TrafficLogError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for TrafficLogError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpClient {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TrafficLogError::config("bad port").to_string(),
            "Configuration error: bad port"
        );
        assert_eq!(
            TrafficLogError::internal("boom").to_string(),
            "Internal error: boom"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: TrafficLogError = io.into();
        assert_eq!(err.error_type(), "io_error");
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_yaml_conversion() {
        let yaml_err = serde_yaml::from_str::<u32>("not: [a number").unwrap_err();
        let err: TrafficLogError = yaml_err.into();
        assert_eq!(err.error_type(), "yaml_error");
    }
}
