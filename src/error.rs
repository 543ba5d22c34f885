//! Error types and handling for Auriga
//!
//! This module defines the error types used throughout the application,
//! providing consistent error handling and reporting.

use thiserror::Error;

/// Result type alias for Auriga operations
pub type Result<T> = std::result::Result<T, AurigaError>;

/// Main error type for Auriga
#[derive(Debug, Error)]
pub enum AurigaError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Authentication/authorization errors (credentials rejected upstream)
    #[error("Authentication error: {message}")]
    Auth { message: String },

    /// Network-related errors
    #[error("Network error: {message}")]
    Network { message: String },

    /// Timeout errors
    #[error("Timeout error: {message}")]
    Timeout { message: String },

    /// Upstream API errors (unexpected status or payload)
    #[error("API error: {message}")]
    Api { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

impl AurigaError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        AurigaError::Config {
            message: message.into(),
        }
    }

    /// Create a new auth error
    pub fn auth<S: Into<String>>(message: S) -> Self {
        AurigaError::Auth {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        AurigaError::Network {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        AurigaError::Timeout {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        AurigaError::Api {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        AurigaError::Io {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        AurigaError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        AurigaError::Generic {
            message: message.into(),
        }
    }

    /// Whether this error means the stored credentials were rejected.
    ///
    /// Authentication failures are fatal at setup and require operator
    /// re-entry later; every other error kind reaching the coordinator is
    /// treated as transient and retried on the next scheduled tick.
    pub fn is_authentication(&self) -> bool {
        matches!(self, AurigaError::Auth { .. })
    }
}

impl From<std::io::Error> for AurigaError {
    fn from(err: std::io::Error) -> Self {
        AurigaError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for AurigaError {
    fn from(err: serde_yaml::Error) -> Self {
        AurigaError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AurigaError {
    fn from(err: serde_json::Error) -> Self {
        AurigaError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for AurigaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AurigaError::timeout(err.to_string())
        } else if err.is_decode() {
            AurigaError::Serialization {
                message: err.to_string(),
            }
        } else {
            AurigaError::network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = AurigaError::config("test config error");
        assert!(matches!(err, AurigaError::Config { .. }));

        let err = AurigaError::auth("test auth error");
        assert!(matches!(err, AurigaError::Auth { .. }));

        let err = AurigaError::validation("field", "test validation error");
        assert!(matches!(err, AurigaError::Validation { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = AurigaError::config("test error");
        let error_string = format!("{}", err);
        assert_eq!(error_string, "Configuration error: test error");

        let err = AurigaError::validation("test_field", "invalid value");
        let error_string = format!("{}", err);
        assert_eq!(error_string, "Validation error: test_field - invalid value");
    }

    #[test]
    fn test_authentication_classification() {
        assert!(AurigaError::auth("expired session").is_authentication());
        assert!(!AurigaError::network("connection reset").is_authentication());
        assert!(!AurigaError::timeout("deadline").is_authentication());
        assert!(!AurigaError::api("HTTP 500").is_authentication());
    }
}
