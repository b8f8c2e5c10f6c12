//! Custom error types for oauth-automator
//!
//! This module defines the error hierarchy for the crate using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for oauth-automator operations
#[derive(Error, Debug)]
pub enum AutomatorError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for keys, values and credentials
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Encryption errors (including failed authentication of stored records)
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// The key file could not be created or restricted to its owner
    #[error("Key file permission error: {0}")]
    KeyPermission(String),

    /// Storage errors (temp file writes, atomic replace)
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AutomatorError {
    /// Create a "not found" error for history records
    pub fn record_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "History record",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an encryption error
    pub fn is_encryption(&self) -> bool {
        matches!(self, Self::Encryption(_))
    }
}

impl From<std::io::Error> for AutomatorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AutomatorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for oauth-automator operations
pub type AutomatorResult<T> = Result<T, AutomatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AutomatorError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = AutomatorError::record_not_found("#7");
        assert_eq!(err.to_string(), "History record not found: #7");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_key_permission_error() {
        let err = AutomatorError::KeyPermission("mode is 0644".into());
        assert_eq!(err.to_string(), "Key file permission error: mode is 0644");
        assert!(!err.is_encryption());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AutomatorError = io_err.into();
        assert!(matches!(err, AutomatorError::Io(_)));
    }
}
