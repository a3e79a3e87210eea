//! Domain error types
//!
//! This module defines the error hierarchy for Porter. All errors are
//! domain-specific and don't expose third-party types; driver and SDK
//! errors are converted to these variants at the adapter boundary.

use thiserror::Error;

/// Main Porter error type
///
/// This is the primary error type used throughout the application.
/// The variants mirror the failure taxonomy of the export worker:
/// a parse failure has no export to report against, while every
/// post-parse failure resolves to a `Failed` status row.
#[derive(Debug, Error)]
pub enum PorterError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed inbound message payloads
    #[error("Parse error: {0}")]
    Parse(String),

    /// Message bus consumption errors
    #[error("Consumer error: {0}")]
    Consumer(String),

    /// Relational store errors (data fetch)
    #[error("Database error: {0}")]
    Database(String),

    /// Status store errors
    ///
    /// Fatal for the affected request: the failure cannot be reported
    /// through the status row, only through process logs.
    #[error("Status store error: {0}")]
    Status(String),

    /// Transform pipeline errors
    #[error("Transform error: {0}")]
    Transform(String),

    /// Object-storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl PorterError {
    /// Whether this error occurred before any request could be identified
    ///
    /// Parse failures carry no `export_id`, so there is no status row to
    /// transition; everything else surfaces as a `Failed` status.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, PorterError::Parse(_))
    }
}

/// Object-storage specific errors
///
/// Errors that occur when persisting an artifact or resolving its link.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to reach the object store
    #[error("Failed to connect to object storage: {0}")]
    ConnectionFailed(String),

    /// Failed to create the target bucket
    #[error("Failed to create bucket '{bucket}': {message}")]
    BucketCreationFailed { bucket: String, message: String },

    /// Failed to upload the artifact object
    #[error("Failed to upload object '{key}': {message}")]
    UploadFailed { key: String, message: String },

    /// Failed to produce a retrievable link for the artifact
    #[error("Failed to generate link for '{key}': {message}")]
    LinkFailed { key: String, message: String },
}

// Conversion from std::io::Error
impl From<std::io::Error> for PorterError {
    fn from(err: std::io::Error) -> Self {
        PorterError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for PorterError {
    fn from(err: serde_json::Error) -> Self {
        PorterError::Serialization(err.to_string())
    }
}

// Conversion from csv::Error
impl From<csv::Error> for PorterError {
    fn from(err: csv::Error) -> Self {
        PorterError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for PorterError {
    fn from(err: toml::de::Error) -> Self {
        PorterError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_porter_error_display() {
        let err = PorterError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_storage_error_conversion() {
        let storage_err = StorageError::UploadFailed {
            key: "exports/foo.csv".to_string(),
            message: "timeout".to_string(),
        };
        let err: PorterError = storage_err.into();
        assert!(matches!(err, PorterError::Storage(_)));
        assert!(err.to_string().contains("exports/foo.csv"));
    }

    #[test]
    fn test_parse_error_classification() {
        assert!(PorterError::Parse("bad payload".to_string()).is_parse_error());
        assert!(!PorterError::Database("down".to_string()).is_parse_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: PorterError = io_err.into();
        assert!(matches!(err, PorterError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: PorterError = json_err.into();
        assert!(matches!(err, PorterError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: PorterError = toml_err.into();
        assert!(matches!(err, PorterError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_porter_error_implements_std_error() {
        let err = PorterError::Transform("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
