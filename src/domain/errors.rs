//! Domain error types
//!
//! This module defines the error hierarchy for the HL7 engine.
//! Errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main engine error type
///
/// This is the primary error type used throughout the library.
/// Expected processing failures (invalid messages, unsupported types, handler
/// rejections) are reported as [`crate::core::dispatch::ProcessingResult`]
/// values instead; this type covers everything that prevents an operation
/// from producing a value at all.
#[derive(Debug, Error)]
pub enum Hl7Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Structural validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Message or segment could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Outbound message could not be built
    #[error("Build error: {0}")]
    Build(String),

    /// Outbound transport errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

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

/// Transport-specific errors
///
/// Errors that occur when delivering a message to a remote HL7 endpoint.
/// These errors don't expose the HTTP client types.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to reach the destination
    #[error("Failed to connect to HL7 endpoint: {0}")]
    ConnectionFailed(String),

    /// Destination URL is malformed
    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for Hl7Error {
    fn from(err: std::io::Error) -> Self {
        Hl7Error::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for Hl7Error {
    fn from(err: serde_json::Error) -> Self {
        Hl7Error::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for Hl7Error {
    fn from(err: toml::de::Error) -> Self {
        Hl7Error::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hl7_error_display() {
        let err = Hl7Error::Parse("line 2 is too short".to_string());
        assert_eq!(err.to_string(), "Parse error: line 2 is too short");
    }

    #[test]
    fn test_transport_error_conversion() {
        let transport_err = TransportError::ConnectionFailed("refused".to_string());
        let err: Hl7Error = transport_err.into();
        assert!(matches!(err, Hl7Error::Transport(_)));
    }

    #[test]
    fn test_transport_status_display() {
        let err = TransportError::ServerError {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Server error: 503 - unavailable");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: Hl7Error = io_err.into();
        assert!(matches!(err, Hl7Error::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: Hl7Error = json_err.into();
        assert!(matches!(err, Hl7Error::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: Hl7Error = toml_err.into();
        assert!(matches!(err, Hl7Error::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_hl7_error_implements_std_error() {
        let err = Hl7Error::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
