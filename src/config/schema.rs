//! Configuration schema types
//!
//! This module defines the configuration structure for the HL7 engine. Every
//! section has defaults, so an empty file (or no file at all) yields a usable
//! configuration with the conventional EMR header values.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main engine configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Hl7Config {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// MSH header values used for outbound messages and ACKs
    #[serde(default)]
    pub header: HeaderConfig,

    /// Outbound HTTP transport
    #[serde(default)]
    pub transport: TransportConfig,

    /// Audit trail of processed inbound messages
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Hl7Config {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.header.validate()?;
        self.transport.validate(&self.environment)?;
        self.audit.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether the HL7 interface accepts inbound messages
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            enabled: true,
        }
    }
}

/// MSH header values
///
/// ADT and ORM messages are sent from `sending_application` to their family
/// receiver; ORU results travel from `oru_sender` back to `oru_receiver`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderConfig {
    /// MSH-3 for ADT/ORM messages and the fallback ACK sender
    #[serde(default = "default_sending_application")]
    pub sending_application: String,

    /// MSH-4 for every outbound message
    #[serde(default = "default_sending_facility")]
    pub sending_facility: String,

    /// MSH-6 for every outbound message
    #[serde(default = "default_receiving_facility")]
    pub receiving_facility: String,

    /// MSH-5 for ADT messages
    #[serde(default = "default_adt_receiver")]
    pub adt_receiver: String,

    /// MSH-5 for ORM messages
    #[serde(default = "default_orm_receiver")]
    pub orm_receiver: String,

    /// MSH-3 for ORU messages
    #[serde(default = "default_oru_sender")]
    pub oru_sender: String,

    /// MSH-5 for ORU messages
    #[serde(default = "default_oru_receiver")]
    pub oru_receiver: String,

    /// MSH-11 processing ID (P, T or D)
    #[serde(default = "default_processing_id")]
    pub processing_id: String,

    /// MSH-12 version ID
    #[serde(default = "default_version")]
    pub version: String,
}

impl HeaderConfig {
    fn validate(&self) -> Result<(), String> {
        let named = [
            ("sending_application", &self.sending_application),
            ("sending_facility", &self.sending_facility),
            ("receiving_facility", &self.receiving_facility),
            ("adt_receiver", &self.adt_receiver),
            ("orm_receiver", &self.orm_receiver),
            ("oru_sender", &self.oru_sender),
            ("oru_receiver", &self.oru_receiver),
            ("version", &self.version),
        ];

        for (name, value) in named {
            if value.is_empty() {
                return Err(format!("header.{name} cannot be empty"));
            }
            // Header values are written without escaping
            if value.contains(['|', '^', '~', '\\', '&', '\r', '\n']) {
                return Err(format!(
                    "header.{name} must not contain HL7 delimiter characters, got '{value}'"
                ));
            }
        }

        let valid_processing_ids = ["P", "T", "D"];
        if !valid_processing_ids.contains(&self.processing_id.as_str()) {
            return Err(format!(
                "Invalid header.processing_id '{}'. Must be one of: {}",
                self.processing_id,
                valid_processing_ids.join(", ")
            ));
        }

        Ok(())
    }
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            sending_application: default_sending_application(),
            sending_facility: default_sending_facility(),
            receiving_facility: default_receiving_facility(),
            adt_receiver: default_adt_receiver(),
            orm_receiver: default_orm_receiver(),
            oru_sender: default_oru_sender(),
            oru_receiver: default_oru_receiver(),
            processing_id: default_processing_id(),
            version: default_version(),
        }
    }
}

/// Outbound HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Default destination URL for outbound messages
    #[serde(default)]
    pub destination: Option<String>,

    /// Bearer token sent with every outbound request
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub auth_token: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Timeout for the connection health probe in seconds
    #[serde(default = "default_health_timeout_seconds")]
    pub health_timeout_seconds: u64,

    /// TLS certificate verification enabled
    ///
    /// Must stay `true` in production (enforced by validation).
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl TransportConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        if let Some(ref destination) = self.destination {
            validate_destination(destination)?;
        }

        if self.timeout_seconds == 0 {
            return Err("transport.timeout_seconds must be > 0".to_string());
        }

        if self.health_timeout_seconds == 0 {
            return Err("transport.health_timeout_seconds must be > 0".to_string());
        }

        if *environment == Environment::Production && !self.tls_verify {
            return Err(
                "TLS certificate verification cannot be disabled in production environments"
                    .to_string(),
            );
        }

        Ok(())
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            destination: None,
            auth_token: None,
            timeout_seconds: default_timeout_seconds(),
            health_timeout_seconds: default_health_timeout_seconds(),
            tls_verify: true,
        }
    }
}

/// Checks that a destination is an absolute http(s) URL
pub fn validate_destination(destination: &str) -> Result<(), String> {
    let url = url::Url::parse(destination)
        .map_err(|e| format!("Invalid transport destination '{destination}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!(
            "transport destination must use http or https, got '{other}'"
        )),
    }
}

/// Audit trail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Append an entry per processed inbound message
    #[serde(default)]
    pub enabled: bool,

    /// Audit file path
    #[serde(default = "default_audit_path")]
    pub path: String,

    /// Write JSON lines instead of plain text
    #[serde(default = "default_true")]
    pub json_format: bool,
}

impl AuditConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.path.is_empty() {
            return Err("audit.path cannot be empty when audit is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_audit_path(),
            json_format: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to a rolling file in addition to the console
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// File rotation (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_sending_application() -> String {
    "EMR".to_string()
}

fn default_sending_facility() -> String {
    "HOSPITAL".to_string()
}

fn default_receiving_facility() -> String {
    "DESTINATION".to_string()
}

fn default_adt_receiver() -> String {
    "RECEIVER".to_string()
}

fn default_orm_receiver() -> String {
    "LAB".to_string()
}

fn default_oru_sender() -> String {
    "LAB".to_string()
}

fn default_oru_receiver() -> String {
    "EMR".to_string()
}

fn default_processing_id() -> String {
    "P".to_string()
}

fn default_version() -> String {
    "2.5".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_health_timeout_seconds() -> u64 {
    5
}

fn default_audit_path() -> String {
    "./logs/hl7-audit.log".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[test]
    fn test_default_config_is_valid() {
        let config = Hl7Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.header.version, "2.5");
        assert!(config.application.enabled);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: Hl7Config = toml::from_str("").unwrap();
        assert_eq!(config.header.sending_application, "EMR");
        assert_eq!(config.header.orm_receiver, "LAB");
        assert_eq!(config.transport.timeout_seconds, 30);
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Hl7Config::default();
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_header_rejects_delimiters() {
        let mut config = Hl7Config::default();
        config.header.sending_facility = "WARD|3".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("delimiter"));
    }

    #[test]
    fn test_header_rejects_unknown_processing_id() {
        let mut config = Hl7Config::default();
        config.header.processing_id = "X".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_transport_destination_must_be_http() {
        let mut config = Hl7Config::default();
        config.transport.destination = Some("ftp://his.example.org".to_string());
        assert!(config.validate().is_err());

        config.transport.destination = Some("not a url".to_string());
        assert!(config.validate().is_err());

        config.transport.destination = Some("https://his.example.org/hl7".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_requires_tls_verification() {
        let mut config = Hl7Config::default();
        config.environment = Environment::Production;
        config.transport.tls_verify = false;
        assert!(config.validate().is_err());

        config.environment = Environment::Staging;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auth_token_is_redacted_in_debug() {
        let mut config = Hl7Config::default();
        config.transport.auth_token = Some(secret_string("bearer-123".to_string()));
        let debug = format!("{config:?}");
        assert!(!debug.contains("bearer-123"));
    }

    #[test]
    fn test_invalid_rotation() {
        let mut config = Hl7Config::default();
        config.logging.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }
}
