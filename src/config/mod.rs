//! Configuration management for the HL7 engine.
//!
//! TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Configuration files support:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Default values for every setting
//! - `EMR_HL7_<SECTION>_<KEY>` environment overrides
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level and the inbound interface switch
//! - [`HeaderConfig`] - MSH application/facility names, processing ID, version
//! - [`TransportConfig`] - outbound destination, bearer token, timeouts
//! - [`AuditConfig`] - audit trail of processed messages
//! - [`LoggingConfig`] - rolling JSON log file
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//! enabled = true
//!
//! [header]
//! sending_application = "EMR"
//! sending_facility = "HOSPITAL"
//!
//! [transport]
//! destination = "https://his.example.org/hl7"
//! auth_token = "${HL7_AUTH_TOKEN}"
//!
//! [audit]
//! enabled = true
//! path = "./logs/hl7-audit.log"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{
    ApplicationConfig, AuditConfig, Environment, HeaderConfig, Hl7Config, LoggingConfig,
    TransportConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
