//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables should be run with --test-threads=1
//! to avoid interference between tests.

use emr_hl7::config::{load_config, load_config_or_default, Environment};
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("EMR_HL7_APPLICATION_LOG_LEVEL");
    std::env::remove_var("EMR_HL7_APPLICATION_ENABLED");
    std::env::remove_var("EMR_HL7_HEADER_SENDING_FACILITY");
    std::env::remove_var("EMR_HL7_TRANSPORT_DESTINATION");
    std::env::remove_var("EMR_HL7_TRANSPORT_AUTH_TOKEN");
    std::env::remove_var("HL7_AUTH_TOKEN");
    std::env::remove_var("TEST_HL7_TOKEN");
}

fn config_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    let temp_file = config_file(
        r#"
environment = "staging"

[application]
log_level = "debug"
enabled = false

[header]
sending_application = "EMR"
sending_facility = "CITY_HOSPITAL"
receiving_facility = "HIS_CENTER"
adt_receiver = "ADT_GATEWAY"
orm_receiver = "LIS"
oru_sender = "LIS"
oru_receiver = "EMR"
processing_id = "T"
version = "2.4"

[transport]
destination = "https://his.example.org/hl7"
auth_token = "literal-token"
timeout_seconds = 15
health_timeout_seconds = 3
tls_verify = true

[audit]
enabled = true
path = "/var/log/emr-hl7/audit.log"
json_format = false

[logging]
local_enabled = true
local_path = "/var/log/emr-hl7"
local_rotation = "hourly"
"#,
    );

    let config = load_config(temp_file.path()).unwrap();

    assert_eq!(config.environment, Environment::Staging);
    assert_eq!(config.application.log_level, "debug");
    assert!(!config.application.enabled);
    assert_eq!(config.header.sending_facility, "CITY_HOSPITAL");
    assert_eq!(config.header.orm_receiver, "LIS");
    assert_eq!(config.header.processing_id, "T");
    assert_eq!(config.header.version, "2.4");
    assert_eq!(
        config.transport.destination.as_deref(),
        Some("https://his.example.org/hl7")
    );
    let token = config.transport.auth_token.as_ref().unwrap().expose_secret().as_str();
    assert_eq!(token, "literal-token");
    assert_eq!(config.transport.timeout_seconds, 15);
    assert_eq!(config.transport.health_timeout_seconds, 3);
    assert!(config.audit.enabled);
    assert!(!config.audit.json_format);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    let temp_file = config_file("[application]\nlog_level = \"warn\"\n");

    let config = load_config(temp_file.path()).unwrap();

    assert_eq!(config.application.log_level, "warn");
    assert!(config.application.enabled);
    assert_eq!(config.header.sending_application, "EMR");
    assert_eq!(config.header.sending_facility, "HOSPITAL");
    assert_eq!(config.header.adt_receiver, "RECEIVER");
    assert_eq!(config.header.processing_id, "P");
    assert_eq!(config.header.version, "2.5");
    assert!(config.transport.destination.is_none());
    assert!(config.transport.auth_token.is_none());
    assert_eq!(config.transport.health_timeout_seconds, 5);
    assert!(!config.audit.enabled);
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_HL7_TOKEN", "substituted-token");

    let temp_file = config_file(
        r#"
[transport]
destination = "https://his.example.org/hl7"
auth_token = "${TEST_HL7_TOKEN}"
"#,
    );

    let config = load_config(temp_file.path()).unwrap();
    let token = config.transport.auth_token.as_ref().unwrap().expose_secret().as_str();
    assert_eq!(token, "substituted-token");

    cleanup_env_vars();
}

#[test]
fn test_missing_env_var_is_an_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = config_file("[transport]\nauth_token = \"${TEST_HL7_TOKEN}\"\n");
    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_HL7_TOKEN"));
}

#[test]
fn test_env_var_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("EMR_HL7_APPLICATION_LOG_LEVEL", "trace");
    std::env::set_var("EMR_HL7_APPLICATION_ENABLED", "false");
    std::env::set_var("EMR_HL7_HEADER_SENDING_FACILITY", "WEST_CAMPUS");
    std::env::set_var("EMR_HL7_TRANSPORT_DESTINATION", "http://localhost:9000/hl7");

    let temp_file = config_file(
        r#"
[application]
log_level = "info"

[header]
sending_facility = "HOSPITAL"
"#,
    );

    let config = load_config(temp_file.path()).unwrap();

    assert_eq!(config.application.log_level, "trace");
    assert!(!config.application.enabled);
    assert_eq!(config.header.sending_facility, "WEST_CAMPUS");
    assert_eq!(
        config.transport.destination.as_deref(),
        Some("http://localhost:9000/hl7")
    );

    cleanup_env_vars();
}

#[test]
fn test_invalid_config_validation() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let invalid_level = config_file("[application]\nlog_level = \"verbose\"\n");
    assert!(load_config(invalid_level.path()).is_err());

    let invalid_destination = config_file("[transport]\ndestination = \"mllp://his:2575\"\n");
    let err = load_config(invalid_destination.path()).unwrap_err();
    assert!(err.to_string().contains("http or https"));

    let insecure_production = config_file(
        r#"
environment = "production"

[transport]
tls_verify = false
"#,
    );
    let err = load_config(insecure_production.path()).unwrap_err();
    assert!(err.to_string().contains("TLS"));
}

#[test]
fn test_missing_file_handling() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    assert!(load_config("/nonexistent/emr-hl7.toml").is_err());

    let config = load_config_or_default("/nonexistent/emr-hl7.toml").unwrap();
    assert_eq!(config.header.sending_application, "EMR");
}
