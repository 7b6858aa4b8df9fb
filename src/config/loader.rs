//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::Hl7Config;
use super::secret::secret_string;
use crate::domain::errors::Hl7Error;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into Hl7Config
/// 4. Applies environment variable overrides (EMR_HL7_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, TOML parsing fails, a
/// referenced environment variable is missing or validation fails.
///
/// # Examples
///
/// ```no_run
/// use emr_hl7::config::loader::load_config;
///
/// let config = load_config("emr-hl7.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<Hl7Config> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Hl7Error::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        Hl7Error::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: Hl7Config = toml::from_str(&contents)
        .map_err(|e| Hl7Error::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        Hl7Error::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Loads the file when it exists, otherwise falls back to defaults plus
/// environment overrides
///
/// The message-level commands work without any configuration file; this is
/// what they use.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<Hl7Config> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(path = %path.display(), "Configuration file not found, using defaults");
    let mut config = Hl7Config::default();
    apply_env_overrides(&mut config);
    config.validate().map_err(|e| {
        Hl7Error::Configuration(format!("Configuration validation failed: {e}"))
    })?;
    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| Hl7Error::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(Hl7Error::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the EMR_HL7_* prefix
///
/// Variables follow the pattern EMR_HL7_<SECTION>_<KEY>, for example
/// EMR_HL7_TRANSPORT_DESTINATION. `HL7_AUTH_TOKEN` is honoured as a fallback
/// for the bearer token.
fn apply_env_overrides(config: &mut Hl7Config) {
    // Application overrides
    if let Ok(val) = std::env::var("EMR_HL7_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("EMR_HL7_APPLICATION_ENABLED") {
        config.application.enabled = val.parse().unwrap_or(config.application.enabled);
    }

    // Header overrides
    if let Ok(val) = std::env::var("EMR_HL7_HEADER_SENDING_APPLICATION") {
        config.header.sending_application = val;
    }
    if let Ok(val) = std::env::var("EMR_HL7_HEADER_SENDING_FACILITY") {
        config.header.sending_facility = val;
    }
    if let Ok(val) = std::env::var("EMR_HL7_HEADER_RECEIVING_FACILITY") {
        config.header.receiving_facility = val;
    }
    if let Ok(val) = std::env::var("EMR_HL7_HEADER_PROCESSING_ID") {
        config.header.processing_id = val;
    }

    // Transport overrides
    if let Ok(val) = std::env::var("EMR_HL7_TRANSPORT_DESTINATION") {
        config.transport.destination = Some(val);
    }
    if let Ok(val) = std::env::var("EMR_HL7_TRANSPORT_AUTH_TOKEN") {
        config.transport.auth_token = Some(secret_string(val));
    } else if config.transport.auth_token.is_none() {
        if let Ok(val) = std::env::var("HL7_AUTH_TOKEN") {
            config.transport.auth_token = Some(secret_string(val));
        }
    }
    if let Ok(val) = std::env::var("EMR_HL7_TRANSPORT_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.transport.timeout_seconds = timeout;
        }
    }
    if let Ok(val) = std::env::var("EMR_HL7_TRANSPORT_TLS_VERIFY") {
        config.transport.tls_verify = val.parse().unwrap_or(true);
    }

    // Audit overrides
    if let Ok(val) = std::env::var("EMR_HL7_AUDIT_ENABLED") {
        config.audit.enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("EMR_HL7_AUDIT_PATH") {
        config.audit.path = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("EMR_HL7_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("EMR_HL7_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("EMR_HL7_LOADER_TEST_VAR", "test_value");
        let input = "auth_token = \"${EMR_HL7_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "auth_token = \"test_value\"\n");
        std::env::remove_var("EMR_HL7_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("EMR_HL7_LOADER_MISSING_VAR");
        let input = "auth_token = \"${EMR_HL7_LOADER_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        let input = "# token = \"${EMR_HL7_LOADER_COMMENTED}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-emr-hl7.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[header]
sending_application = "EMR"
sending_facility = "CITY_HOSPITAL"

[transport]
destination = "https://his.example.org/hl7"
timeout_seconds = 10
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.header.sending_facility, "CITY_HOSPITAL");
        assert_eq!(config.header.adt_receiver, "RECEIVER");
        assert_eq!(config.transport.timeout_seconds, 10);
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[header]\nprocessing_id = \"Z\"\n")
            .unwrap();
        temp_file.flush().unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("processing_id"));
    }

    #[test]
    fn test_load_config_or_default_without_file() {
        let config = load_config_or_default("definitely-missing-emr-hl7.toml").unwrap();
        assert_eq!(config.header.version, "2.5");
    }
}
