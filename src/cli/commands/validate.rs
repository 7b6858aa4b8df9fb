//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateConfigArgs {}

impl ValidateConfigArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates before returning
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!(
            "  Inbound Interface: {}",
            if config.application.enabled {
                "enabled"
            } else {
                "disabled"
            }
        );
        println!(
            "  Sender: {}^{}",
            config.header.sending_application, config.header.sending_facility
        );
        println!(
            "  Version: {} ({})",
            config.header.version, config.header.processing_id
        );
        println!(
            "  Destination: {}",
            config
                .transport
                .destination
                .as_deref()
                .unwrap_or("(not set)")
        );
        println!(
            "  Bearer Token: {}",
            if config.transport.auth_token.is_some() {
                "configured"
            } else {
                "not set"
            }
        );
        println!("  TLS Verify: {}", config.transport.tls_verify);
        if config.audit.enabled {
            println!("  Audit Log: {}", config.audit.path);
        } else {
            println!("  Audit Log: disabled");
        }
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_config_exit_codes() {
        let mut valid = NamedTempFile::new().unwrap();
        writeln!(valid, "[header]\nsending_application = \"EMR\"").unwrap();
        let mut invalid = NamedTempFile::new().unwrap();
        writeln!(invalid, "[transport]\ndestination = \"ftp://his\"").unwrap();

        let args = ValidateConfigArgs {};
        assert_eq!(
            args.execute(valid.path().to_str().unwrap()).await.unwrap(),
            0
        );
        assert_eq!(
            args.execute(invalid.path().to_str().unwrap()).await.unwrap(),
            2
        );
        assert_eq!(args.execute("/nonexistent/emr-hl7.toml").await.unwrap(), 2);
    }
}
