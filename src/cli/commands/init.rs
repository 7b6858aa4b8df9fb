//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "emr-hl7.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing emr-hl7 configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your HIS destination", self.output);
                println!("  2. Put the bearer token in a .env file as HL7_AUTH_TOKEN");
                println!("     and uncomment auth_token in [transport]");
                println!("  3. Validate configuration: emr-hl7 validate-config");
                println!("  4. Probe the destination: emr-hl7 check-connection");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# emr-hl7 Configuration File
# HL7 v2.x interchange engine

[application]
log_level = "info"
enabled = true

[header]
sending_application = "EMR"
sending_facility = "HOSPITAL"

[transport]
destination = "https://his.example.org/hl7"
# auth_token = "${HL7_AUTH_TOKEN}"
timeout_seconds = 30

[audit]
enabled = false
path = "./logs/hl7-audit.log"

[logging]
local_enabled = false
local_path = "./logs"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# emr-hl7 Configuration File
# HL7 v2.x interchange engine
#
# Values of the form ${VAR} are read from the environment (or .env).
# Any setting can also be overridden with EMR_HL7_<SECTION>_<KEY>,
# e.g. EMR_HL7_TRANSPORT_DESTINATION.

# Runtime environment: development, staging or production
# Production refuses transport.tls_verify = false
environment = "development"

# ============================================================================
# Application
# ============================================================================
[application]
# Log level: trace, debug, info, warn, error
log_level = "info"

# Accept inbound messages (false refuses every message)
enabled = true

# ============================================================================
# MSH header values
# ============================================================================
[header]
# MSH-3/MSH-4 of outbound ADT and ORM messages, and the ACK sender when the
# inbound message names no receiver
sending_application = "EMR"
sending_facility = "HOSPITAL"

# MSH-6 of outbound messages
receiving_facility = "DESTINATION"

# MSH-5 per message family
adt_receiver = "RECEIVER"
orm_receiver = "LAB"

# Results are sent from the lab system back to the EMR
oru_sender = "LAB"
oru_receiver = "EMR"

# MSH-11 (P production, T training, D debugging) and MSH-12
processing_id = "P"
version = "2.5"

# ============================================================================
# Outbound transport
# ============================================================================
[transport]
# Default destination for send, batch-send and check-connection
destination = "https://his.example.org/hl7"

# Bearer token sent as "Authorization: Bearer <token>"
# auth_token = "${HL7_AUTH_TOKEN}"

# Request timeout in seconds
timeout_seconds = 30

# Timeout of the GET <destination>/health probe in seconds
health_timeout_seconds = 5

# TLS certificate verification (keep true outside development)
tls_verify = true

# ============================================================================
# Audit trail
# ============================================================================
[audit]
# One entry per processed inbound message: type, control ID, outcome and the
# SHA-256 of the payload. The message text itself is never written.
enabled = true
path = "./logs/hl7-audit.log"

# JSON lines (true) or plain text (false)
json_format = true

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON log file in addition to the console
local_enabled = false
local_path = "./logs"

# Rotation: daily, hourly, never
local_rotation = "daily"
"#
        .to_string()
    }
}
