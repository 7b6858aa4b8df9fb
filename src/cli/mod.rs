//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the HL7 engine using clap.
//!
//! Exit codes: `0` success, `1` message rejected or delivery failed, `2`
//! configuration error, `5` fatal error.

pub mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;

/// emr-hl7 - HL7 v2.x interchange engine
#[derive(Parser, Debug)]
#[command(name = "emr-hl7")]
#[command(version, about, long_about = None)]
#[command(author = "EMR HL7 Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "emr-hl7.toml", env = "EMR_HL7_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "EMR_HL7_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Structurally validate an HL7 message
    Validate(commands::inbound::ValidateArgs),

    /// Parse an HL7 message and print it as JSON
    Parse(commands::inbound::ParseArgs),

    /// Process an inbound message and print the result and ACK
    Process(commands::inbound::ProcessArgs),

    /// Build an outbound message from a JSON record
    Build(commands::outbound::BuildArgs),

    /// Send an HL7 message to the configured destination
    Send(commands::outbound::SendArgs),

    /// Build and send a JSON list of records
    BatchSend(commands::outbound::BatchSendArgs),

    /// Probe the health endpoint of the destination
    CheckConnection(commands::outbound::CheckConnectionArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateConfigArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Reads a command input: a file path, or `-` for standard input
pub fn read_input(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read standard input")?;
        return Ok(buffer);
    }

    std::fs::read_to_string(source).with_context(|| format!("Failed to read input file: {source}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_parse_validate() {
        let cli = Cli::parse_from(["emr-hl7", "validate", "adt.hl7"]);
        assert_eq!(cli.config, "emr-hl7.toml");
        assert!(matches!(cli.command, Commands::Validate(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["emr-hl7", "--config", "custom.toml", "parse", "-"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::Parse(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["emr-hl7", "--log-level", "debug", "process", "adt.hl7"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_build() {
        let cli = Cli::parse_from(["emr-hl7", "build", "ADT_A01", "patient.json"]);
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.kind, "ADT_A01");
                assert_eq!(args.record, "patient.json");
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_outbound_commands() {
        let cli = Cli::parse_from([
            "emr-hl7",
            "send",
            "adt.hl7",
            "--destination",
            "http://his/hl7",
        ]);
        assert!(matches!(cli.command, Commands::Send(_)));

        let cli = Cli::parse_from(["emr-hl7", "batch-send", "batch.json"]);
        assert!(matches!(cli.command, Commands::BatchSend(_)));

        let cli = Cli::parse_from(["emr-hl7", "check-connection"]);
        assert!(matches!(cli.command, Commands::CheckConnection(_)));
    }

    #[test]
    fn test_cli_parse_validate_config_and_init() {
        let cli = Cli::parse_from(["emr-hl7", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));

        let cli = Cli::parse_from(["emr-hl7", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn test_read_input_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"MSH|^~\\&|HIS\r").unwrap();
        let content = read_input(file.path().to_str().unwrap()).unwrap();
        assert_eq!(content, "MSH|^~\\&|HIS\r");
    }

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input("/nonexistent/message.hl7").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/message.hl7"));
    }
}
