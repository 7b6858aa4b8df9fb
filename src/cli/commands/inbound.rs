//! Inbound message commands
//!
//! `validate`, `parse` and `process` read one message from a file or from
//! standard input (`-`).

use crate::adapters::handlers::LoggingHandlers;
use crate::cli::read_input;
use crate::config::load_config_or_default;
use crate::core::dispatch::Processor;
use crate::core::message::Message;
use crate::core::validator::validate_detailed;
use clap::Args;
use std::sync::Arc;

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Message file, or `-` for standard input
    pub input: String,
}

impl ValidateArgs {
    /// Execute the validate command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        let raw = read_input(&self.input)?;
        tracing::info!(input = %self.input, "Validating HL7 message");

        match validate_detailed(&raw) {
            Ok(()) => {
                println!("✅ Message is structurally valid");
                Ok(0)
            }
            Err(issue) => {
                println!("❌ Invalid HL7 message");
                println!("   Error: {issue}");
                Ok(1) // Rejected message exit code
            }
        }
    }
}

/// Arguments for the parse command
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Message file, or `-` for standard input
    pub input: String,

    /// Print single-line JSON
    #[arg(long)]
    pub compact: bool,
}

impl ParseArgs {
    /// Execute the parse command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        let raw = read_input(&self.input)?;

        let message = match Message::parse(&raw) {
            Ok(message) => message,
            Err(e) => {
                eprintln!("❌ Failed to parse HL7 message");
                eprintln!("   Error: {e}");
                return Ok(1);
            }
        };

        tracing::debug!(
            message_code = %message.message_code(),
            trigger_event = %message.trigger_event(),
            control_id = %message.control_id(),
            segments = message.iter().count(),
            "Parsed HL7 message"
        );

        let json = if self.compact {
            serde_json::to_string(&message)?
        } else {
            serde_json::to_string_pretty(&message)?
        };
        println!("{json}");
        Ok(0)
    }
}

/// Arguments for the process command
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Message file, or `-` for standard input
    pub input: String,

    /// Print the result and ACK as one JSON document
    #[arg(long)]
    pub json: bool,
}

impl ProcessArgs {
    /// Execute the process command
    ///
    /// Messages are dispatched to [`LoggingHandlers`], which accept every
    /// supported message.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config_or_default(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load configuration");
                eprintln!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let processor = match Processor::from_config(&config, Arc::new(LoggingHandlers)) {
            Ok(processor) => processor,
            Err(e) => {
                eprintln!("❌ Failed to set up message processing");
                eprintln!("   Error: {e}");
                return Ok(2);
            }
        };

        let raw = read_input(&self.input)?;
        let response = processor.respond(&raw).await;
        let exit_code = if response.result.success { 0 } else { 1 };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
            return Ok(exit_code);
        }

        if response.result.success {
            println!("✅ {}", response.result.message);
        } else {
            println!("❌ {}", response.result.message);
            if let Some(ref error) = response.result.error {
                println!("   Error: {error}");
            }
        }

        if let Some(ref ack) = response.ack {
            println!();
            println!("ACK:");
            for line in ack.split('\r').filter(|line| !line.is_empty()) {
                println!("  {line}");
            }
        }

        Ok(exit_code)
    }
}
