//! Outbound message commands
//!
//! `build` turns a JSON record into wire text; `send`, `batch-send` and
//! `check-connection` talk to the destination from `[transport]` unless
//! `--destination` overrides it.

use crate::adapters::transport::{send_batch, BatchRequest, HttpTransport, MessageTransport};
use crate::cli::read_input;
use crate::config::{load_config_or_default, Hl7Config};
use crate::core::builder::{MessageBuilder, OutboundKind};
use crate::core::validator::validate_detailed;
use crate::domain::{Hl7Error, TransportError};
use anyhow::Context;
use clap::Args;
use serde::Deserialize;
use std::str::FromStr;

fn load(config_path: &str) -> Option<Hl7Config> {
    match load_config_or_default(config_path) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("❌ Failed to load configuration");
            eprintln!("   Error: {e}");
            None
        }
    }
}

fn resolve_destination(flag: Option<&str>, config: &Hl7Config) -> Option<String> {
    let destination = flag
        .map(str::to_string)
        .or_else(|| config.transport.destination.clone());
    if destination.is_none() {
        eprintln!("❌ No destination configured");
        eprintln!("   Set [transport].destination or pass --destination");
    }
    destination
}

fn transport(config: &Hl7Config) -> Option<HttpTransport> {
    match HttpTransport::new(&config.transport) {
        Ok(transport) => Some(transport),
        Err(e) => {
            eprintln!("❌ Failed to set up HTTP transport");
            eprintln!("   Error: {e}");
            None
        }
    }
}

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Message kind: ADT_A01, ADT_A02, ORM_O01 or ORU_R01
    pub kind: String,

    /// JSON record file, or `-` for standard input
    pub record: String,

    /// Write the CR-terminated message to this file instead of standard output
    #[arg(short, long)]
    pub output: Option<String>,
}

impl BuildArgs {
    /// Execute the build command
    ///
    /// Standard output shows one segment per line; `--output` writes the exact
    /// wire text.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(config) = load(config_path) else {
            return Ok(2); // Configuration error exit code
        };

        let kind = match OutboundKind::from_str(&self.kind) {
            Ok(kind) => kind,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(1);
            }
        };

        let record: serde_json::Value = serde_json::from_str(&read_input(&self.record)?)
            .with_context(|| format!("Record is not valid JSON: {}", self.record))?;

        let built = match MessageBuilder::new(config.header).build(kind, record) {
            Ok(built) => built,
            Err(e) => {
                eprintln!("❌ Failed to build {kind}");
                eprintln!("   Error: {e}");
                return Ok(1);
            }
        };

        match self.output {
            Some(ref output) => {
                std::fs::write(output, &built.text)
                    .with_context(|| format!("Failed to write message to {output}"))?;
                eprintln!("✅ {kind} {} written to {output}", built.control_id);
            }
            None => {
                for line in built.text.split('\r').filter(|line| !line.is_empty()) {
                    println!("{line}");
                }
            }
        }

        Ok(0)
    }
}

/// Arguments for the send command
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Message file, or `-` for standard input
    pub input: String,

    /// Destination URL (defaults to [transport].destination)
    #[arg(short, long)]
    pub destination: Option<String>,
}

impl SendArgs {
    /// Execute the send command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(config) = load(config_path) else {
            return Ok(2);
        };
        let Some(destination) = resolve_destination(self.destination.as_deref(), &config) else {
            return Ok(2);
        };
        let Some(transport) = transport(&config) else {
            return Ok(2);
        };

        let raw = read_input(&self.input)?;
        if let Err(issue) = validate_detailed(&raw) {
            eprintln!("❌ Invalid HL7 message, not sent");
            eprintln!("   Error: {issue}");
            return Ok(1);
        }

        match transport.send(&raw, &destination).await {
            Ok(receipt) => {
                println!("✅ HL7 message sent ({})", receipt.status);
                if !receipt.body.is_empty() {
                    println!();
                    let lines = receipt
                        .body
                        .split(|c| c == '\r' || c == '\n')
                        .filter(|l| !l.is_empty());
                    for line in lines {
                        println!("  {line}");
                    }
                }
                Ok(0)
            }
            Err(Hl7Error::Transport(TransportError::InvalidDestination(e))) => {
                eprintln!("❌ Invalid destination");
                eprintln!("   Error: {e}");
                Ok(2)
            }
            Err(e) => {
                eprintln!("❌ HL7 message send failed");
                eprintln!("   Error: {e}");
                Ok(1)
            }
        }
    }
}

/// Batch file: either a bare list of requests or an object with a destination
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BatchFile {
    Envelope {
        messages: Vec<BatchRequest>,
        #[serde(default)]
        destination: Option<String>,
    },
    List(Vec<BatchRequest>),
}

impl BatchFile {
    fn into_parts(self) -> (Vec<BatchRequest>, Option<String>) {
        match self {
            Self::Envelope {
                messages,
                destination,
            } => (messages, destination),
            Self::List(messages) => (messages, None),
        }
    }
}

/// Arguments for the batch-send command
#[derive(Args, Debug)]
pub struct BatchSendArgs {
    /// JSON batch file, or `-` for standard input
    pub input: String,

    /// Destination URL (overrides the file and [transport].destination)
    #[arg(short, long)]
    pub destination: Option<String>,
}

impl BatchSendArgs {
    /// Execute the batch-send command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(config) = load(config_path) else {
            return Ok(2);
        };

        let batch: BatchFile = serde_json::from_str(&read_input(&self.input)?)
            .with_context(|| format!("Invalid batch file: {}", self.input))?;
        let (requests, file_destination) = batch.into_parts();

        let flag = self.destination.as_deref().or(file_destination.as_deref());
        let Some(destination) = resolve_destination(flag, &config) else {
            return Ok(2);
        };
        let Some(transport) = transport(&config) else {
            return Ok(2);
        };

        let builder = MessageBuilder::new(config.header);
        let results = send_batch(&transport, &builder, requests, &destination).await;
        let failed = results.iter().filter(|r| !r.success).count();

        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "success": failed == 0,
                "message": "HL7 batch send complete",
                "results": results,
            }))?
        );

        Ok(if failed == 0 { 0 } else { 1 })
    }
}

/// Arguments for the check-connection command
#[derive(Args, Debug)]
pub struct CheckConnectionArgs {
    /// Destination URL (defaults to [transport].destination)
    #[arg(short, long)]
    pub destination: Option<String>,
}

impl CheckConnectionArgs {
    /// Execute the check-connection command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(config) = load(config_path) else {
            return Ok(2);
        };
        let Some(destination) = resolve_destination(self.destination.as_deref(), &config) else {
            return Ok(2);
        };
        let Some(transport) = transport(&config) else {
            return Ok(2);
        };

        match transport.check_connection(&destination).await {
            Ok(true) => {
                println!("✅ HL7 connection OK: {destination}");
                Ok(0)
            }
            Ok(false) => {
                println!("❌ HL7 connection check failed: {destination}");
                Ok(1)
            }
            Err(e) => {
                eprintln!("❌ {e}");
                Ok(2)
            }
        }
    }
}
