// emr-hl7 - HL7 v2.x interchange engine for a hospital EMR
// Copyright (c) 2025 EMR HL7 Contributors
// Licensed under the MIT License

//! # emr-hl7 - HL7 v2.x interchange engine
//!
//! emr-hl7 lets a hospital EMR exchange pipe-delimited HL7 v2.x messages with
//! a HIS, a laboratory system or any other clinical peer.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Parsing** inbound messages into an addressable segment/field model
//! - **Validating** messages structurally before they are processed
//! - **Dispatching** admissions, transfers, orders and results to host handlers
//! - **Acknowledging** every parsed message with an AA or AR ACK
//! - **Building** ADT^A01, ADT^A02, ORM^O01 and ORU^R01 from domain records
//! - **Sending** built messages over HTTP, one at a time or in batches
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - The engine (codec, parser, validator, builder, dispatch, ACK)
//! - [`adapters`] - HTTP transport and the logging handlers
//! - [`audit`] - Audit trail of processed messages
//! - [`domain`] - Identifiers, records and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use emr_hl7::core::builder::MessageBuilder;
//! use emr_hl7::core::message::Message;
//! use emr_hl7::domain::PatientRecord;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let patient = PatientRecord::new("P001", "Zhang")
//!         .with_given("San")
//!         .with_gender("MALE");
//!
//!     let text = MessageBuilder::default().build_adt_a01(&patient);
//!     let message = Message::parse(&text)?;
//!
//!     println!("{} {}", message.message_code(), message.control_id());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Operations that cannot produce a value return [`domain::Result`]:
//!
//! ```rust
//! use emr_hl7::domain::Hl7Error;
//!
//! fn example(raw: &str) -> Result<(), Hl7Error> {
//!     let message = emr_hl7::core::message::Message::parse(raw)?;
//!     let _ = message.control_id();
//!     Ok(())
//! }
//! ```
//!
//! Rejections of inbound messages are not errors: they come back as a
//! [`core::dispatch::ProcessingResult`] together with an AR acknowledgement.
//!
//! ## Logging
//!
//! Structured logging with the `tracing` crate; message content never goes
//! to the logs, only identifiers:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(control_id = "M1", "HL7 message sent");
//! warn!(status = 503, "HL7 message rejected by destination");
//! ```

pub mod adapters;
pub mod audit;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
