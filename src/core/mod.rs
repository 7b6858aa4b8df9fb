//! The HL7 v2.x interchange engine.
//!
//! # Modules
//!
//! - [`codec`] - Delimiters and low-level split/join
//! - [`schema`] - Static field layout of the known segment types
//! - [`datatypes`] - Field values and composite data types
//! - [`segment`] - Segment parser and encoder
//! - [`message`] - Message parser
//! - [`validator`] - Structural pre-check
//! - [`builder`] - Outbound ADT^A01, ADT^A02, ORM^O01 and ORU^R01 messages
//! - [`ack`] - ACK generator
//! - [`dispatch`] - Type/event dispatch to domain handlers
//!
//! # Inbound Workflow
//!
//! 1. **Validate**: structural pre-check of the raw text
//! 2. **Parse**: raw text to [`message::Message`] using the delimiters declared in MSH
//! 3. **Dispatch**: route on MSH-9 to the injected [`dispatch::DomainHandlers`]
//! 4. **Acknowledge**: AA or AR ACK correlated by control ID
//!
//! Parsing, building, validation and ACK generation are pure functions of
//! their inputs and safe to call concurrently.
//!
//! # Example
//!
//! ```rust,no_run
//! use emr_hl7::core::dispatch::{DomainHandlers, HandlerOutcome, Processor};
//! use emr_hl7::core::message::Message;
//! use std::sync::Arc;
//!
//! struct Ward;
//!
//! #[async_trait::async_trait]
//! impl DomainHandlers for Ward {
//!     async fn handle_admit(&self, _m: &Message) -> HandlerOutcome {
//!         HandlerOutcome::success("admitted")
//!     }
//!     async fn handle_transfer(&self, _m: &Message) -> HandlerOutcome {
//!         HandlerOutcome::success("transferred")
//!     }
//!     async fn handle_order(&self, _m: &Message) -> HandlerOutcome {
//!         HandlerOutcome::success("order received")
//!     }
//!     async fn handle_result(&self, _m: &Message) -> HandlerOutcome {
//!         HandlerOutcome::success("result stored")
//!     }
//! }
//!
//! # async fn example(raw: &str) {
//! let processor = Processor::new(Arc::new(Ward));
//! let response = processor.respond(raw).await;
//! if let Some(ack) = response.ack {
//!     println!("{ack}");
//! }
//! # }
//! ```

pub mod ack;
pub mod builder;
pub mod codec;
pub mod datatypes;
pub mod dispatch;
pub mod message;
pub mod schema;
pub mod segment;
pub mod validator;
