//! Audit trail of processed inbound messages
//!
//! Every message that reaches the processor produces one
//! `HL7_MESSAGE_PROCESSED` entry. Entries carry the message type, control ID
//! and outcome plus a SHA-256 digest of the payload; the payload itself is
//! never written.

pub mod logger;

pub use logger::{AuditEntry, AuditLogger};
