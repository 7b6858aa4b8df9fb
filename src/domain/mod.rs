//! Domain models and types for the HL7 engine.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`SegmentType`], [`ControlId`])
//! - **Collaborator records** ([`PatientRecord`], [`OrderRecord`], [`ExaminationRecord`])
//! - **Error types** ([`Hl7Error`], [`TransportError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible library operations return [`Result<T, Hl7Error>`]:
//!
//! ```rust
//! use emr_hl7::domain::{Hl7Error, Result};
//! use emr_hl7::core::message::Message;
//!
//! fn control_id(raw: &str) -> Result<String> {
//!     let message = Message::parse(raw)?;
//!     Ok(message.control_id().to_string())
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod records;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{Hl7Error, TransportError};
pub use ids::{ControlId, SegmentType};
pub use records::{ExaminationRecord, OrderRecord, PatientRecord};
pub use result::Result;
