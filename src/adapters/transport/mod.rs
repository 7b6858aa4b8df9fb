//! Outbound message transport
//!
//! The [`MessageTransport`] trait hides how built messages reach the remote
//! HIS. [`HttpTransport`] POSTs them over HTTP(S) with an optional bearer
//! token; [`batch`] sends a list of records one after another.

pub mod batch;
pub mod http;
mod r#trait;

pub use batch::{send_batch, BatchEntryResult, BatchRequest};
pub use http::HttpTransport;
pub use r#trait::{MessageTransport, TransportReceipt};
