//! Outbound transport trait definition

use crate::domain::Result;
use async_trait::async_trait;
use serde::Serialize;

/// What the destination answered to a delivered message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportReceipt {
    /// HTTP status code of the response
    pub status: u16,
    /// Response body, usually the remote ACK
    pub body: String,
}

/// Delivers encoded HL7 messages to a remote system
///
/// Implementations must be `Send + Sync` so a single transport can serve
/// concurrent senders.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Send one encoded message to `destination`
    ///
    /// # Errors
    ///
    /// Returns a transport error if the destination is malformed, unreachable,
    /// times out or answers with a non-success status.
    async fn send(&self, message: &str, destination: &str) -> Result<TransportReceipt>;

    /// Probe the health endpoint of `destination`
    ///
    /// Returns `Ok(false)` when the destination is reachable in principle but
    /// does not answer successfully.
    ///
    /// # Errors
    ///
    /// Returns an error only if the destination URL itself is invalid.
    async fn check_connection(&self, destination: &str) -> Result<bool>;
}
