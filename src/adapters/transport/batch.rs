//! Batch generation and delivery
//!
//! Each request names an outbound kind and carries its JSON record. Requests
//! are built and sent strictly in order; a bad entry is reported in its own
//! result and the batch carries on.

use super::MessageTransport;
use crate::core::builder::{MessageBuilder, OutboundKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// One entry of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Outbound kind, e.g. `ADT_A01`
    #[serde(rename = "type")]
    pub kind: String,
    /// Record the message is built from
    #[serde(default)]
    pub data: Value,
}

impl BatchRequest {
    pub fn new(kind: impl Into<String>, data: Value) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }
}

/// Outcome of one batch entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntryResult {
    #[serde(rename = "type")]
    pub kind: String,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Control ID of the built message, when building succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_id: Option<String>,
}

impl BatchEntryResult {
    fn failed(kind: &str, message: &str, error: String, control_id: Option<String>) -> Self {
        Self {
            kind: kind.to_string(),
            success: false,
            message: message.to_string(),
            error: Some(error),
            control_id,
        }
    }
}

/// Build and send every request to `destination`, in order
pub async fn send_batch(
    transport: &dyn MessageTransport,
    builder: &MessageBuilder,
    requests: Vec<BatchRequest>,
    destination: &str,
) -> Vec<BatchEntryResult> {
    let total = requests.len();
    let mut results = Vec::with_capacity(total);

    for (position, request) in requests.into_iter().enumerate() {
        let kind = match OutboundKind::from_str(&request.kind) {
            Ok(kind) => kind,
            Err(e) => {
                tracing::warn!(position, kind = %request.kind, "Skipping unsupported batch entry");
                results.push(BatchEntryResult::failed(
                    &request.kind,
                    "unsupported message type",
                    e.to_string(),
                    None,
                ));
                continue;
            }
        };

        let built = match builder.build(kind, request.data) {
            Ok(built) => built,
            Err(e) => {
                results.push(BatchEntryResult::failed(
                    &request.kind,
                    "failed to build HL7 message",
                    e.to_string(),
                    None,
                ));
                continue;
            }
        };

        let control_id = built.control_id.into_inner();
        match transport.send(&built.text, destination).await {
            Ok(_) => results.push(BatchEntryResult {
                kind: request.kind,
                success: true,
                message: "HL7 message sent".to_string(),
                error: None,
                control_id: Some(control_id),
            }),
            Err(e) => results.push(BatchEntryResult::failed(
                &request.kind,
                "failed to send HL7 message",
                e.to_string(),
                Some(control_id),
            )),
        }
    }

    let sent = results.iter().filter(|r| r.success).count();
    tracing::info!(total, sent, failed = total - sent, "HL7 batch send complete");
    results
}
