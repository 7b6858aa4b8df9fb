//! Dispatcher and processor for inbound messages
//!
//! The processor runs an inbound payload through the validator and the
//! parser, routes it on MSH-9 to the injected [`DomainHandlers`], and builds
//! the acknowledgement. Every expected failure comes back as a
//! [`ProcessingResult`] value; nothing here returns an error or panics on bad
//! input.

use super::ack::AckBuilder;
use super::message::Message;
use super::validator::validate_detailed;
use crate::audit::{AuditEntry, AuditLogger};
use crate::config::Hl7Config;
use crate::domain::errors::Hl7Error;
use crate::domain::result::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Routing decision for an inbound message, taken from MSH-9
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// ADT^A01
    Admit,
    /// ADT^A02
    Transfer,
    /// ADT^A03
    Discharge,
    /// ORM, any trigger event
    Order,
    /// ORU, any trigger event
    Result,
    /// ADT with a trigger event the engine does not handle
    UnsupportedEvent { message_type: String, event: String },
    /// Message code the engine does not handle
    UnsupportedType(String),
}

impl MessageKind {
    pub fn classify(message_type: &str, event: &str) -> Self {
        match (message_type, event) {
            ("ADT", "A01") => Self::Admit,
            ("ADT", "A02") => Self::Transfer,
            ("ADT", "A03") => Self::Discharge,
            ("ADT", _) => Self::UnsupportedEvent {
                message_type: message_type.to_string(),
                event: event.to_string(),
            },
            ("ORM", _) => Self::Order,
            ("ORU", _) => Self::Result,
            _ => Self::UnsupportedType(message_type.to_string()),
        }
    }

    pub fn of(message: &Message) -> Self {
        Self::classify(message.message_code(), message.trigger_event())
    }

    pub fn is_supported(&self) -> bool {
        !matches!(
            self,
            Self::UnsupportedEvent { .. } | Self::UnsupportedType(_)
        )
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admit => f.write_str("admit"),
            Self::Transfer => f.write_str("transfer"),
            Self::Discharge => f.write_str("discharge"),
            Self::Order => f.write_str("order"),
            Self::Result => f.write_str("result"),
            Self::UnsupportedEvent {
                message_type,
                event,
            } => write!(f, "unsupported {message_type} event: {event}"),
            Self::UnsupportedType(message_type) => {
                write!(f, "unsupported message type: {message_type}")
            }
        }
    }
}

/// What a domain handler reports back
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerOutcome {
    pub success: bool,
    pub message: String,
}

impl HandlerOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Domain effects of inbound messages, supplied by the host application
///
/// Handlers receive the fully parsed message. They may block or fail on
/// their own; the processor awaits each call once, with no timeout or retry.
#[async_trait]
pub trait DomainHandlers: Send + Sync {
    /// ADT^A01 admit
    async fn handle_admit(&self, message: &Message) -> HandlerOutcome;

    /// ADT^A02 transfer
    async fn handle_transfer(&self, message: &Message) -> HandlerOutcome;

    /// ADT^A03 discharge; accepted without side effects unless overridden
    async fn handle_discharge(&self, _message: &Message) -> HandlerOutcome {
        HandlerOutcome::success("discharge message accepted")
    }

    /// ORM order
    async fn handle_order(&self, message: &Message) -> HandlerOutcome;

    /// ORU result
    async fn handle_result(&self, message: &Message) -> HandlerOutcome;
}

/// Outcome of processing one inbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingResult {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error: None,
        }
    }

    pub fn rejected(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(error.into()),
        }
    }
}

/// Processing result plus the acknowledgement to return to the sender
///
/// `ack` is absent only when the payload never parsed, since there is no
/// control ID to acknowledge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingResponse {
    pub result: ProcessingResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack: Option<String>,
}

/// Inbound message processor
#[derive(Clone)]
pub struct Processor {
    handlers: Arc<dyn DomainHandlers>,
    ack: AckBuilder,
    audit: Option<AuditLogger>,
    enabled: bool,
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("ack", &self.ack)
            .field("audit", &self.audit)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl Processor {
    pub fn new(handlers: Arc<dyn DomainHandlers>) -> Self {
        Self {
            handlers,
            ack: AckBuilder::default(),
            audit: None,
            enabled: true,
        }
    }

    /// Processor wired from configuration: header values for ACKs, the
    /// interface switch and the audit file
    pub fn from_config(config: &Hl7Config, handlers: Arc<dyn DomainHandlers>) -> Result<Self> {
        let audit = AuditLogger::from_config(&config.audit)
            .map_err(|e| Hl7Error::Configuration(format!("{e:#}")))?;
        Ok(Self::new(handlers)
            .with_ack_builder(AckBuilder::new(config.header.clone()))
            .with_audit(audit)
            .with_enabled(config.application.enabled))
    }

    pub fn with_ack_builder(mut self, ack: AckBuilder) -> Self {
        self.ack = ack;
        self
    }

    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Processes one inbound payload
    pub async fn process(&self, raw: &str) -> ProcessingResult {
        self.respond(raw).await.result
    }

    /// Processes one inbound payload and builds its ACK
    pub async fn respond(&self, raw: &str) -> ProcessingResponse {
        if !self.enabled {
            tracing::warn!("HL7 interface is disabled, refusing inbound message");
            return ProcessingResponse {
                result: ProcessingResult::rejected(
                    "HL7 interface is disabled",
                    "HL7 interface is disabled",
                ),
                ack: None,
            };
        }

        if let Err(issue) = validate_detailed(raw) {
            tracing::warn!(%issue, "Rejected structurally invalid HL7 message");
            let result = ProcessingResult::rejected("invalid HL7 message", issue.to_string());
            self.audit("", "", &result, raw);
            return ProcessingResponse { result, ack: None };
        }

        let message = match Message::parse(raw) {
            Ok(message) => message,
            Err(e) => {
                crate::log_error_with_context!(&e, "Failed to parse HL7 message");
                let result = ProcessingResult::rejected("failed to parse HL7 message", e.to_string());
                self.audit("", "", &result, raw);
                return ProcessingResponse { result, ack: None };
            }
        };

        let message_type = format!("{}_{}", message.message_code(), message.trigger_event());
        let kind = MessageKind::of(&message);
        tracing::debug!(
            message_type = %message_type,
            control_id = %message.control_id(),
            kind = %kind,
            "Dispatching HL7 message"
        );

        let result = if kind.is_supported() {
            let outcome = self.dispatch(kind, &message).await;
            if outcome.success {
                ProcessingResult::accepted(outcome.message)
            } else {
                ProcessingResult::rejected(outcome.message.clone(), outcome.message)
            }
        } else {
            ProcessingResult::rejected("unsupported message", kind.to_string())
        };

        let ack = self
            .ack
            .build_ack(&message, result.success, result.error.as_deref());
        self.audit(&message_type, message.control_id(), &result, raw);

        ProcessingResponse {
            result,
            ack: Some(ack),
        }
    }

    /// Runs the handler on its own task so a panicking handler fails only
    /// this message
    async fn dispatch(&self, kind: MessageKind, message: &Message) -> HandlerOutcome {
        let handlers = Arc::clone(&self.handlers);
        let message = message.clone();
        let task = tokio::spawn(async move {
            let handlers = handlers.as_ref();
            match kind {
                MessageKind::Admit => handlers.handle_admit(&message).await,
                MessageKind::Transfer => handlers.handle_transfer(&message).await,
                MessageKind::Discharge => handlers.handle_discharge(&message).await,
                MessageKind::Order => handlers.handle_order(&message).await,
                MessageKind::Result => handlers.handle_result(&message).await,
                unsupported => HandlerOutcome::failure(unsupported.to_string()),
            }
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                crate::log_error_with_context!(&e, "Domain handler aborted");
                HandlerOutcome::failure(format!("domain handler failed: {e}"))
            }
        }
    }

    fn audit(&self, message_type: &str, control_id: &str, result: &ProcessingResult, raw: &str) {
        crate::log_message_processed!(message_type, control_id, result.success);

        if let Some(audit) = &self.audit {
            let entry = AuditEntry::new(
                message_type,
                control_id,
                result.success,
                result.error.clone(),
                raw,
                Utc::now(),
            );
            if let Err(e) = audit.log_processed(&entry) {
                tracing::warn!(error = %e, "Failed to write audit entry");
            }
        }
    }
}
