//! Handlers used by the command line front end
//!
//! [`LoggingHandlers`] accepts every supported message and records what it
//! saw in the tracing stream. It lets `emr-hl7 process` run the full
//! validate, dispatch and acknowledge path without a host application.

use crate::core::dispatch::{DomainHandlers, HandlerOutcome};
use crate::core::message::Message;
use async_trait::async_trait;

/// Accepts every message and logs its identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandlers;

impl LoggingHandlers {
    fn accept(&self, action: &str, message: &Message) -> HandlerOutcome {
        let has_patient = message
            .segment("PID")
            .and_then(|pid| pid.field(3))
            .is_some_and(|id| !id.is_empty());
        tracing::info!(
            action,
            control_id = %message.control_id(),
            has_patient,
            observations = message.segments("OBX").len(),
            "Inbound HL7 message accepted"
        );
        HandlerOutcome::success(format!("{action} message accepted"))
    }
}

#[async_trait]
impl DomainHandlers for LoggingHandlers {
    async fn handle_admit(&self, message: &Message) -> HandlerOutcome {
        self.accept("admit", message)
    }

    async fn handle_transfer(&self, message: &Message) -> HandlerOutcome {
        self.accept("transfer", message)
    }

    async fn handle_discharge(&self, message: &Message) -> HandlerOutcome {
        self.accept("discharge", message)
    }

    async fn handle_order(&self, message: &Message) -> HandlerOutcome {
        self.accept("order", message)
    }

    async fn handle_result(&self, message: &Message) -> HandlerOutcome {
        self.accept("result", message)
    }
}
