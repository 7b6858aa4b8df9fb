//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - console output with a configurable level
//! - optional JSON log file with daily or hourly rotation
//! - macros for the engine's recurring events
//!
//! # Example
//!
//! ```no_run
//! use emr_hl7::logging::init_logging;
//! use emr_hl7::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Interface started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the outcome of an inbound message
///
/// # Example
///
/// ```no_run
/// use emr_hl7::log_message_processed;
///
/// log_message_processed!("ADT_A01", "MSG00001", true);
/// ```
#[macro_export]
macro_rules! log_message_processed {
    ($message_type:expr, $control_id:expr, $success:expr) => {
        tracing::info!(
            event = "HL7_MESSAGE_PROCESSED",
            message_type = %$message_type,
            control_id = %$control_id,
            success = $success,
            "HL7 message processed"
        );
    };
}

/// Log an outbound message that was built
///
/// # Example
///
/// ```no_run
/// use emr_hl7::log_message_built;
///
/// log_message_built!("ORU^R01", "1709280000000abcdefghijk");
/// ```
#[macro_export]
macro_rules! log_message_built {
    ($message_type:expr, $control_id:expr) => {
        tracing::debug!(
            message_type = %$message_type,
            control_id = %$control_id,
            "HL7 message built"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use emr_hl7::log_error_with_context;
/// use emr_hl7::domain::Hl7Error;
///
/// let error = Hl7Error::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
