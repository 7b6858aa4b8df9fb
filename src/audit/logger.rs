//! Audit logger for processed HL7 messages

use crate::config::AuditConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Audit event name shared by the log file and the tracing stream
pub const MESSAGE_PROCESSED_EVENT: &str = "HL7_MESSAGE_PROCESSED";

/// One audit log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub event: &'static str,
    pub timestamp: String,
    /// `TYPE_EVENT`, e.g. `ADT_A01`
    pub message_type: String,
    pub control_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// SHA-256 of the raw message (never log the plaintext message)
    pub payload_sha256: String,
}

impl AuditEntry {
    pub fn new(
        message_type: impl Into<String>,
        control_id: impl Into<String>,
        success: bool,
        error: Option<String>,
        raw: &str,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            event: MESSAGE_PROCESSED_EVENT,
            timestamp: at.to_rfc3339(),
            message_type: message_type.into(),
            control_id: control_id.into(),
            success,
            error,
            payload_sha256: hash_payload(raw),
        }
    }
}

/// Hash a payload using SHA-256
fn hash_payload(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    format!("{result:x}")
}

/// Appends audit entries to a file
#[derive(Debug, Clone)]
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
        })
    }

    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        Self::new(
            PathBuf::from(&config.path),
            config.json_format,
            config.enabled,
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Log a processed message
    pub fn log_processed(&self, entry: &AuditEntry) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        self.write_entry(entry)
    }

    fn write_entry(&self, entry: &AuditEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        if self.json_format {
            let json_line =
                serde_json::to_string(entry).context("Failed to serialize audit entry")?;
            writeln!(file, "{json_line}").context("Failed to write audit entry")?;
        } else {
            writeln!(
                file,
                "[{}] {} | Type: {} | Control ID: {} | Success: {}{}",
                entry.timestamp,
                entry.event,
                entry.message_type,
                entry.control_id,
                entry.success,
                entry
                    .error
                    .as_deref()
                    .map(|e| format!(" | Error: {e}"))
                    .unwrap_or_default()
            )
            .context("Failed to write audit entry")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const RAW: &str = "MSH|^~\\&|HIS|HOSP|EMR|EMR|20240101||ADT^A01|M1|P|2.5\rPID|1||P001||Zhang^San\r";

    fn entry(success: bool, error: Option<&str>) -> AuditEntry {
        AuditEntry::new(
            "ADT_A01",
            "M1",
            success,
            error.map(str::to_string),
            RAW,
            Utc::now(),
        )
    }

    #[test]
    fn test_hash_payload() {
        let hash1 = hash_payload(RAW);
        let hash2 = hash_payload(RAW);
        let hash3 = hash_payload("MSH|other");
        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_log_processed_json() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit").join("hl7-audit.log");
        let logger = AuditLogger::new(log_path.clone(), true, true).unwrap();

        logger.log_processed(&entry(true, None)).unwrap();
        logger
            .log_processed(&entry(false, Some("unsupported ADT event: A99")))
            .unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], MESSAGE_PROCESSED_EVENT);
        assert_eq!(first["message_type"], "ADT_A01");
        assert_eq!(first["control_id"], "M1");
        assert!(first.get("error").is_none());

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["success"], false);
        assert_eq!(second["error"], "unsupported ADT event: A99");

        // Patient data never reaches the audit file
        assert!(!content.contains("Zhang"));
    }

    #[test]
    fn test_log_processed_plain_text() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("hl7-audit.log");
        let logger = AuditLogger::new(log_path.clone(), false, true).unwrap();

        logger.log_processed(&entry(false, Some("boom"))).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("HL7_MESSAGE_PROCESSED | Type: ADT_A01 | Control ID: M1"));
        assert!(content.contains("| Error: boom"));
    }

    #[test]
    fn test_disabled_logger_writes_nothing() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("hl7-audit.log");
        let logger = AuditLogger::new(log_path.clone(), true, false).unwrap();

        logger.log_processed(&entry(true, None)).unwrap();
        assert!(!log_path.exists());
        assert!(!logger.is_enabled());
    }
}
