//! Acknowledgement generator
//!
//! An ACK is two segments: an MSH addressed back to the original sender and
//! an MSA carrying the acknowledgement code and the original control ID. The
//! sender of an inbound message matches the ACK to it through MSA-2 alone.

use super::builder::hl7_timestamp;
use super::codec::{escape_text, Delimiters};
use super::datatypes::MessageTypeField;
use super::message::Message;
use super::segment::Segment;
use crate::config::HeaderConfig;
use crate::domain::ids::{ControlId, SegmentType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const DEFAULT_PROCESSING_ID: &str = "P";
const DEFAULT_VERSION: &str = "2.5";

/// MSA-1 acknowledgement code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AckCode {
    /// Application accept
    #[serde(rename = "AA")]
    Accept,
    /// Application reject
    #[serde(rename = "AR")]
    Reject,
}

impl AckCode {
    pub fn from_accepted(accepted: bool) -> Self {
        if accepted {
            Self::Accept
        } else {
            Self::Reject
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "AA",
            Self::Reject => "AR",
        }
    }
}

impl fmt::Display for AckCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds ACK messages for parsed inbound messages
#[derive(Debug, Clone, Default)]
pub struct AckBuilder {
    header: HeaderConfig,
}

impl AckBuilder {
    /// `header` supplies the ACK sender when the original left MSH-5/6 empty
    pub fn new(header: HeaderConfig) -> Self {
        Self { header }
    }

    /// Builds the ACK for `original`
    ///
    /// `error_text` is only written on rejection, escaped with the original
    /// message's delimiters.
    ///
    /// # Examples
    ///
    /// ```
    /// use emr_hl7::core::ack::AckBuilder;
    /// use emr_hl7::core::message::Message;
    ///
    /// let raw = "MSH|^~\\&|HIS|HOSP|EMR|WARD|20240101||ADT^A01|X42|P|2.5\r";
    /// let message = Message::parse(raw).unwrap();
    /// let ack = AckBuilder::default().build_ack(&message, true, None);
    /// assert!(ack.contains("\rMSA|AA|X42|"));
    /// ```
    pub fn build_ack(&self, original: &Message, accepted: bool, error_text: Option<&str>) -> String {
        self.build_ack_at(original, accepted, error_text, Utc::now())
    }

    pub(crate) fn build_ack_at(
        &self,
        original: &Message,
        accepted: bool,
        error_text: Option<&str>,
        now: DateTime<Utc>,
    ) -> String {
        let delimiters = original.delimiters();
        let code = AckCode::from_accepted(accepted);

        let msh = Segment::new(SegmentType::from_static("MSH"))
            .with(1, delimiters.field.to_string())
            .with(2, delimiters.encoding_characters())
            .with(3, non_empty_or(original.receiving_application(), &self.header.sending_application))
            .with(4, non_empty_or(original.receiving_facility(), &self.header.sending_facility))
            .with(5, original.sending_application())
            .with(6, original.sending_facility())
            .with(7, hl7_timestamp(now))
            .with(9, MessageTypeField::new("ACK", original.trigger_event()))
            .with(10, ControlId::generate(now).into_inner())
            .with(11, non_empty_or(original.processing_id(), DEFAULT_PROCESSING_ID))
            .with(12, non_empty_or(original.version(), DEFAULT_VERSION));

        let mut msa = Segment::new(SegmentType::from_static("MSA"))
            .with(1, code.as_str())
            .with(2, original.control_id());
        if code == AckCode::Reject {
            if let Some(text) = error_text {
                msa.set(3, escape_text(text, delimiters));
            }
        }

        render(&msh, &msa, delimiters)
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn render(msh: &Segment, msa: &Segment, delimiters: &Delimiters) -> String {
    format!(
        "{}\r{}\r",
        msh.encode(delimiters),
        msa.encode_padded(delimiters)
    )
}
