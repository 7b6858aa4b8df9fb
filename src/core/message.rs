//! Message parser
//!
//! Raw wire text becomes a [`Message`]: the delimiters declared by MSH plus
//! the ordered segments. Non-repeatable segment types are held once, a later
//! occurrence replacing the earlier one in place; repeatable types (OBX) keep
//! every occurrence in wire order.

use super::codec::Delimiters;
use super::datatypes::{Field, MessageTypeField};
use super::schema::schema_for;
use super::segment::Segment;
use crate::domain::errors::Hl7Error;
use crate::domain::result::Result;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A parsed or built HL7 message; MSH is always the first segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    delimiters: Delimiters,
    segments: Vec<Segment>,
}

impl Message {
    /// Parses raw HL7 text
    ///
    /// Lines may be separated by CR, LF or CRLF; blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Hl7Error::Parse`] when there is no segment, the first
    /// segment is not MSH, or any line fails to parse as a segment.
    ///
    /// # Examples
    ///
    /// ```
    /// use emr_hl7::core::message::Message;
    ///
    /// let raw = "MSH|^~\\&|HIS|HOSP|EMR|EMR|20240101120000||ADT^A01|MSG00001|P|2.5\r\
    ///            PID|1||P001^^^EMR^MR||Zhang^San||19850515|MALE\r";
    /// let message = Message::parse(raw).unwrap();
    /// assert_eq!(message.control_id(), "MSG00001");
    /// assert_eq!(message.message_code(), "ADT");
    /// assert_eq!(message.trigger_event(), "A01");
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let mut lines = raw
            .split(|c| c == '\r' || c == '\n')
            .filter(|line| !line.trim().is_empty());

        let first = lines
            .next()
            .ok_or_else(|| Hl7Error::Parse("Message contains no segments".to_string()))?;
        if !first.starts_with("MSH") {
            return Err(Hl7Error::Parse(format!(
                "First segment must be MSH, found '{}'",
                first.get(..3).unwrap_or(first)
            )));
        }

        let delimiters = Delimiters::from_msh(first).map_err(Hl7Error::Parse)?;
        let mut message = Self {
            delimiters,
            segments: vec![Segment::parse_line(first, &delimiters)?],
        };

        for line in lines {
            let segment = Segment::parse_line(line, &delimiters)?;
            message.insert(segment);
        }

        Ok(message)
    }

    /// Assembles a message from segments whose first element is MSH
    ///
    /// The same replace-or-append rule as parsing applies.
    pub fn from_segments(delimiters: Delimiters, segments: Vec<Segment>) -> Result<Self> {
        let mut iter = segments.into_iter();
        let msh = iter
            .next()
            .filter(|s| s.segment_type() == "MSH")
            .ok_or_else(|| Hl7Error::Build("Message must start with an MSH segment".to_string()))?;

        let mut message = Self {
            delimiters,
            segments: vec![msh],
        };
        for segment in iter {
            message.insert(segment);
        }
        Ok(message)
    }

    fn insert(&mut self, segment: Segment) {
        let repeatable =
            schema_for(segment.segment_type().as_str()).is_some_and(|schema| schema.repeatable);
        if !repeatable {
            if let Some(existing) = self
                .segments
                .iter_mut()
                .find(|s| s.segment_type() == segment.segment_type())
            {
                *existing = segment;
                return;
            }
        }
        self.segments.push(segment);
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    /// The MSH segment
    pub fn msh(&self) -> &Segment {
        &self.segments[0]
    }

    /// Last (or only) occurrence of a segment type
    pub fn segment(&self, segment_type: &str) -> Option<&Segment> {
        self.segments
            .iter()
            .rev()
            .find(|s| s.segment_type() == segment_type)
    }

    /// Every occurrence of a segment type, in wire order
    pub fn segments(&self, segment_type: &str) -> Vec<&Segment> {
        self.segments
            .iter()
            .filter(|s| s.segment_type() == segment_type)
            .collect()
    }

    /// All segments in wire order
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// MSH-9 decoded
    pub fn message_type(&self) -> Option<&MessageTypeField> {
        self.msh().field(9).and_then(Field::as_message_type)
    }

    /// MSH-9.1, e.g. `ADT`
    pub fn message_code(&self) -> &str {
        self.message_type().map_or("", |t| t.code.as_str())
    }

    /// MSH-9.2, e.g. `A01`
    pub fn trigger_event(&self) -> &str {
        self.message_type().map_or("", |t| t.trigger.as_str())
    }

    /// MSH-10, opaque
    pub fn control_id(&self) -> &str {
        self.msh().text(10)
    }

    pub fn sending_application(&self) -> &str {
        self.msh().text(3)
    }

    pub fn sending_facility(&self) -> &str {
        self.msh().text(4)
    }

    pub fn receiving_application(&self) -> &str {
        self.msh().text(5)
    }

    pub fn receiving_facility(&self) -> &str {
        self.msh().text(6)
    }

    pub fn timestamp(&self) -> &str {
        self.msh().text(7)
    }

    pub fn processing_id(&self) -> &str {
        self.msh().text(11)
    }

    pub fn version(&self) -> &str {
        self.msh().text(12)
    }

    /// Wire text: segments joined and terminated by CR
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push_str(&segment.encode(&self.delimiters));
            out.push('\r');
        }
        out
    }
}

impl Serialize for Message {
    /// Map keyed by lowercased segment type; repeatable types become arrays
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seen: Vec<&str> = Vec::new();
        for segment in &self.segments {
            let ty = segment.segment_type().as_str();
            if !seen.contains(&ty) {
                seen.push(ty);
            }
        }

        let mut map = serializer.serialize_map(Some(seen.len()))?;
        for ty in seen {
            let key = ty.to_ascii_lowercase();
            if schema_for(ty).is_some_and(|schema| schema.repeatable) {
                map.serialize_entry(&key, &self.segments(ty))?;
            } else if let Some(segment) = self.segment(ty) {
                map.serialize_entry(&key, segment)?;
            }
        }
        map.end()
    }
}
