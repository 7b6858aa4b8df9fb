//! Segment parser
//!
//! One wire line becomes one [`Segment`]: a segment type plus 1-based
//! positional fields decoded through the schema table. Unknown segment types
//! are kept positionally as raw text and never fail to parse.

use super::codec::{join, split_fields, Delimiters};
use super::datatypes::Field;
use super::schema::{schema_for, FieldKind, SegmentSchema};
use crate::domain::errors::Hl7Error;
use crate::domain::ids::SegmentType;
use crate::domain::result::Result;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A parsed or built segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    segment_type: SegmentType,
    /// `fields[0]` is field 1
    fields: Vec<Field>,
}

impl Segment {
    /// Creates a segment with every schema field set to its empty value
    pub fn new(segment_type: SegmentType) -> Self {
        let fields = match schema_for(segment_type.as_str()) {
            Some(schema) => schema.fields.iter().map(|f| Field::empty(f.kind)).collect(),
            None => Vec::new(),
        };
        Self {
            segment_type,
            fields,
        }
    }

    /// Decodes raw field strings (field 1 first) according to the schema table
    ///
    /// Known types are padded to their schema width with empty values; fields
    /// past the schema are kept as text.
    pub fn parse(segment_type: SegmentType, raw_fields: &[&str], delimiters: &Delimiters) -> Self {
        let schema = schema_for(segment_type.as_str());
        let width = schema
            .map_or(0, SegmentSchema::field_count)
            .max(raw_fields.len());

        let fields = (1..=width)
            .map(|index| {
                let kind = schema.map_or(FieldKind::Text, |s| s.kind_of(index));
                match raw_fields.get(index - 1) {
                    Some(raw) => Field::decode(raw, kind, delimiters),
                    None => Field::empty(kind),
                }
            })
            .collect();

        Self {
            segment_type,
            fields,
        }
    }

    /// Parses one segment line
    ///
    /// MSH is special: MSH-1 is the field separator itself and MSH-2 the
    /// encoding characters, both kept verbatim. A segment with no schema keeps
    /// its first three characters as the type and everything after them
    /// positionally, so it never fails the parse.
    ///
    /// # Errors
    ///
    /// Returns [`Hl7Error::Parse`] when the line is shorter than three
    /// characters, or a known segment type is not followed by the field
    /// separator.
    pub fn parse_line(line: &str, delimiters: &Delimiters) -> Result<Self> {
        let split = line.char_indices().nth(3).map_or(line.len(), |(i, _)| i);
        let (type_str, rest) = line.split_at(split);
        if type_str.chars().count() < 3 {
            return Err(Hl7Error::Parse(format!("Segment line too short: '{line}'")));
        }

        let Some(schema) = schema_for(type_str) else {
            let body = rest.strip_prefix(delimiters.field).unwrap_or(rest);
            let raw_fields = if rest.is_empty() {
                Vec::new()
            } else {
                split_fields(body, delimiters.field)
            };
            return Ok(Self::parse(
                SegmentType::opaque(type_str),
                &raw_fields,
                delimiters,
            ));
        };
        let segment_type = SegmentType::from_static(schema.segment);

        if segment_type == "MSH" {
            let body = rest.strip_prefix(delimiters.field).ok_or_else(|| {
                Hl7Error::Parse("MSH segment is missing its field separator".to_string())
            })?;
            let separator = delimiters.field.to_string();
            let mut raw_fields = vec![separator.as_str()];
            raw_fields.extend(split_fields(body, delimiters.field));
            return Ok(Self::parse(segment_type, &raw_fields, delimiters));
        }

        if rest.is_empty() {
            return Ok(Self::parse(segment_type, &[], delimiters));
        }

        let body = rest.strip_prefix(delimiters.field).ok_or_else(|| {
            Hl7Error::Parse(format!(
                "Segment type '{type_str}' is not followed by the field separator"
            ))
        })?;
        Ok(Self::parse(
            segment_type,
            &split_fields(body, delimiters.field),
            delimiters,
        ))
    }

    pub fn segment_type(&self) -> &SegmentType {
        &self.segment_type
    }

    /// Number of positional fields held, including padding
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(Field::is_empty)
    }

    /// Field by 1-based index
    pub fn field(&self, index: usize) -> Option<&Field> {
        index.checked_sub(1).and_then(|i| self.fields.get(i))
    }

    /// Text of a field, or `""` when absent or not a text field
    pub fn text(&self, index: usize) -> &str {
        self.field(index).and_then(Field::as_text).unwrap_or("")
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Sets a field by 1-based index, growing the segment as needed
    ///
    /// Index 0 is ignored; there is no field before field 1.
    pub fn set(&mut self, index: usize, value: impl Into<Field>) {
        let Some(slot) = index.checked_sub(1) else {
            return;
        };
        if self.fields.len() <= slot {
            self.fields.resize_with(slot + 1, Field::default);
        }
        self.fields[slot] = value.into();
    }

    /// Builder-style [`Segment::set`]
    pub fn with(mut self, index: usize, value: impl Into<Field>) -> Self {
        self.set(index, value);
        self
    }

    /// Wire text with trailing empty fields dropped
    pub fn encode(&self, delimiters: &Delimiters) -> String {
        self.render(delimiters, true)
    }

    /// Wire text keeping every field position, including trailing empties
    pub fn encode_padded(&self, delimiters: &Delimiters) -> String {
        self.render(delimiters, false)
    }

    fn render(&self, delimiters: &Delimiters, trim: bool) -> String {
        let is_msh = self.segment_type == "MSH";
        let mut parts: Vec<String> = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, field)| match (is_msh, i) {
                (true, 1) if field.is_empty() => delimiters.encoding_characters(),
                _ => field.encode(delimiters),
            })
            .collect();

        if trim {
            // MSH-1 and MSH-2 are structural and always written
            let keep = if is_msh { 2 } else { 0 };
            while parts.len() > keep && parts.last().is_some_and(String::is_empty) {
                parts.pop();
            }
        }

        let mut out = self.segment_type.as_str().to_string();
        if is_msh {
            out.push(delimiters.field);
            out.push_str(&join(parts.get(1..).unwrap_or_default(), delimiters.field));
        } else if !parts.is_empty() {
            out.push(delimiters.field);
            out.push_str(&join(&parts, delimiters.field));
        }
        out
    }
}

impl Serialize for Segment {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (i, field) in self.fields.iter().enumerate() {
            map.serialize_entry(&self.segment_type.field_key(i + 1), field)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delims() -> Delimiters {
        Delimiters::default()
    }

    #[test]
    fn test_parse_pid_decodes_composites() {
        let seg = Segment::parse_line(
            "PID|1||P001^^^EMR^MR||Zhang^San||19850515|MALE|||Beijing||^PRN^PH^^^13800138000",
            &delims(),
        )
        .unwrap();

        assert_eq!(seg.segment_type(), &SegmentType::new("PID").unwrap());
        assert_eq!(seg.len(), 30);
        assert_eq!(seg.text(1), "1");
        let name = seg.field(5).and_then(Field::as_person_name).unwrap();
        assert_eq!(name.family, "Zhang");
        assert_eq!(name.given, vec!["San"]);
        assert_eq!(seg.text(7), "19850515");
        assert_eq!(seg.text(8), "MALE");
        assert_eq!(seg.text(11), "Beijing");
        let phones = seg.field(13).unwrap().repetitions();
        assert_eq!(phones[0].as_telephone().unwrap().local, "13800138000");
        assert_eq!(seg.text(30), "");
    }

    #[test]
    fn test_parse_msh_keeps_separator_and_encoding() {
        let seg = Segment::parse_line(
            r"MSH|^~\&|EMR|HOSPITAL|RECEIVER|DEST|20240101120000||ADT^A01|MSG1|P|2.5",
            &delims(),
        )
        .unwrap();
        assert_eq!(seg.text(1), "|");
        assert_eq!(seg.text(2), r"^~\&");
        assert_eq!(seg.text(3), "EMR");
        let msg = seg.field(9).and_then(Field::as_message_type).unwrap();
        assert_eq!((msg.code.as_str(), msg.trigger.as_str()), ("ADT", "A01"));
        assert_eq!(seg.text(10), "MSG1");
        assert_eq!(seg.text(12), "2.5");
    }

    #[test]
    fn test_unknown_segment_is_positional() {
        let seg = Segment::parse_line("ZPI|a^b||c", &delims()).unwrap();
        assert_eq!(seg.len(), 3);
        assert_eq!(seg.text(1), "a^b");
        assert_eq!(seg.text(2), "");
        assert_eq!(seg.text(3), "c");

        let json = serde_json::to_value(&seg).unwrap();
        assert_eq!(json["zpi_1"], "a^b");
        assert_eq!(json["zpi_3"], "c");
    }

    #[test]
    fn test_segment_without_fields() {
        let seg = Segment::parse_line("ZZZ", &delims()).unwrap();
        assert_eq!(seg.len(), 0);
        assert_eq!(seg.encode(&delims()), "ZZZ");
    }

    #[test]
    fn test_parse_line_errors() {
        assert!(Segment::parse_line("PI", &delims()).is_err());
        assert!(Segment::parse_line("PIDX|1", &delims()).is_err());
        assert!(Segment::parse_line("MSH", &delims()).is_err());
    }

    #[test]
    fn test_unrecognized_type_codes_are_opaque() {
        let seg = Segment::parse_line("ZPI^x|y", &delims()).unwrap();
        assert_eq!(seg.segment_type().as_str(), "ZPI");
        assert_eq!(seg.text(1), "^x");
        assert_eq!(seg.text(2), "y");

        let seg = Segment::parse_line("Z-1|a|b", &delims()).unwrap();
        assert_eq!(seg.segment_type().as_str(), "Z-1");
        assert_eq!(seg.len(), 2);
        assert_eq!(seg.text(1), "a");
        assert_eq!(seg.text(2), "b");
        assert_eq!(seg.encode(&delims()), "Z-1|a|b");

        let seg = Segment::parse_line("P|D|1", &delims()).unwrap();
        assert_eq!(seg.segment_type().as_str(), "P|D");
        assert_eq!(seg.text(1), "1");
    }

    #[test]
    fn test_encode_trims_trailing_empty_fields() {
        let seg = Segment::new(SegmentType::new("PV1").unwrap())
            .with(1, "1")
            .with(2, "I")
            .with(7, "D001");
        assert_eq!(seg.encode(&delims()), "PV1|1|I|||||D001");
    }

    #[test]
    fn test_encode_padded_keeps_schema_width() {
        let seg = Segment::new(SegmentType::new("MSA").unwrap())
            .with(1, "AA")
            .with(2, "MSG1");
        assert_eq!(seg.encode_padded(&delims()), "MSA|AA|MSG1|");
        assert_eq!(seg.encode(&delims()), "MSA|AA|MSG1");
    }

    #[test]
    fn test_msh_encode_round_trip() {
        let line = r"MSH|^~\&|EMR|HOSPITAL|RECEIVER|DEST|20240101120000||ADT^A01|MSG1|P|2.5";
        let seg = Segment::parse_line(line, &delims()).unwrap();
        assert_eq!(seg.encode(&delims()), line);
    }

    #[test]
    fn test_set_grows_segment() {
        let mut seg = Segment::new(SegmentType::new("ZAB").unwrap());
        seg.set(3, "x");
        seg.set(0, "ignored");
        assert_eq!(seg.len(), 3);
        assert_eq!(seg.encode(&delims()), "ZAB|||x");
    }
}
