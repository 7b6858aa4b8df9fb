//! Outbound message builder
//!
//! Turns EMR records into ADT^A01, ADT^A02, ORM^O01 and ORU^R01 wire text.
//! Segments are assembled through the same [`Segment`] and schema table the
//! parser uses, so a built message always parses back to the values it was
//! built from. Caller-supplied values are written without escaping.

use super::codec::Delimiters;
use super::datatypes::{CodedElement, ExtendedId, Field, MessageTypeField, PersonName, TelephoneNumber};
use super::segment::Segment;
use crate::config::HeaderConfig;
use crate::domain::errors::Hl7Error;
use crate::domain::ids::{ControlId, SegmentType};
use crate::domain::records::{ExaminationRecord, OrderRecord, PatientRecord};
use crate::domain::result::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HL7 DTM timestamp, `YYYYMMDDHHMMSS`
pub fn hl7_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d%H%M%S").to_string()
}

/// HL7 DT date, `YYYYMMDD`
pub fn hl7_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// The outbound message kinds the builder produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutboundKind {
    #[serde(rename = "ADT_A01")]
    AdtA01,
    #[serde(rename = "ADT_A02")]
    AdtA02,
    #[serde(rename = "ORM_O01")]
    OrmO01,
    #[serde(rename = "ORU_R01")]
    OruR01,
}

impl OutboundKind {
    /// Every supported kind
    pub const ALL: [OutboundKind; 4] = [Self::AdtA01, Self::AdtA02, Self::OrmO01, Self::OruR01];

    /// `(message code, trigger event)` written to MSH-9
    pub fn message_type(self) -> (&'static str, &'static str) {
        match self {
            Self::AdtA01 => ("ADT", "A01"),
            Self::AdtA02 => ("ADT", "A02"),
            Self::OrmO01 => ("ORM", "O01"),
            Self::OruR01 => ("ORU", "R01"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AdtA01 => "ADT_A01",
            Self::AdtA02 => "ADT_A02",
            Self::OrmO01 => "ORM_O01",
            Self::OruR01 => "ORU_R01",
        }
    }
}

impl fmt::Display for OutboundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutboundKind {
    type Err = Hl7Error;

    /// Accepts `ADT_A01`, `ADT^A01` and lowercase forms
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace('^', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| Hl7Error::Build(format!("Unsupported outbound message kind: {s}")))
    }
}

/// A built outbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub kind: OutboundKind,
    pub control_id: ControlId,
    /// CR-terminated wire text
    pub text: String,
}

/// Builds outbound messages with the configured MSH header values
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    header: HeaderConfig,
    delimiters: Delimiters,
}

impl MessageBuilder {
    pub fn new(header: HeaderConfig) -> Self {
        Self {
            header,
            delimiters: Delimiters::default(),
        }
    }

    pub fn header(&self) -> &HeaderConfig {
        &self.header
    }

    /// ADT^A01 admit: MSH, EVN, PID, PV1
    ///
    /// # Examples
    ///
    /// ```
    /// use emr_hl7::core::builder::MessageBuilder;
    /// use emr_hl7::domain::PatientRecord;
    ///
    /// let patient = PatientRecord::new("P001", "Zhang").with_given("San");
    /// let text = MessageBuilder::default().build_adt_a01(&patient);
    /// assert!(text.starts_with("MSH|^~\\&|EMR|HOSPITAL|RECEIVER|DESTINATION|"));
    /// assert!(text.contains("\rPID|1||P001^^^EMR^MR||Zhang^San"));
    /// ```
    pub fn build_adt_a01(&self, patient: &PatientRecord) -> String {
        self.adt(OutboundKind::AdtA01, patient, Utc::now()).text
    }

    /// ADT^A02 transfer: MSH, EVN, PID, PV1
    pub fn build_adt_a02(&self, patient: &PatientRecord) -> String {
        self.adt(OutboundKind::AdtA02, patient, Utc::now()).text
    }

    /// ORM^O01 order: MSH, ORC, OBR
    pub fn build_orm_o01(&self, order: &OrderRecord) -> String {
        self.orm(order, Utc::now()).text
    }

    /// ORU^R01 result: MSH, OBR, OBX
    pub fn build_oru_r01(&self, examination: &ExaminationRecord) -> String {
        self.oru(examination, Utc::now()).text
    }

    /// Builds a message of `kind` from a JSON record
    ///
    /// # Errors
    ///
    /// Returns [`Hl7Error::Build`] when the record does not deserialize into
    /// the record type the kind requires.
    pub fn build(&self, kind: OutboundKind, record: serde_json::Value) -> Result<OutboundMessage> {
        let now = Utc::now();
        let message = match kind {
            OutboundKind::AdtA01 | OutboundKind::AdtA02 => {
                self.adt(kind, &parse_record::<PatientRecord>(kind, record)?, now)
            }
            OutboundKind::OrmO01 => self.orm(&parse_record::<OrderRecord>(kind, record)?, now),
            OutboundKind::OruR01 => {
                self.oru(&parse_record::<ExaminationRecord>(kind, record)?, now)
            }
        };
        Ok(message)
    }

    pub(crate) fn adt(
        &self,
        kind: OutboundKind,
        patient: &PatientRecord,
        now: DateTime<Utc>,
    ) -> OutboundMessage {
        let (_, event) = kind.message_type();
        let msh = self.msh(
            kind,
            &self.header.sending_application,
            &self.header.adt_receiver,
            now,
        );

        let mut evn = segment("EVN").with(1, event).with(2, hl7_timestamp(now));
        if let Some(doctor) = &patient.doctor_id {
            evn.set(5, doctor.as_str());
        }

        let mut identifiers = vec![Field::from(ExtendedId::assigned(
            patient.id.as_str(),
            "EMR",
            "MR",
        ))];
        if let Some(id_card) = patient.id_card.as_deref().filter(|c| !c.is_empty()) {
            identifiers.push(ExtendedId::assigned(id_card, "CN", "PI").into());
        }

        let name = PersonName {
            family: patient.family.clone(),
            given: patient.given.clone(),
            ..PersonName::default()
        };

        let mut pid = segment("PID")
            .with(1, "1")
            .with(3, Field::Repeated(identifiers))
            .with(5, name)
            .with(8, patient.gender.as_str());
        if let Some(birth_date) = patient.birth_date {
            pid.set(7, hl7_date(birth_date));
        }
        if let Some(address) = &patient.address {
            pid.set(11, address.as_str());
        }
        if let Some(phone) = patient.phone.as_deref().filter(|p| !p.is_empty()) {
            let home = TelephoneNumber {
                use_code: "PRN".to_string(),
                equipment_type: "PH".to_string(),
                local: phone.to_string(),
                ..TelephoneNumber::default()
            };
            pid.set(13, Field::Repeated(vec![home.into()]));
        }

        let mut pv1 = segment("PV1").with(1, "1").with(2, "I");
        if let Some(doctor) = &patient.doctor_id {
            pv1.set(7, doctor.as_str());
        }

        self.finish(kind, msh, vec![evn, pid, pv1])
    }

    pub(crate) fn orm(&self, order: &OrderRecord, now: DateTime<Utc>) -> OutboundMessage {
        let kind = OutboundKind::OrmO01;
        let msh = self.msh(
            kind,
            &self.header.sending_application,
            &self.header.orm_receiver,
            now,
        );
        let ordered_at = hl7_timestamp(order.created_at.unwrap_or(now));

        let mut orc = segment("ORC")
            .with(1, "NW")
            .with(2, order.id.as_str())
            .with(5, "CM")
            .with(9, ordered_at.as_str());
        if let Some(doctor) = &order.doctor_id {
            orc.set(12, doctor.as_str());
        }

        let service = CodedElement {
            identifier: order.exam_name.clone().unwrap_or_default(),
            text: order.content.clone(),
            ..CodedElement::default()
        };
        let mut obr = segment("OBR")
            .with(1, "1")
            .with(2, order.id.as_str())
            .with(4, service)
            .with(7, ordered_at);
        if let Some(doctor) = &order.doctor_id {
            obr.set(16, doctor.as_str());
        }
        if let Some(exam_type) = &order.exam_type {
            obr.set(24, exam_type.as_str());
        }

        self.finish(kind, msh, vec![orc, obr])
    }

    pub(crate) fn oru(&self, examination: &ExaminationRecord, now: DateTime<Utc>) -> OutboundMessage {
        let kind = OutboundKind::OruR01;
        let msh = self.msh(
            kind,
            &self.header.oru_sender,
            &self.header.oru_receiver,
            now,
        );
        let observation = CodedElement {
            identifier: examination.exam_name.clone(),
            ..CodedElement::default()
        };
        let reported_at = examination.reported_at.map(hl7_timestamp);

        let mut obr = segment("OBR")
            .with(1, "1")
            .with(4, observation.clone())
            .with(25, "F");
        if let Some(id) = &examination.id {
            obr.set(2, id.as_str());
        }
        if let Some(doctor) = &examination.doctor_id {
            obr.set(16, doctor.as_str());
        }
        if let Some(reported_at) = &reported_at {
            obr.set(22, reported_at.as_str());
        }
        if let Some(exam_type) = &examination.exam_type {
            obr.set(24, exam_type.as_str());
        }

        let mut obx = segment("OBX")
            .with(1, "1")
            .with(2, "ST")
            .with(3, observation)
            .with(11, "F");
        if let Some(result) = &examination.result {
            obx.set(5, result.as_str());
        }
        if let Some(reported_at) = reported_at {
            obx.set(14, reported_at);
        }

        self.finish(kind, msh, vec![obr, obx])
    }

    fn msh(
        &self,
        kind: OutboundKind,
        sending_application: &str,
        receiving_application: &str,
        now: DateTime<Utc>,
    ) -> Segment {
        let (code, event) = kind.message_type();
        segment("MSH")
            .with(1, self.delimiters.field.to_string())
            .with(2, self.delimiters.encoding_characters())
            .with(3, sending_application)
            .with(4, self.header.sending_facility.as_str())
            .with(5, receiving_application)
            .with(6, self.header.receiving_facility.as_str())
            .with(7, hl7_timestamp(now))
            .with(9, MessageTypeField::new(code, event))
            .with(10, ControlId::generate(now).into_inner())
            .with(11, self.header.processing_id.as_str())
            .with(12, self.header.version.as_str())
    }

    fn finish(&self, kind: OutboundKind, msh: Segment, body: Vec<Segment>) -> OutboundMessage {
        let control_id = ControlId::new(msh.text(10));
        let text = std::iter::once(&msh)
            .chain(body.iter())
            .map(|s| {
                let mut line = s.encode(&self.delimiters);
                line.push('\r');
                line
            })
            .collect::<String>();

        crate::log_message_built!(kind, control_id);

        OutboundMessage {
            kind,
            control_id,
            text,
        }
    }
}

fn segment(segment_type: &'static str) -> Segment {
    Segment::new(SegmentType::from_static(segment_type))
}

fn parse_record<T: serde::de::DeserializeOwned>(
    kind: OutboundKind,
    record: serde_json::Value,
) -> Result<T> {
    serde_json::from_value(record)
        .map_err(|e| Hl7Error::Build(format!("Invalid record for {kind}: {e}")))
}
