//! Collaborator records consumed by the message builder
//!
//! These are the plain domain objects the EMR hands to the engine when it
//! wants an outbound message: a patient for ADT, an order for ORM and an
//! examination result for ORU. They deserialize from the camelCase JSON the
//! EMR's REST layer produces; numeric database IDs are accepted as well as
//! strings.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Patient demographics used to build ADT messages
///
/// # Examples
///
/// ```
/// use emr_hl7::domain::PatientRecord;
///
/// let patient = PatientRecord::new("1", "Zhang")
///     .with_given("San")
///     .with_gender("MALE")
///     .with_phone("13800138000");
/// assert_eq!(patient.given, vec!["San".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    /// EMR patient ID
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Family name
    #[serde(default)]
    pub family: String,

    /// Given names, in order
    #[serde(default)]
    pub given: Vec<String>,

    /// Administrative gender as stored by the EMR (e.g. `MALE`)
    #[serde(default)]
    pub gender: String,

    /// Date of birth; a full RFC 3339 timestamp is accepted and keeps its date
    #[serde(default, deserialize_with = "opt_date_or_datetime")]
    pub birth_date: Option<NaiveDate>,

    /// Primary phone number
    #[serde(default)]
    pub phone: Option<String>,

    /// Free-text address
    #[serde(default)]
    pub address: Option<String>,

    /// National identity card number
    #[serde(default)]
    pub id_card: Option<String>,

    /// Attending doctor ID
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub doctor_id: Option<String>,
}

impl PatientRecord {
    /// Creates a patient with only an ID and family name
    pub fn new(id: impl Into<String>, family: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            family: family.into(),
            given: Vec::new(),
            gender: String::new(),
            birth_date: None,
            phone: None,
            address: None,
            id_card: None,
            doctor_id: None,
        }
    }

    /// Appends a given name
    pub fn with_given(mut self, given: impl Into<String>) -> Self {
        self.given.push(given.into());
        self
    }

    /// Sets the gender
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = gender.into();
        self
    }

    /// Sets the date of birth
    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    /// Sets the phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the address
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the identity card number
    pub fn with_id_card(mut self, id_card: impl Into<String>) -> Self {
        self.id_card = Some(id_card.into());
        self
    }

    /// Sets the attending doctor
    pub fn with_doctor_id(mut self, doctor_id: impl Into<String>) -> Self {
        self.doctor_id = Some(doctor_id.into());
        self
    }
}

/// Medical order used to build ORM messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// EMR order ID, sent as the placer order number
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Order text, e.g. drug, dose and frequency
    #[serde(default)]
    pub content: String,

    /// Ordering doctor ID
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub doctor_id: Option<String>,

    /// Name of the ordered service, if any
    #[serde(default)]
    pub exam_name: Option<String>,

    /// Order category (e.g. `MEDICATION`, `LABORATORY`)
    #[serde(default)]
    pub exam_type: Option<String>,

    /// When the order was placed
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl OrderRecord {
    /// Creates an order with an ID and content
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            doctor_id: None,
            exam_name: None,
            exam_type: None,
            created_at: None,
        }
    }

    /// Sets the ordering doctor
    pub fn with_doctor_id(mut self, doctor_id: impl Into<String>) -> Self {
        self.doctor_id = Some(doctor_id.into());
        self
    }

    /// Sets the ordered service name
    pub fn with_exam_name(mut self, exam_name: impl Into<String>) -> Self {
        self.exam_name = Some(exam_name.into());
        self
    }

    /// Sets the order category
    pub fn with_exam_type(mut self, exam_type: impl Into<String>) -> Self {
        self.exam_type = Some(exam_type.into());
        self
    }

    /// Sets the creation time
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Examination result used to build ORU messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExaminationRecord {
    /// EMR examination ID
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,

    /// Name of the examination
    pub exam_name: String,

    /// Examination category (e.g. `LABORATORY`)
    #[serde(default)]
    pub exam_type: Option<String>,

    /// Result text
    #[serde(default)]
    pub result: Option<String>,

    /// When the result was reported
    #[serde(default)]
    pub reported_at: Option<DateTime<Utc>>,

    /// Responsible doctor ID
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub doctor_id: Option<String>,
}

impl ExaminationRecord {
    /// Creates an examination with only a name
    pub fn new(exam_name: impl Into<String>) -> Self {
        Self {
            id: None,
            exam_name: exam_name.into(),
            exam_type: None,
            result: None,
            reported_at: None,
            doctor_id: None,
        }
    }

    /// Sets the examination ID
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the result text
    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }

    /// Sets the report time
    pub fn with_reported_at(mut self, reported_at: DateTime<Utc>) -> Self {
        self.reported_at = Some(reported_at);
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Integer(i64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Integer(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|v| v.map(String::from))
}

fn opt_date_or_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|datetime| Some(datetime.date_naive()))
        .map_err(|_| {
            serde::de::Error::custom(format!(
                "expected YYYY-MM-DD or an RFC 3339 timestamp, got '{raw}'"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patient_from_emr_json() {
        let patient: PatientRecord = serde_json::from_value(json!({
            "id": 1,
            "family": "Zhang",
            "given": ["San"],
            "gender": "MALE",
            "birthDate": "1985-05-15",
            "phone": "13800138000",
            "idCard": "110101198505150001",
            "doctorId": 7
        }))
        .unwrap();

        assert_eq!(patient.id, "1");
        assert_eq!(patient.doctor_id.as_deref(), Some("7"));
        assert_eq!(
            patient.birth_date,
            Some(NaiveDate::from_ymd_opt(1985, 5, 15).unwrap())
        );
        assert_eq!(patient.address, None);
    }

    #[test]
    fn test_patient_birth_date_accepts_timestamps() {
        let expected = Some(NaiveDate::from_ymd_opt(1985, 5, 15).unwrap());
        for birth_date in ["1985-05-15T00:00:00.000Z", "1985-05-15T08:00:00+08:00"] {
            let patient: PatientRecord = serde_json::from_value(json!({
                "id": 1,
                "family": "Zhang",
                "birthDate": birth_date
            }))
            .unwrap();
            assert_eq!(patient.birth_date, expected, "{birth_date}");
        }

        let patient: PatientRecord =
            serde_json::from_value(json!({ "id": 1, "birthDate": null })).unwrap();
        assert!(patient.birth_date.is_none());

        let result =
            serde_json::from_value::<PatientRecord>(json!({ "id": 1, "birthDate": "15/05/1985" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_order_from_emr_json() {
        let order: OrderRecord = serde_json::from_value(json!({
            "id": "42",
            "content": "Aspirin 100mg PO QD",
            "createdAt": "2024-01-10T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(order.id, "42");
        assert!(order.doctor_id.is_none());
        assert!(order.created_at.is_some());
    }

    #[test]
    fn test_examination_requires_name() {
        let result = serde_json::from_value::<ExaminationRecord>(json!({ "result": "normal" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_patient_builder() {
        let patient = PatientRecord::new("9", "Li")
            .with_given("Si")
            .with_given("Ming")
            .with_doctor_id("3");
        assert_eq!(patient.given, vec!["Si", "Ming"]);
        assert_eq!(patient.doctor_id.as_deref(), Some("3"));
    }
}
