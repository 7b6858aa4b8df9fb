//! HL7 field values and composite data types
//!
//! A field is either raw text, a typed composite decoded from its components,
//! or a list of repetitions. Which one a position holds is decided by the
//! schema table in [`super::schema`], never by looking at the data.

use super::codec::{
    join, join_trimmed, split_components, split_repetitions, split_subcomponents, Delimiters,
};
use super::schema::{CompositeKind, FieldKind};
use serde::Serialize;

/// Fixed-arity composite decoded from component-delimited text
pub trait CompositeValue: Sized {
    /// Decodes the components of one field (or one repetition)
    fn decode(raw: &str, delimiters: &Delimiters) -> Self;

    /// Components in wire order, already joined at sub-component level
    fn components(&self, delimiters: &Delimiters) -> Vec<String>;

    /// Wire text with trailing empty components dropped
    fn encode(&self, delimiters: &Delimiters) -> String {
        join_trimmed(&self.components(delimiters), delimiters.component)
    }
}

fn component(parts: &[&str], index: usize) -> String {
    parts.get(index).map(|s| (*s).to_string()).unwrap_or_default()
}

/// XPN person name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonName {
    pub family: String,
    /// Given names, carried as sub-components of the second component
    pub given: Vec<String>,
    pub middle: String,
    pub prefix: String,
    pub suffix: String,
    pub degree: String,
}

impl CompositeValue for PersonName {
    fn decode(raw: &str, delimiters: &Delimiters) -> Self {
        let parts = split_components(raw, delimiters.component);
        let given = parts
            .get(1)
            .map(|g| {
                split_subcomponents(g, delimiters.subcomponent)
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            family: component(&parts, 0),
            given,
            middle: component(&parts, 2),
            prefix: component(&parts, 3),
            suffix: component(&parts, 4),
            degree: component(&parts, 5),
        }
    }

    fn components(&self, delimiters: &Delimiters) -> Vec<String> {
        vec![
            self.family.clone(),
            join(&self.given, delimiters.subcomponent),
            self.middle.clone(),
            self.prefix.clone(),
            self.suffix.clone(),
            self.degree.clone(),
        ]
    }
}

/// CE coded element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodedElement {
    pub identifier: String,
    pub text: String,
    pub coding_system: String,
    pub alternate_identifier: String,
    pub alternate_text: String,
    pub alternate_coding_system: String,
}

impl CompositeValue for CodedElement {
    fn decode(raw: &str, delimiters: &Delimiters) -> Self {
        let parts = split_components(raw, delimiters.component);
        Self {
            identifier: component(&parts, 0),
            text: component(&parts, 1),
            coding_system: component(&parts, 2),
            alternate_identifier: component(&parts, 3),
            alternate_text: component(&parts, 4),
            alternate_coding_system: component(&parts, 5),
        }
    }

    fn components(&self, _delimiters: &Delimiters) -> Vec<String> {
        vec![
            self.identifier.clone(),
            self.text.clone(),
            self.coding_system.clone(),
            self.alternate_identifier.clone(),
            self.alternate_text.clone(),
            self.alternate_coding_system.clone(),
        ]
    }
}

/// XTN telephone number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelephoneNumber {
    pub number: String,
    #[serde(rename = "use")]
    pub use_code: String,
    pub equipment_type: String,
    pub country: String,
    pub area: String,
    pub local: String,
    pub extension: String,
}

impl CompositeValue for TelephoneNumber {
    fn decode(raw: &str, delimiters: &Delimiters) -> Self {
        let parts = split_components(raw, delimiters.component);
        Self {
            number: component(&parts, 0),
            use_code: component(&parts, 1),
            equipment_type: component(&parts, 2),
            country: component(&parts, 3),
            area: component(&parts, 4),
            local: component(&parts, 5),
            extension: component(&parts, 6),
        }
    }

    fn components(&self, _delimiters: &Delimiters) -> Vec<String> {
        vec![
            self.number.clone(),
            self.use_code.clone(),
            self.equipment_type.clone(),
            self.country.clone(),
            self.area.clone(),
            self.local.clone(),
            self.extension.clone(),
        ]
    }
}

/// CX extended identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedId {
    pub id: String,
    pub check_digit: String,
    pub check_digit_scheme: String,
    pub assigning_authority: String,
    pub identifier_type: String,
}

impl ExtendedId {
    /// Identifier with an assigning authority and type code, e.g. `P001^^^EMR^MR`
    pub fn assigned(
        id: impl Into<String>,
        authority: impl Into<String>,
        identifier_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            assigning_authority: authority.into(),
            identifier_type: identifier_type.into(),
            ..Self::default()
        }
    }
}

impl CompositeValue for ExtendedId {
    fn decode(raw: &str, delimiters: &Delimiters) -> Self {
        let parts = split_components(raw, delimiters.component);
        Self {
            id: component(&parts, 0),
            check_digit: component(&parts, 1),
            check_digit_scheme: component(&parts, 2),
            assigning_authority: component(&parts, 3),
            identifier_type: component(&parts, 4),
        }
    }

    fn components(&self, _delimiters: &Delimiters) -> Vec<String> {
        vec![
            self.id.clone(),
            self.check_digit.clone(),
            self.check_digit_scheme.clone(),
            self.assigning_authority.clone(),
            self.identifier_type.clone(),
        ]
    }
}

/// MSG message type (MSH-9)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageTypeField {
    /// Message code, e.g. `ADT`
    pub code: String,
    /// Trigger event, e.g. `A01`
    pub trigger: String,
    /// Message structure, e.g. `ADT_A01`; usually absent
    pub structure: String,
}

impl MessageTypeField {
    pub fn new(code: impl Into<String>, trigger: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            trigger: trigger.into(),
            structure: String::new(),
        }
    }
}

impl CompositeValue for MessageTypeField {
    fn decode(raw: &str, delimiters: &Delimiters) -> Self {
        let parts = split_components(raw, delimiters.component);
        Self {
            code: component(&parts, 0),
            trigger: component(&parts, 1),
            structure: component(&parts, 2),
        }
    }

    fn components(&self, _delimiters: &Delimiters) -> Vec<String> {
        vec![
            self.code.clone(),
            self.trigger.clone(),
            self.structure.clone(),
        ]
    }
}

/// PID-24 multiple birth
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleBirth {
    pub birth_order: String,
    pub birth_indicator: String,
}

impl CompositeValue for MultipleBirth {
    fn decode(raw: &str, delimiters: &Delimiters) -> Self {
        let parts = split_components(raw, delimiters.component);
        Self {
            birth_order: component(&parts, 0),
            birth_indicator: component(&parts, 1),
        }
    }

    fn components(&self, _delimiters: &Delimiters) -> Vec<String> {
        vec![self.birth_order.clone(), self.birth_indicator.clone()]
    }
}

/// PID-27 veterans military status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilitaryStatus {
    pub status: String,
    pub rank: String,
    pub branch: String,
    pub service_date: String,
    pub discharge_date: String,
    pub discharge_status: String,
}

impl CompositeValue for MilitaryStatus {
    fn decode(raw: &str, delimiters: &Delimiters) -> Self {
        let parts = split_components(raw, delimiters.component);
        Self {
            status: component(&parts, 0),
            rank: component(&parts, 1),
            branch: component(&parts, 2),
            service_date: component(&parts, 3),
            discharge_date: component(&parts, 4),
            discharge_status: component(&parts, 5),
        }
    }

    fn components(&self, _delimiters: &Delimiters) -> Vec<String> {
        vec![
            self.status.clone(),
            self.rank.clone(),
            self.branch.clone(),
            self.service_date.clone(),
            self.discharge_date.clone(),
            self.discharge_status.clone(),
        ]
    }
}

/// A decoded composite of any supported kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Composite {
    PersonName(PersonName),
    CodedElement(CodedElement),
    TelephoneNumber(TelephoneNumber),
    ExtendedId(ExtendedId),
    MessageType(MessageTypeField),
    MultipleBirth(MultipleBirth),
    MilitaryStatus(MilitaryStatus),
}

impl Composite {
    pub fn decode(kind: CompositeKind, raw: &str, delimiters: &Delimiters) -> Self {
        match kind {
            CompositeKind::PersonName => Self::PersonName(PersonName::decode(raw, delimiters)),
            CompositeKind::CodedElement => {
                Self::CodedElement(CodedElement::decode(raw, delimiters))
            }
            CompositeKind::TelephoneNumber => {
                Self::TelephoneNumber(TelephoneNumber::decode(raw, delimiters))
            }
            CompositeKind::ExtendedId => Self::ExtendedId(ExtendedId::decode(raw, delimiters)),
            CompositeKind::MessageType => {
                Self::MessageType(MessageTypeField::decode(raw, delimiters))
            }
            CompositeKind::MultipleBirth => {
                Self::MultipleBirth(MultipleBirth::decode(raw, delimiters))
            }
            CompositeKind::MilitaryStatus => {
                Self::MilitaryStatus(MilitaryStatus::decode(raw, delimiters))
            }
        }
    }

    /// All-empty composite of the given kind
    pub fn empty(kind: CompositeKind) -> Self {
        match kind {
            CompositeKind::PersonName => Self::PersonName(PersonName::default()),
            CompositeKind::CodedElement => Self::CodedElement(CodedElement::default()),
            CompositeKind::TelephoneNumber => Self::TelephoneNumber(TelephoneNumber::default()),
            CompositeKind::ExtendedId => Self::ExtendedId(ExtendedId::default()),
            CompositeKind::MessageType => Self::MessageType(MessageTypeField::default()),
            CompositeKind::MultipleBirth => Self::MultipleBirth(MultipleBirth::default()),
            CompositeKind::MilitaryStatus => Self::MilitaryStatus(MilitaryStatus::default()),
        }
    }

    pub fn kind(&self) -> CompositeKind {
        match self {
            Self::PersonName(_) => CompositeKind::PersonName,
            Self::CodedElement(_) => CompositeKind::CodedElement,
            Self::TelephoneNumber(_) => CompositeKind::TelephoneNumber,
            Self::ExtendedId(_) => CompositeKind::ExtendedId,
            Self::MessageType(_) => CompositeKind::MessageType,
            Self::MultipleBirth(_) => CompositeKind::MultipleBirth,
            Self::MilitaryStatus(_) => CompositeKind::MilitaryStatus,
        }
    }

    pub fn encode(&self, delimiters: &Delimiters) -> String {
        match self {
            Self::PersonName(v) => v.encode(delimiters),
            Self::CodedElement(v) => v.encode(delimiters),
            Self::TelephoneNumber(v) => v.encode(delimiters),
            Self::ExtendedId(v) => v.encode(delimiters),
            Self::MessageType(v) => v.encode(delimiters),
            Self::MultipleBirth(v) => v.encode(delimiters),
            Self::MilitaryStatus(v) => v.encode(delimiters),
        }
    }
}

/// One positional field of a segment
///
/// Serializes untagged: text as a JSON string, composites as objects with
/// camelCase keys, repetitions as arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Field {
    Text(String),
    Composite(Composite),
    Repeated(Vec<Field>),
}

impl Default for Field {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl Field {
    /// Decodes raw field text according to its schema kind
    pub fn decode(raw: &str, kind: FieldKind, delimiters: &Delimiters) -> Self {
        match kind {
            FieldKind::Text => Self::Text(raw.to_string()),
            FieldKind::Composite(c) => Self::Composite(Composite::decode(c, raw, delimiters)),
            FieldKind::Repeated(c) => Self::Repeated(
                split_repetitions(raw, delimiters.repetition)
                    .into_iter()
                    .map(|rep| Self::Composite(Composite::decode(c, rep, delimiters)))
                    .collect(),
            ),
        }
    }

    /// Empty value of a schema kind, used to pad missing trailing fields
    pub fn empty(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text => Self::default(),
            FieldKind::Composite(c) => Self::Composite(Composite::empty(c)),
            FieldKind::Repeated(_) => Self::Repeated(Vec::new()),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Wire text of this field; values are written as-is, without escaping
    pub fn encode(&self, delimiters: &Delimiters) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Composite(c) => c.encode(delimiters),
            Self::Repeated(reps) => {
                let parts: Vec<String> = reps.iter().map(|r| r.encode(delimiters)).collect();
                join(&parts, delimiters.repetition)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Composite(_) | Self::Repeated(_) => self.encode(&Delimiters::default()).is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            Self::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_person_name(&self) -> Option<&PersonName> {
        match self.as_composite()? {
            Composite::PersonName(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_coded_element(&self) -> Option<&CodedElement> {
        match self.as_composite()? {
            Composite::CodedElement(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_telephone(&self) -> Option<&TelephoneNumber> {
        match self.as_composite()? {
            Composite::TelephoneNumber(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_extended_id(&self) -> Option<&ExtendedId> {
        match self.as_composite()? {
            Composite::ExtendedId(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_message_type(&self) -> Option<&MessageTypeField> {
        match self.as_composite()? {
            Composite::MessageType(v) => Some(v),
            _ => None,
        }
    }

    /// Repetitions of a repeated field; any other field is its own single repetition
    pub fn repetitions(&self) -> &[Field] {
        match self {
            Self::Repeated(reps) => reps,
            other => std::slice::from_ref(other),
        }
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Composite> for Field {
    fn from(value: Composite) -> Self {
        Self::Composite(value)
    }
}

macro_rules! composite_into_field {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Field {
                fn from(value: $ty) -> Self {
                    Self::Composite(Composite::$variant(value))
                }
            }
        )*
    };
}

composite_into_field!(
    PersonName => PersonName,
    CodedElement => CodedElement,
    TelephoneNumber => TelephoneNumber,
    ExtendedId => ExtendedId,
    MessageTypeField => MessageType,
    MultipleBirth => MultipleBirth,
    MilitaryStatus => MilitaryStatus,
);
