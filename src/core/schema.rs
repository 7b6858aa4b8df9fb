//! Static segment schema table
//!
//! Maps a segment type to the ordinal meaning and kind of each of its fields.
//! Both the segment parser (decode) and the message builder (encode) go
//! through this table, so the two cannot drift apart. Supporting another
//! segment type means adding a row here.
//!
//! Field positions follow conventional HL7 2.5 numbering: field `N` is the
//! `N`-th value after the segment name, and for MSH field 1 is the field
//! separator itself.

/// Composite data types decoded by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    /// XPN: family ^ given (sub-components) ^ middle ^ prefix ^ suffix ^ degree
    PersonName,
    /// CE: identifier ^ text ^ coding system ^ alt identifier ^ alt text ^ alt coding system
    CodedElement,
    /// XTN: number ^ use ^ equipment ^ country ^ area ^ local ^ extension
    TelephoneNumber,
    /// CX: id ^ check digit ^ check digit scheme ^ assigning authority ^ identifier type
    ExtendedId,
    /// MSG: message code ^ trigger event
    MessageType,
    /// Multiple birth indicator ^ birth order
    MultipleBirth,
    /// Status ^ rank ^ branch ^ service date ^ discharge date ^ discharge status
    MilitaryStatus,
}

/// How a field's raw text is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Raw string, never split
    Text,
    /// Single composite value split on the component delimiter
    Composite(CompositeKind),
    /// Composite values split on the repetition delimiter first
    Repeated(CompositeKind),
}

/// One field descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// 1-based field position
    pub index: usize,
    /// Conventional field name
    pub name: &'static str,
    /// Decoding rule
    pub kind: FieldKind,
}

/// Field layout of one known segment type
#[derive(Debug)]
pub struct SegmentSchema {
    /// 3-character segment type
    pub segment: &'static str,
    /// Whether a message keeps every occurrence of this segment in order
    pub repeatable: bool,
    /// Field descriptors, contiguous from index 1
    pub fields: &'static [FieldSpec],
}

impl SegmentSchema {
    /// Number of fields a parsed segment of this type always exposes
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Descriptor for a 1-based field index
    pub fn field(&self, index: usize) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.index == index)
    }

    /// Decoding rule for a 1-based field index; fields past the schema are text
    pub fn kind_of(&self, index: usize) -> FieldKind {
        self.field(index).map_or(FieldKind::Text, |f| f.kind)
    }
}

const fn text(index: usize, name: &'static str) -> FieldSpec {
    FieldSpec {
        index,
        name,
        kind: FieldKind::Text,
    }
}

const fn composite(index: usize, name: &'static str, kind: CompositeKind) -> FieldSpec {
    FieldSpec {
        index,
        name,
        kind: FieldKind::Composite(kind),
    }
}

const fn repeated(index: usize, name: &'static str, kind: CompositeKind) -> FieldSpec {
    FieldSpec {
        index,
        name,
        kind: FieldKind::Repeated(kind),
    }
}

static MSH_FIELDS: [FieldSpec; 12] = [
    text(1, "field_separator"),
    text(2, "encoding_characters"),
    text(3, "sending_application"),
    text(4, "sending_facility"),
    text(5, "receiving_application"),
    text(6, "receiving_facility"),
    text(7, "date_time_of_message"),
    text(8, "security"),
    composite(9, "message_type", CompositeKind::MessageType),
    text(10, "message_control_id"),
    text(11, "processing_id"),
    text(12, "version_id"),
];

static EVN_FIELDS: [FieldSpec; 6] = [
    text(1, "event_type_code"),
    text(2, "recorded_date_time"),
    text(3, "date_time_planned_event"),
    text(4, "event_reason_code"),
    text(5, "operator_id"),
    text(6, "event_occurred"),
];

static PID_FIELDS: [FieldSpec; 30] = [
    text(1, "set_id"),
    text(2, "patient_id"),
    repeated(3, "patient_identifier_list", CompositeKind::ExtendedId),
    text(4, "alternate_patient_id"),
    composite(5, "patient_name", CompositeKind::PersonName),
    text(6, "mothers_maiden_name"),
    text(7, "date_time_of_birth"),
    text(8, "administrative_sex"),
    text(9, "patient_alias"),
    text(10, "race"),
    text(11, "patient_address"),
    text(12, "county_code"),
    repeated(13, "phone_number_home", CompositeKind::TelephoneNumber),
    text(14, "phone_number_business"),
    text(15, "primary_language"),
    text(16, "marital_status"),
    text(17, "religion"),
    composite(18, "patient_account_number", CompositeKind::ExtendedId),
    text(19, "ssn_number"),
    text(20, "drivers_license_number"),
    composite(21, "mothers_identifier", CompositeKind::ExtendedId),
    composite(22, "ethnic_group", CompositeKind::CodedElement),
    text(23, "birth_place"),
    composite(24, "multiple_birth", CompositeKind::MultipleBirth),
    text(25, "birth_order"),
    text(26, "citizenship"),
    composite(27, "veterans_military_status", CompositeKind::MilitaryStatus),
    composite(28, "nationality", CompositeKind::CodedElement),
    text(29, "patient_death_date_time"),
    text(30, "patient_death_indicator"),
];

static PV1_FIELDS: [FieldSpec; 20] = [
    text(1, "set_id"),
    text(2, "patient_class"),
    text(3, "assigned_patient_location"),
    text(4, "admission_type"),
    text(5, "preadmit_number"),
    text(6, "prior_patient_location"),
    text(7, "attending_doctor"),
    text(8, "referring_doctor"),
    text(9, "consulting_doctor"),
    text(10, "hospital_service"),
    text(11, "temporary_location"),
    text(12, "preadmit_test_indicator"),
    text(13, "readmission_indicator"),
    text(14, "admit_source"),
    text(15, "ambulatory_status"),
    text(16, "vip_indicator"),
    text(17, "admitting_doctor"),
    text(18, "patient_type"),
    text(19, "visit_number"),
    text(20, "financial_class"),
];

static ORC_FIELDS: [FieldSpec; 12] = [
    text(1, "order_control"),
    text(2, "placer_order_number"),
    text(3, "filler_order_number"),
    text(4, "placer_group_number"),
    text(5, "order_status"),
    text(6, "response_flag"),
    text(7, "quantity_timing"),
    text(8, "parent"),
    text(9, "date_time_of_transaction"),
    text(10, "entered_by"),
    text(11, "verified_by"),
    text(12, "ordering_provider"),
];

static OBR_FIELDS: [FieldSpec; 25] = [
    text(1, "set_id"),
    text(2, "placer_order_number"),
    text(3, "filler_order_number"),
    composite(4, "universal_service_identifier", CompositeKind::CodedElement),
    text(5, "priority"),
    text(6, "requested_date_time"),
    text(7, "observation_date_time"),
    text(8, "observation_end_date_time"),
    text(9, "collection_volume"),
    text(10, "collector_identifier"),
    text(11, "specimen_action_code"),
    text(12, "danger_code"),
    text(13, "relevant_clinical_information"),
    text(14, "specimen_received_date_time"),
    text(15, "specimen_source"),
    text(16, "ordering_provider"),
    text(17, "order_callback_phone_number"),
    text(18, "placer_field_1"),
    text(19, "placer_field_2"),
    text(20, "filler_field_1"),
    text(21, "filler_field_2"),
    text(22, "results_rpt_status_chng_date_time"),
    text(23, "charge_to_practice"),
    text(24, "diagnostic_serv_sect_id"),
    text(25, "result_status"),
];

static OBX_FIELDS: [FieldSpec; 16] = [
    text(1, "set_id"),
    text(2, "value_type"),
    composite(3, "observation_identifier", CompositeKind::CodedElement),
    text(4, "observation_sub_id"),
    text(5, "observation_value"),
    text(6, "units"),
    text(7, "references_range"),
    text(8, "abnormal_flags"),
    text(9, "probability"),
    text(10, "nature_of_abnormal_test"),
    text(11, "observation_result_status"),
    text(12, "effective_date_of_reference_range"),
    text(13, "user_defined_access_checks"),
    text(14, "date_time_of_the_observation"),
    text(15, "producers_id"),
    text(16, "responsible_observer"),
];

static MSA_FIELDS: [FieldSpec; 3] = [
    text(1, "acknowledgment_code"),
    text(2, "message_control_id"),
    text(3, "text_message"),
];

static SCHEMAS: [SegmentSchema; 8] = [
    SegmentSchema {
        segment: "MSH",
        repeatable: false,
        fields: &MSH_FIELDS,
    },
    SegmentSchema {
        segment: "EVN",
        repeatable: false,
        fields: &EVN_FIELDS,
    },
    SegmentSchema {
        segment: "PID",
        repeatable: false,
        fields: &PID_FIELDS,
    },
    SegmentSchema {
        segment: "PV1",
        repeatable: false,
        fields: &PV1_FIELDS,
    },
    SegmentSchema {
        segment: "ORC",
        repeatable: false,
        fields: &ORC_FIELDS,
    },
    SegmentSchema {
        segment: "OBR",
        repeatable: false,
        fields: &OBR_FIELDS,
    },
    SegmentSchema {
        segment: "OBX",
        repeatable: true,
        fields: &OBX_FIELDS,
    },
    SegmentSchema {
        segment: "MSA",
        repeatable: false,
        fields: &MSA_FIELDS,
    },
];

/// Looks up the schema of a known segment type
pub fn schema_for(segment: &str) -> Option<&'static SegmentSchema> {
    SCHEMAS.iter().find(|s| s.segment == segment)
}

/// All known segment schemas
pub fn known_schemas() -> &'static [SegmentSchema] {
    &SCHEMAS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_indexes_are_contiguous() {
        for schema in known_schemas() {
            for (position, field) in schema.fields.iter().enumerate() {
                assert_eq!(
                    field.index,
                    position + 1,
                    "{} field {} out of order",
                    schema.segment,
                    field.name
                );
            }
        }
    }

    #[test]
    fn test_conventional_composite_positions() {
        let pid = schema_for("PID").unwrap();
        assert_eq!(
            pid.kind_of(5),
            FieldKind::Composite(CompositeKind::PersonName)
        );
        assert_eq!(
            pid.kind_of(13),
            FieldKind::Repeated(CompositeKind::TelephoneNumber)
        );

        let obx = schema_for("OBX").unwrap();
        assert_eq!(
            obx.kind_of(3),
            FieldKind::Composite(CompositeKind::CodedElement)
        );

        let msh = schema_for("MSH").unwrap();
        assert_eq!(
            msh.kind_of(9),
            FieldKind::Composite(CompositeKind::MessageType)
        );
    }

    #[test]
    fn test_only_obx_is_repeatable() {
        let repeatable: Vec<_> = known_schemas()
            .iter()
            .filter(|s| s.repeatable)
            .map(|s| s.segment)
            .collect();
        assert_eq!(repeatable, vec!["OBX"]);
    }

    #[test]
    fn test_unknown_segment_has_no_schema() {
        assert!(schema_for("ZPI").is_none());
        assert!(schema_for("pid").is_none());
    }

    #[test]
    fn test_fields_past_schema_are_text() {
        let msa = schema_for("MSA").unwrap();
        assert_eq!(msa.field_count(), 3);
        assert_eq!(msa.kind_of(7), FieldKind::Text);
    }
}
