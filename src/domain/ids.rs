//! Domain identifier types with validation
//!
//! Newtype wrappers for the two identifiers the engine relies on: the
//! 3-character segment type and the opaque message control ID (MSH-10).

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const CONTROL_ID_SUFFIX_LEN: usize = 11;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Segment type newtype wrapper
///
/// Validated types are three ASCII alphanumeric characters (`MSH`, `PID`,
/// `ZPI`...). Segments read off the wire with no schema keep their first three
/// characters as an opaque key, whatever they are.
///
/// # Examples
///
/// ```
/// use emr_hl7::domain::ids::SegmentType;
/// use std::str::FromStr;
///
/// let pid = SegmentType::from_str("PID").unwrap();
/// assert_eq!(pid.field_key(5), "pid_5");
/// assert!(SegmentType::from_str("PI").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentType(String);

impl SegmentType {
    /// Creates a new SegmentType, rejecting anything but three ASCII alphanumerics
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.len() != 3 || !id.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(format!(
                "Segment type must be 3 ASCII alphanumeric characters, got: '{id}'"
            ));
        }
        Ok(Self(id))
    }

    /// Wraps the literal name of a segment the engine itself emits
    pub(crate) fn from_static(id: &'static str) -> Self {
        debug_assert!(Self::new(id).is_ok(), "invalid segment type literal '{id}'");
        Self(id.to_string())
    }

    /// Wraps the type code of an unrecognized segment without validating it
    pub(crate) fn opaque(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Returns the segment type as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of the 1-based field `index` in this segment, e.g. `pid_5`
    pub fn field_key(&self, index: usize) -> String {
        format!("{}_{}", self.0.to_ascii_lowercase(), index)
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SegmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for SegmentType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SegmentType {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SegmentType {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Message control ID (MSH-10)
///
/// Opaque on the inbound side: whatever the sender put in MSH-10 is echoed
/// verbatim in the acknowledgement. Outbound IDs are generated per message as
/// epoch milliseconds followed by a random base-36 suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlId(String);

impl ControlId {
    /// Wraps an existing control ID without interpretation
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh control ID for a message sent at `now`
    pub fn generate(now: DateTime<Utc>) -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..CONTROL_ID_SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        Self(format!("{}{}", now.timestamp_millis(), suffix))
    }

    /// Returns the control ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ControlId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
