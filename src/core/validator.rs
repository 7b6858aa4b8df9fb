//! Structural pre-check of raw HL7 text
//!
//! Runs before the parser and never panics; a `false` result is the caller's
//! signal not to parse or dispatch.

use thiserror::Error;

/// Minimum number of MSH fields (MSH-1 through MSH-12)
pub const MIN_MSH_FIELDS: usize = 12;

/// Why a message failed the structural pre-check
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("message is empty")]
    Empty,

    #[error("first segment is not MSH")]
    MissingMsh,

    #[error("MSH has {found} fields, at least 12 are required")]
    TooFewMshFields { found: usize },

    #[error("MSH-9 message type is empty")]
    MissingMessageType,

    #[error("segment line {line} is shorter than 3 characters")]
    SegmentTooShort { line: usize },
}

/// Returns `true` when the raw text passes every structural rule
///
/// # Examples
///
/// ```
/// use emr_hl7::core::validator::validate;
///
/// assert!(!validate(""));
/// assert!(!validate("PID|1||P001"));
/// assert!(validate("MSH|^~\\&|HIS|HOSP|EMR|EMR|20240101||ADT^A01|1|P|2.5"));
/// ```
pub fn validate(raw: &str) -> bool {
    validate_detailed(raw).is_ok()
}

/// Checks the raw text and reports the first rule that failed
pub fn validate_detailed(raw: &str) -> Result<(), ValidationIssue> {
    let lines: Vec<&str> = raw
        .split(|c| c == '\r' || c == '\n')
        .filter(|line| !line.trim().is_empty())
        .collect();

    let first = lines.first().ok_or(ValidationIssue::Empty)?;
    let rest = first.strip_prefix("MSH").ok_or(ValidationIssue::MissingMsh)?;

    // MSH-1 is the separator itself, so the pieces after it start at MSH-2
    let mut chars = rest.chars();
    let separator = chars.next().ok_or(ValidationIssue::TooFewMshFields { found: 0 })?;
    let pieces: Vec<&str> = chars.as_str().split(separator).collect();
    let found = pieces.len() + 1;
    if found < MIN_MSH_FIELDS {
        return Err(ValidationIssue::TooFewMshFields { found });
    }

    // pieces[0] is MSH-2, so MSH-9 sits at pieces[7]
    if pieces.get(7).map_or(true, |t| t.trim().is_empty()) {
        return Err(ValidationIssue::MissingMessageType);
    }

    if let Some(position) = lines.iter().position(|line| line.chars().count() < 3) {
        return Err(ValidationIssue::SegmentTooShort { line: position + 1 });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const VALID: &str = "MSH|^~\\&|HIS|HOSP|EMR|EMR|20240101120000||ADT^A01|MSG1|P|2.5\rPID|1||P001\r";

    #[test_case("" ; "empty input")]
    #[test_case("\r\n  \r" ; "only blank lines")]
    fn test_rejects_empty(raw: &str) {
        assert!(!validate(raw));
        assert_eq!(validate_detailed(raw), Err(ValidationIssue::Empty));
    }

    #[test_case("PID|1||P001" ; "pid first")]
    #[test_case("EVN|A01\rMSH|^~\\&|A|B|C|D|1||ADT^A01|X|P|2.5" ; "msh not first")]
    #[test_case("msh|^~\\&|A|B|C|D|1||ADT^A01|X|P|2.5" ; "lowercase msh")]
    fn test_rejects_non_msh_first_line(raw: &str) {
        assert_eq!(validate_detailed(raw), Err(ValidationIssue::MissingMsh));
    }

    #[test_case("MSH" , 0 ; "bare msh")]
    #[test_case("MSH|^~\\&|HIS|HOSP" , 4 ; "truncated header")]
    #[test_case("MSH|^~\\&|A|B|C|D|1||ADT^A01|X|P" , 11 ; "missing version")]
    fn test_rejects_short_msh(raw: &str, found: usize) {
        assert!(!validate(raw));
        assert_eq!(
            validate_detailed(raw),
            Err(ValidationIssue::TooFewMshFields { found })
        );
    }

    #[test]
    fn test_rejects_empty_message_type() {
        let raw = "MSH|^~\\&|HIS|HOSP|EMR|EMR|20240101||||P|2.5";
        assert_eq!(
            validate_detailed(raw),
            Err(ValidationIssue::MissingMessageType)
        );
    }

    #[test]
    fn test_rejects_short_segment_line() {
        let raw = format!("{VALID}PV\r");
        assert_eq!(
            validate_detailed(&raw),
            Err(ValidationIssue::SegmentTooShort { line: 3 })
        );
    }

    #[test_case(VALID ; "cr terminated")]
    #[test_case("MSH|^~\\&|HIS|HOSP|EMR|EMR|20240101||ORU^R01|1|P|2.5\r\nOBX|1|ST\r\n" ; "crlf")]
    #[test_case("MSH|^~\\&|HIS|HOSP|EMR|EMR|20240101||ORM^O01|1|P|2.5|||AL" ; "extra msh fields")]
    fn test_accepts_valid(raw: &str) {
        assert!(validate(raw));
    }

    #[test]
    fn test_issue_messages() {
        assert_eq!(
            ValidationIssue::TooFewMshFields { found: 4 }.to_string(),
            "MSH has 4 fields, at least 12 are required"
        );
    }
}
