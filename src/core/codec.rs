//! Delimiter codec
//!
//! Low-level split/join of segment lines using the structural delimiters
//! declared in MSH-1 and MSH-2. Empty pieces are always preserved so that
//! positions never shift.
//!
//! Escape sequences (`\F\`, `\S\`, ...) are passed through unresolved when
//! parsing. [`escape_text`] exists for engine-generated free text only; caller
//! supplied values are never escaped.

use serde::{Deserialize, Serialize};

/// The five structural delimiters of an HL7 v2 message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
    pub field: char,
    pub component: char,
    pub repetition: char,
    pub escape: char,
    pub subcomponent: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            field: '|',
            component: '^',
            repetition: '~',
            escape: '\\',
            subcomponent: '&',
        }
    }
}

impl Delimiters {
    /// Reads the delimiters declared by an MSH line
    ///
    /// The character right after `MSH` is the field separator; the following
    /// run up to the next field separator holds, in order, the component,
    /// repetition, escape and sub-component characters. Missing encoding
    /// characters fall back to their defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use emr_hl7::core::codec::Delimiters;
    ///
    /// let delims = Delimiters::from_msh("MSH#$*/@#EMR").unwrap();
    /// assert_eq!(delims.field, '#');
    /// assert_eq!(delims.component, '$');
    /// assert_eq!(delims.subcomponent, '@');
    /// ```
    pub fn from_msh(line: &str) -> Result<Self, String> {
        let rest = line
            .strip_prefix("MSH")
            .ok_or_else(|| "MSH segment must start with 'MSH'".to_string())?;

        let mut chars = rest.chars();
        let field = chars
            .next()
            .ok_or_else(|| "MSH segment has no field separator".to_string())?;

        let defaults = Self::default();
        let encoding: Vec<char> = chars.take_while(|c| *c != field).take(4).collect();

        Ok(Self {
            field,
            component: encoding.first().copied().unwrap_or(defaults.component),
            repetition: encoding.get(1).copied().unwrap_or(defaults.repetition),
            escape: encoding.get(2).copied().unwrap_or(defaults.escape),
            subcomponent: encoding.get(3).copied().unwrap_or(defaults.subcomponent),
        })
    }

    /// The MSH-2 encoding characters string, conventionally `^~\&`
    pub fn encoding_characters(&self) -> String {
        [self.component, self.repetition, self.escape, self.subcomponent]
            .iter()
            .collect()
    }
}

/// Splits a segment line (or its body) into raw fields
pub fn split_fields(line: &str, field: char) -> Vec<&str> {
    line.split(field).collect()
}

/// Splits a field into its components
pub fn split_components(value: &str, component: char) -> Vec<&str> {
    value.split(component).collect()
}

/// Splits a field into repetitions; an empty field has no repetitions
pub fn split_repetitions(value: &str, repetition: char) -> Vec<&str> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(repetition).collect()
}

/// Splits a component into sub-components; an empty component has none
pub fn split_subcomponents(value: &str, subcomponent: char) -> Vec<&str> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(subcomponent).collect()
}

/// Joins pieces with a delimiter, keeping empty pieces
pub fn join<S: AsRef<str>>(parts: &[S], delimiter: char) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        out.push_str(part.as_ref());
    }
    out
}

/// Joins components, dropping trailing empty ones
pub fn join_trimmed<S: AsRef<str>>(parts: &[S], delimiter: char) -> String {
    let len = parts
        .iter()
        .rposition(|p| !p.as_ref().is_empty())
        .map_or(0, |i| i + 1);
    join(&parts[..len], delimiter)
}

/// Encodes delimiter characters in free text as HL7 escape sequences
///
/// # Examples
///
/// ```
/// use emr_hl7::core::codec::{escape_text, Delimiters};
///
/// let escaped = escape_text("a|b^c", &Delimiters::default());
/// assert_eq!(escaped, r"a\F\b\S\c");
/// ```
pub fn escape_text(text: &str, delimiters: &Delimiters) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let code = if c == delimiters.escape {
            Some('E')
        } else if c == delimiters.field {
            Some('F')
        } else if c == delimiters.component {
            Some('S')
        } else if c == delimiters.repetition {
            Some('R')
        } else if c == delimiters.subcomponent {
            Some('T')
        } else {
            None
        };
        match code {
            Some(code) => {
                out.push(delimiters.escape);
                out.push(code);
                out.push(delimiters.escape);
            }
            // Segment terminators would split the message
            None if c == '\r' || c == '\n' => out.push(' '),
            None => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delimiters() {
        let d = Delimiters::default();
        assert_eq!(d.encoding_characters(), r"^~\&");
        assert_eq!(d.field, '|');
    }

    #[test]
    fn test_from_msh_standard() {
        let d = Delimiters::from_msh(r"MSH|^~\&|EMR|HOSPITAL").unwrap();
        assert_eq!(d, Delimiters::default());
    }

    #[test]
    fn test_from_msh_partial_encoding_characters() {
        let d = Delimiters::from_msh("MSH|^~|EMR").unwrap();
        assert_eq!(d.component, '^');
        assert_eq!(d.repetition, '~');
        assert_eq!(d.escape, '\\');
        assert_eq!(d.subcomponent, '&');
    }

    #[test]
    fn test_from_msh_rejects_other_segments() {
        assert!(Delimiters::from_msh("PID|1").is_err());
        assert!(Delimiters::from_msh("MSH").is_err());
    }

    #[test]
    fn test_split_fields_keeps_empty_positions() {
        assert_eq!(split_fields("a||c|", '|'), vec!["a", "", "c", ""]);
    }

    #[test]
    fn test_split_components() {
        assert_eq!(split_components("Zhang^San^^", '^'), vec!["Zhang", "San", "", ""]);
        assert_eq!(split_components("", '^'), vec![""]);
    }

    #[test]
    fn test_split_repetitions() {
        assert_eq!(split_repetitions("a~~b", '~'), vec!["a", "", "b"]);
        assert!(split_repetitions("", '~').is_empty());
    }

    #[test]
    fn test_split_subcomponents() {
        assert_eq!(split_subcomponents("San&Feng", '&'), vec!["San", "Feng"]);
        assert!(split_subcomponents("", '&').is_empty());
    }

    #[test]
    fn test_escape_is_passed_through_on_split() {
        assert_eq!(split_fields(r"a\F\b|c", '|'), vec![r"a\F\b", "c"]);
    }

    #[test]
    fn test_join_and_join_trimmed() {
        assert_eq!(join(&["a", "", "c"], '^'), "a^^c");
        assert_eq!(join_trimmed(&["a", "", "c", "", ""], '^'), "a^^c");
        assert_eq!(join_trimmed(&["", ""], '^'), "");
    }

    #[test]
    fn test_escape_text_all_delimiters() {
        let escaped = escape_text(r"|^~\&", &Delimiters::default());
        assert_eq!(escaped, r"\F\\S\\R\\E\\T\");
    }

    #[test]
    fn test_escape_text_replaces_line_breaks() {
        assert_eq!(escape_text("a\r\nb", &Delimiters::default()), "a  b");
    }
}
