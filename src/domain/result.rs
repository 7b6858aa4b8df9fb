//! Result type alias for the HL7 engine

use super::errors::Hl7Error;

/// Result type alias for engine operations
///
/// # Examples
///
/// ```
/// use emr_hl7::domain::result::Result;
/// use emr_hl7::domain::errors::Hl7Error;
///
/// fn example_function() -> Result<String> {
///     Ok("MSH".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(Hl7Error::Parse("missing MSH".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Hl7Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(Hl7Error::Build("no segments".to_string()));
        assert!(result.is_err());
    }
}
