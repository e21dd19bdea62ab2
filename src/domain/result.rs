//! Result type alias for the harness

use super::errors::HarnessError;

/// Result type alias using `HarnessError` as the error type.
///
/// # Examples
///
/// ```
/// use cosmos_harness::domain::result::Result;
/// use cosmos_harness::domain::errors::HarnessError;
///
/// fn failing_function() -> Result<()> {
///     Err(HarnessError::Validation("Invalid input".to_string()))
/// }
/// assert!(failing_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, HarnessError>;

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
}
