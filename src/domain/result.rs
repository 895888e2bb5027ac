//! Result type alias for the de-identifier

use super::errors::DeidError;

/// Result type alias using [`DeidError`] as the error type
///
/// # Examples
///
/// ```
/// use dicom_deid::domain::result::Result;
/// use dicom_deid::domain::errors::DeidError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(DeidError::Policy("unknown action".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, DeidError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::DeidError;

    #[test]
    fn test_result_ok() {
        let result: Result<i32> = Ok(42);
        assert!(result.is_ok());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Err(DeidError::Other("boom".to_string()))
        }

        assert!(inner().is_err());
        Ok(())
    }
}
