//! Result type alias for Bindery

use super::errors::BinderyError;

/// Result type alias for Bindery operations
///
/// # Examples
///
/// ```
/// use bindery::domain::result::Result;
/// use bindery::domain::errors::BinderyError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(BinderyError::Configuration("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, BinderyError>;
