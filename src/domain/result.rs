//! Result type alias for Porter
//!
//! This module provides a convenient Result type alias that uses PorterError
//! as the error type.

use super::errors::PorterError;

/// Result type alias for Porter operations
///
/// This is a convenience type alias that uses `PorterError` as the error type.
/// Use this throughout the codebase for fallible operations.
///
/// # Examples
///
/// ```
/// use porter::domain::result::Result;
/// use porter::domain::errors::PorterError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(PorterError::Transform("unknown column".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, PorterError>;
