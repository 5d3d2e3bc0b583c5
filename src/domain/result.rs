//! Result type alias for Ferry

use super::errors::FerryError;

/// Result type alias for Ferry operations
///
/// # Examples
///
/// ```
/// use ferry::domain::result::Result;
/// use ferry::domain::errors::FerryError;
///
/// fn failing_function() -> Result<()> {
///     Err(FerryError::Configuration("chunk_size must be positive".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, FerryError>;
