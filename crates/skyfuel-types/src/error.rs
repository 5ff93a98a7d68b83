//! Error types for battery data validation and parsing.

use thiserror::Error;

/// Errors that can occur when validating or parsing battery data.
///
/// This error type is platform-agnostic and does not include
/// storage-specific errors (those belong in skyfuel-store).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A field failed validation.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// A required field was not provided.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Result type alias using skyfuel-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
