use quack_types::TypeError;
use thiserror::Error;

/// Errors from encoding or decoding a record line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// A required field or separator is absent.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field is present but its value does not parse.
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// A value cannot be encoded without breaking the line format.
    #[error("{field} contains forbidden character {ch:?}")]
    ForbiddenCharacter { field: &'static str, ch: char },

    /// A username field failed validation.
    #[error(transparent)]
    Username(#[from] TypeError),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
