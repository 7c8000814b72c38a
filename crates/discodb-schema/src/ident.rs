use crate::MAX_IDENT_LEN;
use thiserror::Error as ThisError;

///
/// IdentError
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum IdentError {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier '{0}' contains characters outside [A-Za-z0-9_]")]
    InvalidChars(String),

    #[error("identifier '{0}' must not start with a digit")]
    LeadingDigit(String),

    #[error("identifier '{0}' exceeds max length {MAX_IDENT_LEN}")]
    TooLong(String),
}

/// Check that `s` is safe to use as a table, column, index or group name.
pub fn validate(s: &str) -> Result<(), IdentError> {
    let Some(first) = s.chars().next() else {
        return Err(IdentError::Empty);
    };

    if s.len() > MAX_IDENT_LEN {
        return Err(IdentError::TooLong(s.to_string()));
    }
    if first.is_ascii_digit() {
        return Err(IdentError::LeadingDigit(s.to_string()));
    }
    if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(IdentError::InvalidChars(s.to_string()));
    }

    Ok(())
}

/// Column names with a leading underscore collide with internal parameters.
#[must_use]
pub fn is_reserved(s: &str) -> bool {
    s.starts_with('_')
}

///
/// TESTS
///
