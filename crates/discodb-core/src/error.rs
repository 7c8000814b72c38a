use crate::{bind::BindError, config::ConfigError, model::ValidationError};
use rusqlite::ErrorCode;
use std::fmt::{self, Display};
use thiserror::Error as ThisError;

///
/// ErrorClass
///
/// Stable classification used by callers to decide between retry,
/// report, and treat-as-absent.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorClass {
    Bind,
    Config,
    Conflict,
    Engine,
    InvalidModel,
    NotFound,
    Validation,
}

impl Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Bind => "bind",
            Self::Config => "config",
            Self::Conflict => "conflict",
            Self::Engine => "engine",
            Self::InvalidModel => "invalid_model",
            Self::NotFound => "not_found",
            Self::Validation => "validation",
        };

        f.write_str(label)
    }
}

///
/// Error
///
/// Structural errors (`InvalidModel`, `Validation`) are raised before any
/// statement executes. `ConstraintViolation` surfaces only when an INSERT
/// collides and no row of the same identity exists to update (a unique
/// group owned by another row, or a missing foreign key parent). Engine
/// failures are passed through unchanged.
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("constraint violation on '{table}': {source}")]
    ConstraintViolation {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error(transparent)]
    Engine(#[from] rusqlite::Error),

    #[error("invalid model '{type_name}': {reason}")]
    InvalidModel {
        type_name: &'static str,
        reason: String,
    },

    #[error("{table} not found")]
    NotFound { table: &'static str },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Split constraint violations out of generic engine failures.
    pub(crate) fn classify(table: &'static str, err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref inner, _)
                if inner.code == ErrorCode::ConstraintViolation =>
            {
                Self::ConstraintViolation { table, source: err }
            }
            other => Self::Engine(other),
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Bind(_) => ErrorClass::Bind,
            Self::Config(_) => ErrorClass::Config,
            Self::ConstraintViolation { .. } => ErrorClass::Conflict,
            Self::Engine(_) => ErrorClass::Engine,
            Self::InvalidModel { .. } => ErrorClass::InvalidModel,
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::Validation(_) => ErrorClass::Validation,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}: {self}", self.class())
    }
}

///
/// TESTS
///
