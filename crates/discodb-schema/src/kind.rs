use std::fmt::{self, Display};

///
/// FieldKind
///
/// Storage shape of one column. Only text and integer columns are mapped;
/// anything else is carried as `Unsupported` so validation can name it.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FieldKind {
    Int,
    Text,
    Unsupported { type_name: &'static str },
}

impl FieldKind {
    #[must_use]
    pub const fn is_supported(self) -> bool {
        !matches!(self, Self::Unsupported { .. })
    }

    /// SQLite column type, if the kind maps to one.
    #[must_use]
    pub const fn sql_type(self) -> Option<&'static str> {
        match self {
            Self::Int => Some("INTEGER"),
            Self::Text => Some("TEXT"),
            Self::Unsupported { .. } => None,
        }
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Text => f.write_str("text"),
            Self::Unsupported { type_name } => write!(f, "unsupported({type_name})"),
        }
    }
}
