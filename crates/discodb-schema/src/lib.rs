//! Field tag grammar and identifier rules shared by the `Record` derive and
//! the runtime descriptor layer.
//!
//! Nothing in here touches storage; the same parser runs at compile time
//! (inside the derive) and at registration time (inside `discodb-core`).

pub mod ident;
pub mod kind;
pub mod tag;

pub use ident::IdentError;
pub use kind::FieldKind;
pub use tag::{FieldTags, ForeignKey, TagError};

/// Maximum length for table, column and group identifiers.
pub const MAX_IDENT_LEN: usize = 64;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{FieldKind, FieldTags, ForeignKey, IdentError, TagError};
}
