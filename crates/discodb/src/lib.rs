//! ## Crate layout
//! - `core`: record traits, binder, statement/schema builders, label index,
//!   table gateway and observability.
//! - `derive`: `#[derive(Record)]` and `#[derive(Fields)]`.
//! - `schema`: tag grammar and identifier rules.
//!
//! The runtime modules are re-exported at the crate root so code generated
//! by the derives resolves against `::discodb::{bind, model}`.

pub use discodb_core as core;
pub use discodb_derive as derive;
pub use discodb_schema as schema;

pub use discodb_core::{Error, ErrorClass, bind, config, db, error, model, obs};
pub use discodb_derive::{Fields, Record};

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// Derives and traits share names; both come into scope together.
///

pub mod prelude {
    pub use crate::core::prelude::*;
    pub use discodb_derive::{Fields, Record};
}
