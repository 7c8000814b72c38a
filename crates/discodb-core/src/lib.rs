//! Core runtime for DiscoDB: record traits, the value binder, statement and
//! schema builders, the label index, and the table gateway over SQLite.

extern crate self as discodb;

// public exports are one module level down
pub mod bind;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod obs;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

// re-exports
pub use error::{Error, ErrorClass};

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, statement builders, or metrics are re-exported here.
///

pub mod prelude {
    pub use crate::{
        config::StoreConfig,
        db::{ListOptions, Store, Table},
        model::{FieldSet, Labels, Record},
    };
}
