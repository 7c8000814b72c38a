//! Record traits and the field descriptors derived from them.
//!
//! A record type describes itself once through [`FieldSet::columns`]; the
//! runtime turns those column definitions into [`FieldDescriptor`]s with
//! parsed relational tags and caches the resulting [`TableSchema`] per type.

mod field;
mod labels;
mod schema;

#[cfg(test)]
mod tests;

use crate::bind::{BindError, Cell, CellIter};
use discodb_schema::{IdentError, TagError};
use thiserror::Error as ThisError;

// re-exports
pub use discodb_schema::{FieldKind, FieldTags, ForeignKey};
pub use field::{ColumnDef, FieldDescriptor};
pub use labels::Labels;
pub use schema::{Group, TableSchema};

///
/// FieldSet
///
/// Ordered column access for a struct. Embedded field sets are flattened
/// into the parent at their declaration position, so `columns`, `pull` and
/// `push` must all walk fields in the same order.
///

pub trait FieldSet {
    /// Append column definitions in declaration order.
    fn columns(columns: &mut Vec<ColumnDef>);

    /// Stage the current value of every column.
    fn pull(&self, cells: &mut Vec<Cell>) -> Result<(), BindError>;

    /// Assign staged values back, consuming one cell per column.
    fn push(&mut self, cells: &mut CellIter) -> Result<(), BindError>;
}

///
/// Record
///
/// A field set stored in its own table.
///

pub trait Record: FieldSet + Default + 'static {
    const TABLE: &'static str;

    /// Labels indexed for this record; empty unless the type declares them.
    fn labels(&self) -> Labels {
        Labels::default()
    }
}

///
/// ValidationError
///
/// Raised while checking descriptors or building a statement, always before
/// anything reaches the store.
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ValidationError {
    #[error("table '{table}' declares column '{column}' more than once")]
    DuplicateColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("table '{table}': invalid identifier '{name}': {source}")]
    Ident {
        table: &'static str,
        name: String,
        #[source]
        source: IdentError,
    },

    #[error("table '{table}' has no primary or natural key, required by {operation}")]
    MissingKey {
        table: &'static str,
        operation: &'static str,
    },

    #[error("table '{table}' declares more than one primary key ('{first}', '{second}')")]
    MultiplePrimaryKeys {
        table: &'static str,
        first: &'static str,
        second: &'static str,
    },

    #[error("table '{table}' has no mutable columns to update")]
    NothingToUpdate { table: &'static str },

    #[error("table '{table}': page limit {limit} offset {offset} exceeds {max}", max = i64::MAX)]
    PageOutOfRange {
        table: &'static str,
        limit: u64,
        offset: u64,
    },

    #[error("table '{table}': name '{name}' is reserved")]
    ReservedName { table: &'static str, name: String },

    #[error("table '{table}': sort position {position} outside 1..={fields}")]
    SortPosition {
        table: &'static str,
        position: usize,
        fields: usize,
    },

    #[error("table '{table}', field '{field}': {source}")]
    Tag {
        table: &'static str,
        field: &'static str,
        #[source]
        source: TagError,
    },

    #[error("table '{table}', field '{field}': kind {kind} must be one of (text, int)")]
    UnsupportedKind {
        table: &'static str,
        field: &'static str,
        kind: FieldKind,
    },
}
