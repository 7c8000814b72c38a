//! Value binder.
//!
//! Record fields are reached through staging cells in three steps:
//! `pull` copies a record's values into cells (used as bind parameters),
//! `scan` uses blank cells as the targets of a fetched row, and `push`
//! copies scanned cells back into a record once the whole row has been read.

mod value;

#[cfg(test)]
mod tests;

use crate::model::{FieldKind, FieldSet, TableSchema};
use rusqlite::{
    Row,
    types::{ToSql, ToSqlOutput},
};
use thiserror::Error as ThisError;

// re-exports
pub use value::ColumnValue;

/// Iterator consumed by [`FieldSet::push`].
pub type CellIter = std::vec::IntoIter<Cell>;

///
/// BindError
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum BindError {
    #[error("no staged value left for field '{field}'")]
    Exhausted { field: &'static str },

    #[error("field '{field}' expects {expected}, staged value is {found}")]
    KindMismatch {
        field: &'static str,
        expected: FieldKind,
        found: &'static str,
    },

    #[error("field '{field}': value {value} does not fit {target}")]
    OutOfRange {
        field: &'static str,
        value: i128,
        target: &'static str,
    },

    #[error("{remaining} staged values left after push")]
    Trailing { remaining: usize },
}

///
/// Cell
///
/// Kind-matched staging slot for one column.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Cell {
    Int(i64),
    Text(String),
    Unsupported,
}

impl Cell {
    /// The zero value for `kind`.
    #[must_use]
    pub const fn blank(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Int => Self::Int(0),
            FieldKind::Text => Self::Text(String::new()),
            FieldKind::Unsupported { .. } => Self::Unsupported,
        }
    }

    /// Empty cells are left out of list-by-example filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Int(v) => *v == 0,
            Self::Text(s) => s.is_empty(),
            Self::Unsupported => true,
        }
    }

    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Text(_) => "text",
            Self::Unsupported => "unsupported",
        }
    }

    /// Text rendering, matching `CAST(col AS TEXT)` in SQLite.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            Self::Text(s) => s.clone(),
            Self::Unsupported => String::new(),
        }
    }

    // Scan column `idx` of `row` into this cell, keeping its kind.
    fn scan(&mut self, row: &Row<'_>, idx: usize) -> rusqlite::Result<()> {
        match self {
            Self::Int(v) => *v = row.get(idx)?,
            Self::Text(s) => *s = row.get(idx)?,
            Self::Unsupported => {
                return Err(rusqlite::Error::InvalidColumnType(
                    idx,
                    "unsupported".to_string(),
                    rusqlite::types::Type::Null,
                ));
            }
        }

        Ok(())
    }
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Int(v) => v.to_sql(),
            Self::Text(s) => s.to_sql(),
            Self::Unsupported => Err(rusqlite::Error::ToSqlConversionFailure(
                "unsupported field kind cannot be bound".into(),
            )),
        }
    }
}

/// Take the next staged value for `field`.
pub fn take<V: ColumnValue>(cells: &mut CellIter, field: &'static str) -> Result<V, BindError> {
    let cell = cells.next().ok_or(BindError::Exhausted { field })?;

    V::from_cell(cell, field)
}

/// Consume the staged value of a column that cannot be assigned.
pub fn skip(cells: &mut CellIter, field: &'static str) -> Result<(), BindError> {
    cells
        .next()
        .map(|_| ())
        .ok_or(BindError::Exhausted { field })
}

///
/// Binder
///
/// Staging cells for one record, in descriptor order.
///

#[derive(Clone, Debug, Default)]
pub struct Binder {
    cells: Vec<Cell>,
}

impl Binder {
    /// Stage the current field values of `record`.
    pub fn pull<T: FieldSet>(record: &T) -> Result<Self, BindError> {
        let mut cells = Vec::new();
        record.pull(&mut cells)?;

        Ok(Self { cells })
    }

    /// Blank cells typed by `schema`, ready to scan a row.
    #[must_use]
    pub fn blank(schema: &TableSchema) -> Self {
        Self {
            cells: schema.fields().iter().map(|f| Cell::blank(f.kind)).collect(),
        }
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[must_use]
    pub fn cell(&self, position: usize) -> &Cell {
        &self.cells[position]
    }

    /// Read every column of `row` into the matching cell.
    pub fn scan(&mut self, row: &Row<'_>) -> rusqlite::Result<()> {
        for (idx, cell) in self.cells.iter_mut().enumerate() {
            cell.scan(row, idx)?;
        }

        Ok(())
    }

    /// Copy staged cells back into `record`.
    pub fn push<T: FieldSet>(self, record: &mut T) -> Result<(), BindError> {
        let mut cells = self.cells.into_iter();
        record.push(&mut cells)?;

        match cells.len() {
            0 => Ok(()),
            remaining => Err(BindError::Trailing { remaining }),
        }
    }
}
