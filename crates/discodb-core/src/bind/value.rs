use crate::{
    bind::{BindError, Cell},
    model::FieldKind,
};

///
/// ColumnValue
///
/// Rust field types that map onto a supported column kind.
///

pub trait ColumnValue: Sized {
    const KIND: FieldKind;

    /// Stage the value, failing when it has no lossless column form.
    fn to_cell(&self, field: &'static str) -> Result<Cell, BindError>;

    fn from_cell(cell: Cell, field: &'static str) -> Result<Self, BindError>;
}

const fn mismatch(field: &'static str, expected: FieldKind, cell: &Cell) -> BindError {
    BindError::KindMismatch {
        field,
        expected,
        found: cell.kind_name(),
    }
}

impl ColumnValue for String {
    const KIND: FieldKind = FieldKind::Text;

    fn to_cell(&self, _field: &'static str) -> Result<Cell, BindError> {
        Ok(Cell::Text(self.clone()))
    }

    fn from_cell(cell: Cell, field: &'static str) -> Result<Self, BindError> {
        match cell {
            Cell::Text(s) => Ok(s),
            other => Err(mismatch(field, Self::KIND, &other)),
        }
    }
}

impl ColumnValue for i64 {
    const KIND: FieldKind = FieldKind::Int;

    fn to_cell(&self, _field: &'static str) -> Result<Cell, BindError> {
        Ok(Cell::Int(*self))
    }

    fn from_cell(cell: Cell, field: &'static str) -> Result<Self, BindError> {
        match cell {
            Cell::Int(v) => Ok(v),
            other => Err(mismatch(field, Self::KIND, &other)),
        }
    }
}

// Integers other than i64 are checked against i64 on pull and against their
// own range on push.
macro_rules! impl_column_value_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ColumnValue for $ty {
                const KIND: FieldKind = FieldKind::Int;

                #[allow(clippy::cast_lossless, clippy::unnecessary_fallible_conversions)]
                fn to_cell(&self, field: &'static str) -> Result<Cell, BindError> {
                    i64::try_from(*self)
                        .map(Cell::Int)
                        .map_err(|_| BindError::OutOfRange {
                            field,
                            value: *self as i128,
                            target: "i64",
                        })
                }

                fn from_cell(cell: Cell, field: &'static str) -> Result<Self, BindError> {
                    match cell {
                        Cell::Int(v) => <$ty>::try_from(v).map_err(|_| BindError::OutOfRange {
                            field,
                            value: i128::from(v),
                            target: stringify!($ty),
                        }),
                        other => Err(mismatch(field, Self::KIND, &other)),
                    }
                }
            }
        )*
    };
}

impl_column_value_int!(i8, i16, i32, isize, u8, u16, u32, u64, usize);
