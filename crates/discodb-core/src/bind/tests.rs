use super::*;
use crate::model::{ColumnDef, FieldSet};

// Hand-written field set; the derive emits the same shape.
#[derive(Debug, Default, PartialEq)]
struct Pod {
    name: String,
    restarts: u16,
}

impl FieldSet for Pod {
    fn columns(columns: &mut Vec<ColumnDef>) {
        columns.push(ColumnDef::new("name", "key", String::KIND));
        columns.push(ColumnDef::new("restarts", "", u16::KIND));
    }

    fn pull(&self, cells: &mut Vec<Cell>) -> Result<(), BindError> {
        cells.push(self.name.to_cell("name")?);
        cells.push(self.restarts.to_cell("restarts")?);

        Ok(())
    }

    fn push(&mut self, cells: &mut CellIter) -> Result<(), BindError> {
        self.name = take(cells, "name")?;
        self.restarts = take(cells, "restarts")?;

        Ok(())
    }
}

#[test]
fn pull_then_push_restores_the_record() {
    let pod = Pod {
        name: "web-0".into(),
        restarts: 3,
    };

    let binder = Binder::pull(&pod).unwrap();
    assert_eq!(
        binder.cells(),
        &[Cell::Text("web-0".into()), Cell::Int(3)]
    );

    let mut out = Pod::default();
    binder.push(&mut out).unwrap();
    assert_eq!(out, pod);
}

#[test]
fn push_rejects_out_of_range_integers() {
    let mut cells = vec![Cell::Text("x".into()), Cell::Int(70_000)].into_iter();
    let err = Pod::default().push(&mut cells).unwrap_err();

    assert_eq!(
        err,
        BindError::OutOfRange {
            field: "restarts",
            value: 70_000,
            target: "u16",
        }
    );
}

#[test]
fn pull_rejects_integers_wider_than_a_column() {
    assert_eq!(
        u64::MAX.to_cell("n"),
        Err(BindError::OutOfRange {
            field: "n",
            value: i128::from(u64::MAX),
            target: "i64",
        })
    );
    assert_eq!(
        u64::try_from(i64::MAX).unwrap().to_cell("n"),
        Ok(Cell::Int(i64::MAX))
    );
    assert_eq!(u8::MAX.to_cell("n"), Ok(Cell::Int(255)));
}

#[test]
fn push_rejects_kind_mismatch() {
    let mut cells = vec![Cell::Int(1), Cell::Int(1)].into_iter();
    let err = Pod::default().push(&mut cells).unwrap_err();

    assert_eq!(
        err,
        BindError::KindMismatch {
            field: "name",
            expected: FieldKind::Text,
            found: "int",
        }
    );
}

#[test]
fn push_reports_missing_and_trailing_cells() {
    let mut cells = vec![Cell::Text("x".into())].into_iter();
    assert_eq!(
        Pod::default().push(&mut cells).unwrap_err(),
        BindError::Exhausted { field: "restarts" }
    );

    let binder = Binder {
        cells: vec![Cell::Text("x".into()), Cell::Int(1), Cell::Int(2)],
    };
    assert_eq!(
        binder.push(&mut Pod::default()).unwrap_err(),
        BindError::Trailing { remaining: 1 }
    );
}

#[test]
fn empty_cells_follow_zero_values() {
    assert!(Cell::Int(0).is_empty());
    assert!(Cell::Text(String::new()).is_empty());
    assert!(!Cell::Int(-1).is_empty());
    assert!(!Cell::Text("a".into()).is_empty());
}

#[test]
fn unsupported_cell_refuses_to_bind() {
    assert!(Cell::Unsupported.to_sql().is_err());
    assert!(Cell::Int(4).to_sql().is_ok());
}

#[test]
fn render_matches_text_cast() {
    assert_eq!(Cell::Int(-12).render(), "-12");
    assert_eq!(Cell::Text("ns/a".into()).render(), "ns/a");
}

#[test]
fn scan_reads_columns_into_typed_cells() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let mut binder = Binder {
        cells: vec![Cell::blank(FieldKind::Text), Cell::blank(FieldKind::Int)],
    };

    conn.query_row("SELECT 'db-1', 7", [], |row| binder.scan(row))
        .unwrap();

    let mut pod = Pod::default();
    binder.push(&mut pod).unwrap();
    assert_eq!(
        pod,
        Pod {
            name: "db-1".into(),
            restarts: 7,
        }
    );
}
