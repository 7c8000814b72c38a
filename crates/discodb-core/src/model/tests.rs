use super::*;
use crate::{
    bind::{Binder, Cell},
    error::{Error, ErrorClass},
    test_fixtures::{
        Blob, Cluster, Empty, Event, Hidden, Meta, Namespace, Pod, Shadow, Shadowed, TwoPk,
        Widget,
    },
};
use discodb_schema::IdentError;

fn names(schema: &TableSchema) -> Vec<&'static str> {
    schema.fields().iter().map(|f| f.name).collect()
}

#[test]
fn derive_lists_columns_in_declaration_order() {
    let mut columns = Vec::new();
    Widget::columns(&mut columns);

    assert_eq!(
        columns,
        vec![
            ColumnDef::new("id", "pk", FieldKind::Int),
            ColumnDef::new("group", "key", FieldKind::Text),
            ColumnDef::new("name", "", FieldKind::Text),
        ]
    );
    assert_eq!(Widget::TABLE, "Widget");
}

#[test]
fn embedded_fields_are_flattened_in_place() {
    let schema = TableSchema::of::<Pod>().unwrap();

    assert_eq!(
        names(&schema),
        vec!["namespace", "name", "node", "ip", "restarts"]
    );
    assert_eq!(schema.keys(), vec![0, 1]);
    assert_eq!(schema.pk(), None);
    assert_eq!(schema.identity(), vec![0, 1]);
    schema.validate().unwrap();
}

#[test]
fn labels_field_is_not_a_column() {
    let widget = Widget::new(1, "g1", "a").with_labels([("env", "prod")]);

    let binder = Binder::pull(&widget).unwrap();
    assert_eq!(binder.cells().len(), 3);
    assert_eq!(widget.labels().get("env").map(String::as_str), Some("prod"));
    assert!(Event::default().labels().is_empty());
}

#[test]
fn roles_come_from_tags() {
    let schema = TableSchema::of::<Cluster>().unwrap();

    assert_eq!(schema.pk(), Some(0));
    assert_eq!(schema.keys(), vec![1]);
    assert_eq!(schema.identity(), vec![0]);
    // pk and const fields are never updated
    assert_eq!(schema.mutable(), vec![1]);

    let schema = TableSchema::of::<Namespace>().unwrap();
    let fk = schema.field(0).fk().unwrap();
    assert_eq!(fk.to_string(), "Cluster(pk)");
}

#[test]
fn groups_collect_members_in_first_appearance_order() {
    let schema = TableSchema::of::<Pod>().unwrap();

    let unique = schema.unique_groups();
    assert_eq!(unique.len(), 1);
    assert_eq!(unique[0].name, "addr");
    assert_eq!(unique[0].fields, vec![2, 3]);

    let index = schema.index_groups();
    assert_eq!(index.len(), 1);
    assert_eq!(index[0].name, "by_node");
    assert_eq!(index[0].fields, vec![2]);
}

#[test]
fn lookup_prefers_a_set_pk_then_natural_keys() {
    let schema = TableSchema::of::<Widget>().unwrap();

    let set = Binder::pull(&Widget::new(7, "g1", "")).unwrap();
    assert_eq!(schema.lookup(set.cells()), vec![0]);

    let unset = Binder::pull(&Widget::new(0, "g1", "")).unwrap();
    assert_eq!(schema.lookup(unset.cells()), vec![1]);

    // no natural keys: fall back to the unset pk
    let schema = TableSchema::of::<Blob>().unwrap();
    let cells = [Cell::Int(0), Cell::Unsupported];
    assert_eq!(schema.lookup(&cells), vec![0]);

    let schema = TableSchema::of::<Event>().unwrap();
    assert!(schema.lookup(&[Cell::Text(String::new()), Cell::Int(0)]).is_empty());
}

#[test]
fn unsupported_kind_fails_validation_by_name() {
    let schema = TableSchema::of::<Blob>().unwrap();

    let err = schema.validate().unwrap_err();
    assert_eq!(
        err,
        ValidationError::UnsupportedKind {
            table: "Blob",
            field: "data",
            kind: FieldKind::Unsupported {
                type_name: "Vec<u8>"
            },
        }
    );
    assert!(err.to_string().contains("unsupported(Vec<u8>)"));
}

#[test]
fn second_pk_is_rejected() {
    let err = TableSchema::of::<TwoPk>().unwrap().validate().unwrap_err();

    assert_eq!(
        err,
        ValidationError::MultiplePrimaryKeys {
            table: "TwoPk",
            first: "a",
            second: "b",
        }
    );
}

#[test]
fn reserved_names_are_rejected() {
    let err = TableSchema::of::<Hidden>().unwrap().validate().unwrap_err();
    assert_eq!(
        err,
        ValidationError::ReservedName {
            table: "Hidden",
            name: "_note".into(),
        }
    );

    let err = TableSchema::of::<Shadow>().unwrap().validate().unwrap_err();
    assert!(matches!(err, ValidationError::ReservedName { name, .. } if name == "Label"));
}

#[test]
fn duplicate_flattened_column_is_rejected() {
    let err = TableSchema::of::<Shadowed>().unwrap().validate().unwrap_err();

    assert_eq!(
        err,
        ValidationError::DuplicateColumn {
            table: "Shadowed",
            column: "name",
        }
    );
}

#[test]
fn record_without_columns_is_invalid_model() {
    let err = TableSchema::of::<Empty>().unwrap_err();

    assert_eq!(err.class(), ErrorClass::InvalidModel);
    assert!(matches!(err, Error::InvalidModel { .. }));
}

// Hand-written impls reach the runtime checks the derive performs at
// compile time.
#[derive(Default)]
struct Loose;

impl FieldSet for Loose {
    fn columns(columns: &mut Vec<ColumnDef>) {
        columns.push(ColumnDef::new("id", "pk, primary", FieldKind::Int));
    }

    fn pull(&self, cells: &mut Vec<Cell>) -> Result<(), BindError> {
        cells.push(Cell::Int(0));
        Ok(())
    }

    fn push(&mut self, cells: &mut crate::bind::CellIter) -> Result<(), BindError> {
        crate::bind::skip(cells, "id")
    }
}

impl Record for Loose {
    const TABLE: &'static str = "Loose";
}

#[derive(Default)]
struct BadTable;

impl FieldSet for BadTable {
    fn columns(columns: &mut Vec<ColumnDef>) {
        columns.push(ColumnDef::new("id", "pk", FieldKind::Int));
    }

    fn pull(&self, cells: &mut Vec<Cell>) -> Result<(), BindError> {
        cells.push(Cell::Int(0));
        Ok(())
    }

    fn push(&mut self, cells: &mut crate::bind::CellIter) -> Result<(), BindError> {
        crate::bind::skip(cells, "id")
    }
}

impl Record for BadTable {
    const TABLE: &'static str = "bad table";
}

#[test]
fn invalid_tag_is_a_validation_error() {
    let err = TableSchema::of::<Loose>().unwrap_err();

    assert_eq!(err.class(), ErrorClass::Validation);
    assert!(matches!(
        err,
        Error::Validation(ValidationError::Tag {
            table: "Loose",
            field: "id",
            source: TagError::UnknownOption(_),
        })
    ));
}

#[test]
fn invalid_table_identifier_is_rejected() {
    let err = TableSchema::of::<BadTable>()
        .unwrap()
        .validate()
        .unwrap_err();

    assert_eq!(
        err,
        ValidationError::Ident {
            table: "bad table",
            name: "bad table".into(),
            source: IdentError::InvalidChars("bad table".into()),
        }
    );
}

#[test]
fn embedded_meta_alone_is_a_field_set() {
    let meta = Meta {
        namespace: "default".into(),
        name: "web-0".into(),
    };

    let mut cells = Vec::new();
    meta.pull(&mut cells).unwrap();
    assert_eq!(
        cells,
        vec![Cell::Text("default".into()), Cell::Text("web-0".into())]
    );
}
