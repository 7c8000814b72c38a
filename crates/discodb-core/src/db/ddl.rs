//! Schema builder.
//!
//! Every statement is additive and idempotent (`IF NOT EXISTS`); nothing
//! here drops or alters existing objects, so the full set is re-run safely
//! on every process start.

use crate::{
    db::{
        label::{self, LABEL_TABLE},
        sql::Quoted,
    },
    model::{TableSchema, ValidationError},
};
use std::fmt::Write as _;

/// All DDL for one record type, in execution order: table, natural key
/// index, group indexes, label cascade trigger.
pub fn statements(schema: &TableSchema) -> Result<Vec<String>, ValidationError> {
    schema.validate()?;

    let mut list = vec![create_table(schema)?];
    list.extend(create_indexes(schema));
    list.extend(label_cascade(schema));

    Ok(list)
}

/// `CREATE TABLE IF NOT EXISTS` with column, UNIQUE and FOREIGN KEY clauses.
pub fn create_table(schema: &TableSchema) -> Result<String, ValidationError> {
    let mut parts = Vec::with_capacity(schema.len());

    for field in schema.fields() {
        let Some(ty) = field.kind.sql_type() else {
            return Err(ValidationError::UnsupportedKind {
                table: schema.table(),
                field: field.name,
                kind: field.kind,
            });
        };
        let constraint = if field.is_pk() {
            "PRIMARY KEY"
        } else {
            "NOT NULL"
        };

        parts.push(format!("{} {ty} {constraint}", Quoted(field.name)));
    }

    for group in schema.unique_groups() {
        parts.push(format!("UNIQUE ({})", column_list(schema, &group.fields)));
    }

    for field in schema.fields() {
        if let Some(fk) = field.fk() {
            parts.push(format!(
                "FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE CASCADE",
                Quoted(field.name),
                Quoted(&fk.table),
                Quoted(&fk.field),
            ));
        }
    }

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        Quoted(schema.table()),
        parts.join(", ")
    ))
}

/// Natural key index (when any key exists) followed by one index per
/// declared index group.
///
/// Object names join the table and a suffix with [`NAME_SEPARATOR`], which no
/// validated identifier contains, so they never meet another table's names.
#[must_use]
pub fn create_indexes(schema: &TableSchema) -> Vec<String> {
    let table = schema.table();
    let mut list = Vec::new();

    let keys = schema.keys();
    if !keys.is_empty() {
        list.push(create_index(schema, &object_name(table, &["key"]), &keys));
    }

    for group in schema.index_groups() {
        let name = object_name(table, &["index", group.name]);
        list.push(create_index(schema, &name, &group.fields));
    }

    list
}

/// Trigger removing an owner's label rows whenever the owner row is
/// deleted, including deletes cascaded through foreign keys.
#[must_use]
pub fn label_cascade(schema: &TableSchema) -> Option<String> {
    let table = schema.table();
    let parent = label::owner_key_sql(schema, "OLD.")?;

    // The table name is a validated identifier, so it is safe as a literal.
    Some(format!(
        "CREATE TRIGGER IF NOT EXISTS {} AFTER DELETE ON {} BEGIN DELETE FROM {} WHERE \"kind\" = '{table}' AND \"parent\" = {parent}; END",
        Quoted(&object_name(table, &["labels"])),
        Quoted(table),
        Quoted(LABEL_TABLE),
    ))
}

/// Separator inside generated index and trigger names.
pub const NAME_SEPARATOR: &str = "#";

fn object_name(table: &str, suffix: &[&str]) -> String {
    let mut name = table.to_string();
    for part in suffix {
        name.push_str(NAME_SEPARATOR);
        name.push_str(part);
    }

    name
}

fn create_index(schema: &TableSchema, name: &str, fields: &[usize]) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
        Quoted(name),
        Quoted(schema.table()),
        column_list(schema, fields)
    )
}

fn column_list(schema: &TableSchema, fields: &[usize]) -> String {
    let mut out = String::new();
    for (n, &i) in fields.iter().enumerate() {
        if n > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{}", Quoted(schema.field(i).name));
    }

    out
}
