//! Label index.
//!
//! One shared `Label` table stores name/value tags for rows of every record
//! type (entity-attribute-value). Rows are keyed by the owner's table name
//! (`kind`) and its key rendered as text (`parent`). An owner's label set is
//! always rewritten as a whole; it is never diffed.

use crate::{
    bind::Cell,
    model::{Labels, TableSchema},
};
use rusqlite::{Connection, named_params};

/// Name of the shared label table.
pub const LABEL_TABLE: &str = "Label";

/// Separator between natural key values in a composite owner key.
pub const KEY_SEPARATOR: &str = "/";

pub(crate) const CREATE_TABLE: &str = r#"CREATE TABLE IF NOT EXISTS "Label" ("kind" TEXT NOT NULL, "parent" TEXT NOT NULL, "name" TEXT NOT NULL, "value" TEXT NOT NULL, PRIMARY KEY ("kind", "parent", "name"))"#;

pub(crate) const CREATE_INDEX: &str =
    r#"CREATE INDEX IF NOT EXISTS "Label#index" ON "Label" ("kind", "name", "value")"#;

const INSERT: &str = r#"INSERT OR REPLACE INTO "Label" ("kind", "parent", "name", "value") VALUES (:kind, :parent, :name, :value)"#;

const DELETE: &str = r#"DELETE FROM "Label" WHERE "kind" = :kind AND "parent" = :parent"#;

const SELECT: &str =
    r#"SELECT "name", "value" FROM "Label" WHERE "kind" = :kind AND "parent" = :parent"#;

/// Owner key of a staged record: the pk rendered as text, else the natural
/// keys joined with [`KEY_SEPARATOR`]. `None` when the type has no key.
///
/// In a composite key each part is escaped (`\` becomes `\\`, `/` becomes
/// `\/`) so distinct key tuples never render to the same owner key.
#[must_use]
pub fn owner_key(schema: &TableSchema, cells: &[Cell]) -> Option<String> {
    let identity = schema.identity();
    match identity.as_slice() {
        [] => None,
        [single] => Some(cells[*single].render()),
        composite => {
            let parts: Vec<String> = composite
                .iter()
                .map(|&i| escape_part(&cells[i].render()))
                .collect();

            Some(parts.join(KEY_SEPARATOR))
        }
    }
}

/// SQL expression computing the same owner key from a row. `qualifier` is
/// prefixed to each column (`OLD.` inside triggers).
#[must_use]
pub(crate) fn owner_key_sql(schema: &TableSchema, qualifier: &str) -> Option<String> {
    let identity = schema.identity();
    let cast = |i: usize| format!(r#"CAST({qualifier}"{}" AS TEXT)"#, schema.field(i).name);

    match identity.as_slice() {
        [] => None,
        [single] => Some(cast(*single)),
        composite => {
            let parts: Vec<String> = composite
                .iter()
                .map(|&i| {
                    format!(
                        r"replace(replace({}, '\', '\\'), '{KEY_SEPARATOR}', '\{KEY_SEPARATOR}')",
                        cast(i)
                    )
                })
                .collect();

            Some(parts.join(&format!(" || '{KEY_SEPARATOR}' || ")))
        }
    }
}

// Must stay in step with the replace() chain in `owner_key_sql`.
fn escape_part(part: &str) -> String {
    part.replace('\\', "\\\\")
        .replace(KEY_SEPARATOR, &format!("\\{KEY_SEPARATOR}"))
}

/// Write one row per label.
pub(crate) fn insert(
    conn: &Connection,
    kind: &str,
    parent: &str,
    labels: &Labels,
) -> rusqlite::Result<usize> {
    if labels.is_empty() {
        return Ok(0);
    }

    let mut stmt = conn.prepare_cached(INSERT)?;
    for (name, value) in labels {
        stmt.execute(named_params! {
            ":kind": kind,
            ":parent": parent,
            ":name": name,
            ":value": value,
        })?;
    }

    Ok(labels.len())
}

/// Remove every label of one owner.
pub(crate) fn delete(conn: &Connection, kind: &str, parent: &str) -> rusqlite::Result<usize> {
    conn.prepare_cached(DELETE)?
        .execute(named_params! { ":kind": kind, ":parent": parent })
}

/// Delete-all then insert-all. Returns (removed, inserted).
pub(crate) fn replace(
    conn: &Connection,
    kind: &str,
    parent: &str,
    labels: &Labels,
) -> rusqlite::Result<(usize, usize)> {
    let removed = delete(conn, kind, parent)?;
    let inserted = insert(conn, kind, parent, labels)?;

    Ok((removed, inserted))
}

/// Current labels of one owner.
pub(crate) fn read(conn: &Connection, kind: &str, parent: &str) -> rusqlite::Result<Labels> {
    let mut stmt = conn.prepare_cached(SELECT)?;
    let rows = stmt.query_map(named_params! { ":kind": kind, ":parent": parent }, |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    rows.collect()
}
