//! Statement builder.
//!
//! Statements are built as a small typed AST ([`Query`]) over field
//! positions and rendered against a [`TableSchema`]. Identifiers are always
//! quoted and every value, including label filter values, is a named
//! parameter. Columns and parameters follow descriptor order, so the same
//! inputs always render the same text.

use crate::{
    bind::{Binder, Cell},
    db::{
        label::{self, LABEL_TABLE},
        options::{ListOptions, Page},
    },
    model::{TableSchema, ValidationError},
};
use rusqlite::types::ToSql;
use std::fmt::{self, Display, Write as _};

const LABEL_KIND_PARAM: &str = ":_label_kind";

///
/// Quoted
/// Double-quoted SQL identifier. Only validated identifiers reach here.
///

pub(crate) struct Quoted<'a>(pub &'a str);

impl Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

///
/// ParamValue
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParamValue {
    /// Staged cell at this field position.
    Field(usize),
    Text(String),
}

///
/// Param
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Param {
    /// Parameter name including the `:` prefix.
    pub name: String,
    pub value: ParamValue,
}

///
/// Statement
///
/// Rendered SQL plus the parameters it references, each exactly once.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Param>,
}

impl Statement {
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Named parameters resolved against staged cells.
    pub(crate) fn bind<'a>(&'a self, binder: &'a Binder) -> Vec<(&'a str, &'a dyn ToSql)> {
        self.params
            .iter()
            .map(|p| {
                let value: &dyn ToSql = match &p.value {
                    ParamValue::Field(i) => binder.cell(*i),
                    ParamValue::Text(s) => s,
                };
                (p.name.as_str(), value)
            })
            .collect()
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

///
/// Filter
///
/// One conjunct of a WHERE clause.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Filter {
    /// `"field" = :field`
    Eq(usize),

    /// The owner key is in the intersection of the parents bearing every
    /// (name, value) label.
    Labels(Vec<(String, String)>),
}

///
/// Projection
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Projection {
    Columns,
    Count,
}

///
/// Query
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Query {
    Insert,
    Update {
        set: Vec<usize>,
        filter: Vec<Filter>,
    },
    Delete {
        filter: Vec<Filter>,
    },
    Select {
        projection: Projection,
        filter: Vec<Filter>,
        order: Vec<usize>,
        page: Option<Page>,
    },
}

impl Query {
    #[must_use]
    pub fn render(&self, schema: &TableSchema) -> Statement {
        let mut w = Writer::new(schema);
        let table = Quoted(schema.table());

        match self {
            Self::Insert => {
                let all: Vec<usize> = (0..schema.len()).collect();
                w.push(&format!("INSERT INTO {table} ("));
                w.columns(&all);
                w.push(") VALUES (");
                for (n, &i) in all.iter().enumerate() {
                    w.comma(n);
                    w.field_param(i);
                }
                w.push(")");
            }
            Self::Update { set, filter } => {
                w.push(&format!("UPDATE {table} SET "));
                for (n, &i) in set.iter().enumerate() {
                    w.comma(n);
                    w.assignment(i);
                }
                w.filter(filter);
            }
            Self::Delete { filter } => {
                w.push(&format!("DELETE FROM {table}"));
                w.filter(filter);
            }
            Self::Select {
                projection,
                filter,
                order,
                page,
            } => {
                w.push("SELECT ");
                match projection {
                    Projection::Count => w.push("COUNT(*)"),
                    Projection::Columns => {
                        let all: Vec<usize> = (0..schema.len()).collect();
                        w.columns(&all);
                    }
                }
                w.push(&format!(" FROM {table}"));
                w.filter(filter);

                if !order.is_empty() {
                    let positions: Vec<String> = order.iter().map(ToString::to_string).collect();
                    w.push(&format!(" ORDER BY {}", positions.join(", ")));
                }
                if let Some(page) = page {
                    w.push(&format!(" LIMIT {} OFFSET {}", page.limit, page.offset));
                }
            }
        }

        w.finish()
    }
}

/// INSERT naming every field as column and parameter.
#[must_use]
pub fn insert(schema: &TableSchema) -> Statement {
    Query::Insert.render(schema)
}

/// UPDATE of the mutable fields, keyed by pk or natural keys.
pub fn update(schema: &TableSchema) -> Result<Statement, ValidationError> {
    let filter = identity_filter(schema, "update")?;
    let set = schema.mutable();
    if set.is_empty() {
        return Err(ValidationError::NothingToUpdate {
            table: schema.table(),
        });
    }

    Ok(Query::Update { set, filter }.render(schema))
}

/// DELETE keyed like UPDATE.
pub fn delete(schema: &TableSchema) -> Result<Statement, ValidationError> {
    let filter = identity_filter(schema, "delete")?;

    Ok(Query::Delete { filter }.render(schema))
}

/// SELECT of one row: by pk when set, else by natural keys.
pub fn get(schema: &TableSchema, cells: &[Cell]) -> Result<Statement, ValidationError> {
    let lookup = schema.lookup(cells);
    if lookup.is_empty() {
        return Err(ValidationError::MissingKey {
            table: schema.table(),
            operation: "get",
        });
    }

    Ok(Query::Select {
        projection: Projection::Columns,
        filter: lookup.into_iter().map(Filter::Eq).collect(),
        order: Vec::new(),
        page: None,
    }
    .render(schema))
}

/// SELECT (or COUNT) filtered by the non-empty fields of the template and
/// by label intersection. Counting ignores sort and page.
pub fn list(
    schema: &TableSchema,
    cells: &[Cell],
    options: &ListOptions,
) -> Result<Statement, ValidationError> {
    let table = schema.table();

    let mut filter: Vec<Filter> = cells
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_empty())
        .map(|(i, _)| Filter::Eq(i))
        .collect();

    if !options.labels.is_empty() {
        if schema.identity().is_empty() {
            return Err(ValidationError::MissingKey {
                table,
                operation: "label filter",
            });
        }
        filter.push(Filter::Labels(
            options
                .labels
                .iter()
                .map(|(n, v)| (n.clone(), v.clone()))
                .collect(),
        ));
    }

    let query = if options.count {
        Query::Select {
            projection: Projection::Count,
            filter,
            order: Vec::new(),
            page: None,
        }
    } else {
        for &position in &options.sort {
            if position == 0 || position > schema.len() {
                return Err(ValidationError::SortPosition {
                    table,
                    position,
                    fields: schema.len(),
                });
            }
        }

        // SQLite reads LIMIT and OFFSET as signed 64-bit integers.
        if let Some(page) = options.page {
            let max = i64::MAX.unsigned_abs();
            if page.limit > max || page.offset > max {
                return Err(ValidationError::PageOutOfRange {
                    table,
                    limit: page.limit,
                    offset: page.offset,
                });
            }
        }

        Query::Select {
            projection: Projection::Columns,
            filter,
            order: options.sort.clone(),
            page: options.page,
        }
    };

    Ok(query.render(schema))
}

fn identity_filter(
    schema: &TableSchema,
    operation: &'static str,
) -> Result<Vec<Filter>, ValidationError> {
    let identity = schema.identity();
    if identity.is_empty() {
        return Err(ValidationError::MissingKey {
            table: schema.table(),
            operation,
        });
    }

    Ok(identity.into_iter().map(Filter::Eq).collect())
}

///
/// Writer
///

struct Writer<'a> {
    schema: &'a TableSchema,
    sql: String,
    params: Vec<Param>,
}

impl<'a> Writer<'a> {
    const fn new(schema: &'a TableSchema) -> Self {
        Self {
            schema,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    fn comma(&mut self, n: usize) {
        if n > 0 {
            self.sql.push_str(", ");
        }
    }

    fn column(&mut self, i: usize) {
        let _ = write!(self.sql, "{}", Quoted(self.schema.field(i).name));
    }

    fn columns(&mut self, fields: &[usize]) {
        for (n, &i) in fields.iter().enumerate() {
            self.comma(n);
            self.column(i);
        }
    }

    fn param(&mut self, name: String, value: ParamValue) {
        self.sql.push_str(&name);
        if !self.params.iter().any(|p| p.name == name) {
            self.params.push(Param { name, value });
        }
    }

    fn field_param(&mut self, i: usize) {
        let name = format!(":{}", self.schema.field(i).name);
        self.param(name, ParamValue::Field(i));
    }

    fn assignment(&mut self, i: usize) {
        self.column(i);
        self.push(" = ");
        self.field_param(i);
    }

    fn filter(&mut self, filter: &[Filter]) {
        for (n, f) in filter.iter().enumerate() {
            self.push(if n == 0 { " WHERE " } else { " AND " });
            match f {
                Filter::Eq(i) => self.assignment(*i),
                Filter::Labels(labels) => self.labels(labels),
            }
        }
    }

    fn labels(&mut self, labels: &[(String, String)]) {
        // identity is non-empty whenever a label filter is built
        let owner = label::owner_key_sql(self.schema, "").unwrap_or_default();
        let kind = self.schema.table().to_string();

        let _ = write!(self.sql, "{owner} IN (");
        for (n, (name, value)) in labels.iter().enumerate() {
            if n > 0 {
                self.push(" INTERSECT ");
            }
            let _ = write!(
                self.sql,
                "SELECT \"parent\" FROM {} WHERE \"kind\" = ",
                Quoted(LABEL_TABLE)
            );
            self.param(LABEL_KIND_PARAM.to_string(), ParamValue::Text(kind.clone()));
            self.push(" AND \"name\" = ");
            self.param(format!(":_label_name_{n}"), ParamValue::Text(name.clone()));
            self.push(" AND \"value\" = ");
            self.param(format!(":_label_value_{n}"), ParamValue::Text(value.clone()));
        }
        self.push(")");
    }

    fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}
