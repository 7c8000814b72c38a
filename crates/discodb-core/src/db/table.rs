//! Table gateway.
//!
//! Every mutation runs inside one transaction under the store's write lock.
//! An INSERT that collides with an existing row on a key or unique group is
//! applied as an UPDATE of that row in the same transaction, so an insert
//! never creates a second row for the same identity.

use crate::{
    bind::Binder,
    db::{
        label,
        options::ListOptions,
        sql::{self, Statement},
        store::Store,
    },
    error::Error,
    model::{Labels, Record, TableSchema, ValidationError},
    obs::{ExecKind, MetricsEvent},
};
use rusqlite::Connection;
use std::marker::PhantomData;
use tracing::{debug, error, info};

///
/// Table
///
/// Typed gateway for one record type, borrowed from a [`Store`].
///

pub struct Table<'s, T> {
    store: &'s Store,
    _marker: PhantomData<fn() -> T>,
}

impl<'s, T: Record> Table<'s, T> {
    pub(crate) const fn new(store: &'s Store) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Insert `record`, or update the row it collides with.
    pub fn insert(&self, record: &T) -> Result<(), Error> {
        let schema = self.store.schema::<T>()?;
        let binder = Binder::pull(record)?;
        let labels = record.labels();
        check_labels(&schema, &labels, "insert")?;
        let stmt = sql::insert(&schema);

        self.start(ExecKind::Insert);
        let result = self.store.with_writer(|conn| {
            let tx = conn.transaction()?;

            let rows = match execute(&tx, &stmt, &binder) {
                Ok(0) => 0,
                Ok(rows) => {
                    self.write_labels(&tx, &schema, &binder, &labels, false)?;
                    info!(table = T::TABLE, key = %key_of(&schema, &binder), "record inserted");
                    rows
                }
                Err(err) => match Error::classify(T::TABLE, err) {
                    Error::ConstraintViolation { table, source } => {
                        debug!(table, error = %source, "insert collided, updating");
                        self.store.record(MetricsEvent::UpsertFallback { table });
                        let update = sql::update(&schema)?;

                        // A unique group collided with a row of another identity.
                        match self.apply_update(&tx, &schema, &update, &binder, &labels) {
                            Err(Error::NotFound { .. }) => {
                                return Err(Error::ConstraintViolation { table, source });
                            }
                            other => other?,
                        }
                    }
                    other => return Err(other),
                },
            };

            tx.commit()?;
            Ok(rows)
        });

        self.finish(ExecKind::Insert, result).map(|_| ())
    }

    /// Update the mutable fields of the row identified by `record`.
    pub fn update(&self, record: &T) -> Result<(), Error> {
        let schema = self.store.schema::<T>()?;
        let stmt = sql::update(&schema)?;
        let binder = Binder::pull(record)?;
        let labels = record.labels();

        self.start(ExecKind::Update);
        let result = self.store.with_writer(|conn| {
            let tx = conn.transaction()?;
            let rows = self.apply_update(&tx, &schema, &stmt, &binder, &labels)?;
            tx.commit()?;

            Ok(rows)
        });

        self.finish(ExecKind::Update, result).map(|_| ())
    }

    /// Delete the row identified by `record`. Deleting an absent row is a
    /// no-op; the row's labels go with it.
    pub fn delete(&self, record: &T) -> Result<(), Error> {
        let schema = self.store.schema::<T>()?;
        let stmt = sql::delete(&schema)?;
        let binder = Binder::pull(record)?;

        self.start(ExecKind::Delete);
        let result = self.store.with_writer(|conn| {
            let tx = conn.transaction()?;
            let rows = execute(&tx, &stmt, &binder)?;
            tx.commit()?;

            if rows > 0 {
                info!(table = T::TABLE, key = %key_of(&schema, &binder), "record deleted");
            }
            Ok(rows)
        });

        self.finish(ExecKind::Delete, result).map(|_| ())
    }

    /// Fill `record` from the stored row matching its pk or natural keys.
    pub fn get(&self, record: &mut T) -> Result<(), Error> {
        let schema = self.store.schema::<T>()?;
        let binder = Binder::pull(record)?;
        let stmt = sql::get(&schema, binder.cells())?;

        self.start(ExecKind::Get);
        let result = self.store.with_reader(|conn| {
            debug!(table = T::TABLE, sql = stmt.sql(), "query");
            let params = stmt.bind(&binder);
            let mut prepared = conn.prepare_cached(stmt.sql())?;
            let mut rows = prepared.query(params.as_slice())?;

            let Some(row) = rows.next()? else {
                return Err(Error::NotFound { table: T::TABLE });
            };
            let mut out = Binder::blank(&schema);
            out.scan(row)?;

            Ok(out)
        });

        let out = self.finish(ExecKind::Get, result)?;
        out.push(record)?;
        self.rows(ExecKind::Get, 1);

        Ok(())
    }

    /// Rows matching every non-empty field of `template` and every label in
    /// `options`.
    pub fn list(&self, template: &T, options: &ListOptions) -> Result<Vec<T>, Error> {
        let schema = self.store.schema::<T>()?;
        let binder = Binder::pull(template)?;
        let options = ListOptions {
            count: false,
            ..options.clone()
        };
        let stmt = sql::list(&schema, binder.cells(), &options)?;

        self.start(ExecKind::List);
        let result = self.store.with_reader(|conn| {
            debug!(table = T::TABLE, sql = stmt.sql(), "query");
            let params = stmt.bind(&binder);
            let mut prepared = conn.prepare_cached(stmt.sql())?;
            let mut rows = prepared.query(params.as_slice())?;

            let mut list = Vec::new();
            while let Some(row) = rows.next()? {
                let mut cells = Binder::blank(&schema);
                cells.scan(row)?;

                let mut record = T::default();
                cells.push(&mut record)?;
                list.push(record);
            }

            Ok(list)
        });

        let list = self.finish(ExecKind::List, result)?;
        self.rows(ExecKind::List, list.len());

        Ok(list)
    }

    /// Number of rows `list` would return, ignoring sort and page.
    pub fn count(&self, template: &T, options: &ListOptions) -> Result<u64, Error> {
        let schema = self.store.schema::<T>()?;
        let binder = Binder::pull(template)?;
        let options = ListOptions {
            count: true,
            ..options.clone()
        };
        let stmt = sql::list(&schema, binder.cells(), &options)?;

        self.start(ExecKind::Count);
        let result = self.store.with_reader(|conn| {
            debug!(table = T::TABLE, sql = stmt.sql(), "query");
            let params = stmt.bind(&binder);
            let n: i64 = conn
                .prepare_cached(stmt.sql())?
                .query_row(params.as_slice(), |row| row.get(0))?;

            Ok(u64::try_from(n).unwrap_or_default())
        });

        let n = self.finish(ExecKind::Count, result)?;
        self.rows(ExecKind::Count, 0);

        Ok(n)
    }

    /// Labels currently stored for `record`.
    pub fn labels(&self, record: &T) -> Result<Labels, Error> {
        let schema = self.store.schema::<T>()?;
        let binder = Binder::pull(record)?;
        let parent = label::owner_key(&schema, binder.cells()).ok_or(
            ValidationError::MissingKey {
                table: T::TABLE,
                operation: "labels",
            },
        )?;

        self.store
            .with_reader(|conn| Ok(label::read(conn, T::TABLE, &parent)?))
    }

    // UPDATE plus label rewrite; the caller owns the transaction.
    fn apply_update(
        &self,
        conn: &Connection,
        schema: &TableSchema,
        stmt: &Statement,
        binder: &Binder,
        labels: &Labels,
    ) -> Result<usize, Error> {
        let rows = execute(conn, stmt, binder)?;
        if rows == 0 {
            return Err(Error::NotFound { table: T::TABLE });
        }

        self.write_labels(conn, schema, binder, labels, true)?;
        info!(table = T::TABLE, key = %key_of(schema, binder), "record updated");

        Ok(rows)
    }

    fn write_labels(
        &self,
        conn: &Connection,
        schema: &TableSchema,
        binder: &Binder,
        labels: &Labels,
        replace: bool,
    ) -> Result<(), Error> {
        let Some(parent) = label::owner_key(schema, binder.cells()) else {
            return Ok(());
        };

        let (removed, inserted) = if replace {
            label::replace(conn, T::TABLE, &parent, labels)?
        } else {
            (0, label::insert(conn, T::TABLE, &parent, labels)?)
        };

        if removed + inserted > 0 {
            debug!(table = T::TABLE, %parent, removed, inserted, "labels rewritten");
            self.store.record(MetricsEvent::LabelRewrite {
                table: T::TABLE,
                removed: removed as u64,
                inserted: inserted as u64,
            });
        }

        Ok(())
    }

    fn start(&self, kind: ExecKind) {
        self.store.record(MetricsEvent::ExecStart {
            kind,
            table: T::TABLE,
        });
    }

    fn rows(&self, kind: ExecKind, rows: usize) {
        self.store.record(MetricsEvent::ExecFinish {
            kind,
            table: T::TABLE,
            rows: rows as u64,
        });
    }

    // Mutations report their affected rows; reads report after decoding.
    fn finish<R: Affected>(&self, kind: ExecKind, result: Result<R, Error>) -> Result<R, Error> {
        match &result {
            Ok(value) => {
                if let Some(rows) = value.affected() {
                    self.rows(kind, rows);
                }
            }
            Err(Error::NotFound { .. }) => {
                debug!(table = T::TABLE, op = %kind, "not found");
                self.store.record(MetricsEvent::NotFound {
                    kind,
                    table: T::TABLE,
                });
            }
            Err(err) => {
                error!(table = T::TABLE, op = %kind, class = %err.class(), error = %err, "operation failed");
            }
        }

        result
    }
}

///
/// Affected
/// Row count carried by an operation result, if it is one.
///

trait Affected {
    fn affected(&self) -> Option<usize> {
        None
    }
}

impl Affected for usize {
    fn affected(&self) -> Option<usize> {
        Some(*self)
    }
}

impl Affected for u64 {}
impl Affected for Binder {}
impl<T> Affected for Vec<T> {}

// Labels without an identity have no owner to attach to.
fn check_labels(
    schema: &TableSchema,
    labels: &Labels,
    operation: &'static str,
) -> Result<(), ValidationError> {
    if !labels.is_empty() && schema.identity().is_empty() {
        return Err(ValidationError::MissingKey {
            table: schema.table(),
            operation,
        });
    }

    Ok(())
}

fn execute(conn: &Connection, stmt: &Statement, binder: &Binder) -> rusqlite::Result<usize> {
    debug!(sql = stmt.sql(), "execute");
    let params = stmt.bind(binder);

    conn.prepare_cached(stmt.sql())?.execute(params.as_slice())
}

fn key_of(schema: &TableSchema, binder: &Binder) -> String {
    label::owner_key(schema, binder.cells()).unwrap_or_default()
}
