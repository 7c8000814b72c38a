use crate::{
    config::StoreConfig,
    db::{ddl, label, options::ListOptions, table::Table},
    error::Error,
    model::{Labels, Record, TableSchema},
    obs::{GlobalMetricsSink, MetricsEvent, MetricsSink},
};
use parking_lot::{Mutex, RwLock};
use rusqlite::{Connection, OpenFlags};
use std::{
    any::TypeId,
    collections::HashMap,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tracing::{debug, info};

///
/// Store
///
/// Handle to one SQLite database shared by every record type.
///
/// Writes are serialized by an exclusive lock around the single writer
/// connection; the lock is held for the whole mutation, label rewrite
/// included. Reads never take it: file-backed stores read through a pool of
/// read-only WAL connections, picked round-robin. An in-memory database only
/// exists inside its one connection, so in-memory stores read through the
/// writer connection as well.
///

pub struct Store {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    next_reader: AtomicUsize,
    schemas: RwLock<HashMap<TypeId, Arc<TableSchema>>>,
    metrics: Option<&'static dyn MetricsSink>,
    config: StoreConfig,
}

impl Store {
    pub fn open(config: StoreConfig) -> Result<Self, Error> {
        let writer = match &config.path {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };

        writer.busy_timeout(config.busy_timeout())?;
        writer.pragma_update(None, "foreign_keys", config.foreign_keys)?;
        if config.wal && !config.is_memory() {
            let mode: String =
                writer.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
            debug!(journal_mode = %mode, "journal mode set");
        }

        writer.execute_batch(label::CREATE_TABLE)?;
        writer.execute_batch(label::CREATE_INDEX)?;

        let readers = match &config.path {
            Some(path) => (0..config.readers)
                .map(|_| open_reader(path, &config).map(Mutex::new))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        info!(
            path = ?config.path,
            readers = readers.len(),
            foreign_keys = config.foreign_keys,
            "store opened"
        );

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            next_reader: AtomicUsize::new(0),
            schemas: RwLock::new(HashMap::new()),
            metrics: None,
            config,
        })
    }

    pub fn in_memory() -> Result<Self, Error> {
        Self::open(StoreConfig::memory())
    }

    /// Route metrics events to `sink` instead of the global counters.
    #[must_use]
    pub fn metrics_sink(mut self, sink: &'static dyn MetricsSink) -> Self {
        self.metrics = Some(sink);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Create the table, indexes and label trigger for `T` now instead of
    /// on first use. Parent tables of foreign keys must be created first.
    pub fn create<T: Record>(&self) -> Result<(), Error> {
        self.schema::<T>().map(|_| ())
    }

    #[must_use]
    pub const fn table<T: Record>(&self) -> Table<'_, T> {
        Table::new(self)
    }

    pub fn insert<T: Record>(&self, record: &T) -> Result<(), Error> {
        self.table::<T>().insert(record)
    }

    pub fn update<T: Record>(&self, record: &T) -> Result<(), Error> {
        self.table::<T>().update(record)
    }

    pub fn delete<T: Record>(&self, record: &T) -> Result<(), Error> {
        self.table::<T>().delete(record)
    }

    pub fn get<T: Record>(&self, record: &mut T) -> Result<(), Error> {
        self.table::<T>().get(record)
    }

    pub fn list<T: Record>(&self, template: &T, options: &ListOptions) -> Result<Vec<T>, Error> {
        self.table::<T>().list(template, options)
    }

    pub fn count<T: Record>(&self, template: &T, options: &ListOptions) -> Result<u64, Error> {
        self.table::<T>().count(template, options)
    }

    pub fn labels<T: Record>(&self, record: &T) -> Result<Labels, Error> {
        self.table::<T>().labels(record)
    }

    /// Validated schema of `T`; runs its DDL once per store.
    pub(crate) fn schema<T: Record>(&self) -> Result<Arc<TableSchema>, Error> {
        let id = TypeId::of::<T>();
        if let Some(schema) = self.schemas.read().get(&id) {
            return Ok(Arc::clone(schema));
        }

        let schema = TableSchema::of::<T>()?;
        let statements = ddl::statements(&schema)?;
        {
            let conn = self.writer.lock();
            for sql in &statements {
                debug!(table = T::TABLE, %sql, "ddl");
                conn.execute_batch(sql)?;
            }
        }
        info!(table = T::TABLE, fields = schema.len(), "table ready");

        let mut schemas = self.schemas.write();
        let schema = schemas.entry(id).or_insert_with(|| Arc::new(schema));

        Ok(Arc::clone(schema))
    }

    /// Run `f` holding the exclusive write lock.
    pub(crate) fn with_writer<R>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let mut conn = self.writer.lock();
        f(&mut conn)
    }

    /// Run `f` on a read connection, without the write lock when the store
    /// has read connections.
    pub(crate) fn with_reader<R>(
        &self,
        f: impl FnOnce(&Connection) -> Result<R, Error>,
    ) -> Result<R, Error> {
        if self.readers.is_empty() {
            let conn = self.writer.lock();
            return f(&conn);
        }

        let n = self.next_reader.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[n].lock();
        f(&conn)
    }

    pub(crate) fn record(&self, event: MetricsEvent) {
        self.metrics.unwrap_or(&GlobalMetricsSink).record(event);
    }
}

fn open_reader(path: &Path, config: &StoreConfig) -> rusqlite::Result<Connection> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(config.busy_timeout())?;

    Ok(conn)
}
