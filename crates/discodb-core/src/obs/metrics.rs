use crate::obs::sink::ExecKind;
use derive_more::{Deref, DerefMut};
use parking_lot::{Mutex, const_mutex};
use serde::Serialize;
use std::collections::BTreeMap;

///
/// TableCounters
/// Per-table call and row counters.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct TableCounters {
    pub insert_calls: u64,
    pub update_calls: u64,
    pub delete_calls: u64,
    pub get_calls: u64,
    pub list_calls: u64,
    pub count_calls: u64,

    pub rows_written: u64,
    pub rows_deleted: u64,
    pub rows_loaded: u64,

    pub upsert_fallbacks: u64,
    pub not_found: u64,
}

impl TableCounters {
    pub(crate) const fn bump_calls(&mut self, kind: ExecKind) {
        let slot = match kind {
            ExecKind::Count => &mut self.count_calls,
            ExecKind::Delete => &mut self.delete_calls,
            ExecKind::Get => &mut self.get_calls,
            ExecKind::Insert => &mut self.insert_calls,
            ExecKind::List => &mut self.list_calls,
            ExecKind::Update => &mut self.update_calls,
        };
        *slot = slot.saturating_add(1);
    }

    pub(crate) const fn add_rows(&mut self, kind: ExecKind, rows: u64) {
        let slot = match kind {
            ExecKind::Insert | ExecKind::Update => &mut self.rows_written,
            ExecKind::Delete => &mut self.rows_deleted,
            ExecKind::Get | ExecKind::List => &mut self.rows_loaded,
            ExecKind::Count => return,
        };
        *slot = slot.saturating_add(rows);
    }
}

///
/// EventOps
/// Process totals: the per-table counters summed, plus label index churn.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, Eq, PartialEq, Serialize)]
pub struct EventOps {
    #[deref]
    #[deref_mut]
    #[serde(flatten)]
    pub totals: TableCounters,

    pub label_inserts: u64,
    pub label_removes: u64,
}

///
/// EventState
///

#[derive(Clone, Debug, Default)]
pub(crate) struct EventState {
    ops: EventOps,
    tables: BTreeMap<&'static str, TableCounters>,
}

impl EventState {
    const fn new() -> Self {
        Self {
            ops: EventOps {
                totals: TableCounters {
                    insert_calls: 0,
                    update_calls: 0,
                    delete_calls: 0,
                    get_calls: 0,
                    list_calls: 0,
                    count_calls: 0,
                    rows_written: 0,
                    rows_deleted: 0,
                    rows_loaded: 0,
                    upsert_fallbacks: 0,
                    not_found: 0,
                },
                label_inserts: 0,
                label_removes: 0,
            },
            tables: BTreeMap::new(),
        }
    }

    /// Totals and the counters of one table, borrowed together.
    pub(crate) fn split(&mut self, table: &'static str) -> (&mut EventOps, &mut TableCounters) {
        (&mut self.ops, self.tables.entry(table).or_default())
    }
}

///
/// EventReport
/// Point-in-time copy of the process counters.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub tables: BTreeMap<String, TableCounters>,
}

static EVENT_STATE: Mutex<EventState> = const_mutex(EventState::new());

/// Borrow the counters mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    f(&mut EVENT_STATE.lock())
}

/// Snapshot the process counters.
#[must_use]
pub fn metrics_report() -> EventReport {
    let state = EVENT_STATE.lock();

    EventReport {
        ops: state.ops.clone(),
        tables: state
            .tables
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect(),
    }
}

/// Reset all counters (useful in tests).
pub fn metrics_reset() {
    *EVENT_STATE.lock() = EventState::new();
}
