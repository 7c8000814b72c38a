//! Metrics sink boundary.
//!
//! This module is the only bridge between gateway logic and the global
//! counter state in `obs::metrics`.

use crate::obs::metrics;
use std::fmt::{self, Display};

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ExecKind {
    Count,
    Delete,
    Get,
    Insert,
    List,
    Update,
}

impl Display for ExecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Count => "count",
            Self::Delete => "delete",
            Self::Get => "get",
            Self::Insert => "insert",
            Self::List => "list",
            Self::Update => "update",
        };

        f.write_str(label)
    }
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    ExecStart {
        kind: ExecKind,
        table: &'static str,
    },
    ExecFinish {
        kind: ExecKind,
        table: &'static str,
        rows: u64,
    },
    /// An INSERT collided and was applied as UPDATE.
    UpsertFallback { table: &'static str },
    NotFound {
        kind: ExecKind,
        table: &'static str,
    },
    LabelRewrite {
        table: &'static str,
        removed: u64,
        inserted: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent);
}

///
/// GlobalMetricsSink
/// Default process-wide sink writing into the global counters.
///

pub struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::ExecStart { kind, table } => {
                metrics::with_state_mut(|m| {
                    let (ops, entry) = m.split(table);
                    ops.bump_calls(kind);
                    entry.bump_calls(kind);
                });
            }

            MetricsEvent::ExecFinish { kind, table, rows } => {
                metrics::with_state_mut(|m| {
                    let (ops, entry) = m.split(table);
                    ops.add_rows(kind, rows);
                    entry.add_rows(kind, rows);
                });
            }

            MetricsEvent::UpsertFallback { table } => {
                metrics::with_state_mut(|m| {
                    let (ops, entry) = m.split(table);
                    ops.upsert_fallbacks = ops.upsert_fallbacks.saturating_add(1);
                    entry.upsert_fallbacks = entry.upsert_fallbacks.saturating_add(1);
                });
            }

            MetricsEvent::NotFound { table, .. } => {
                metrics::with_state_mut(|m| {
                    let (ops, entry) = m.split(table);
                    ops.not_found = ops.not_found.saturating_add(1);
                    entry.not_found = entry.not_found.saturating_add(1);
                });
            }

            MetricsEvent::LabelRewrite {
                table,
                removed,
                inserted,
            } => {
                metrics::with_state_mut(|m| {
                    let (ops, _) = m.split(table);
                    ops.label_removes = ops.label_removes.saturating_add(removed);
                    ops.label_inserts = ops.label_inserts.saturating_add(inserted);
                });
            }
        }
    }
}
