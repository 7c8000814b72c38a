//! Observability: metrics events, the sink boundary, and process counters.
//!
//! Table gateways never touch counters directly; every event goes through a
//! [`MetricsSink`]. Log lines are emitted with `tracing` at the call site.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, TableCounters, metrics_report, metrics_reset};
pub use sink::{ExecKind, GlobalMetricsSink, MetricsEvent, MetricsSink};
