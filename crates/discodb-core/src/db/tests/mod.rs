mod store;

use crate::{
    db::Store,
    obs::{MetricsEvent, MetricsSink},
};
use parking_lot::Mutex;

/// Fresh in-memory store.
fn store() -> Store {
    Store::in_memory().unwrap()
}

///
/// CaptureSink
/// Records events for assertions; leaked so it can be `'static`.
///

#[derive(Default)]
struct CaptureSink {
    events: Mutex<Vec<MetricsEvent>>,
}

impl CaptureSink {
    fn leaked() -> &'static Self {
        Box::leak(Box::default())
    }

    fn events(&self) -> Vec<MetricsEvent> {
        self.events.lock().clone()
    }
}

impl MetricsSink for CaptureSink {
    fn record(&self, event: MetricsEvent) {
        self.events.lock().push(event);
    }
}
