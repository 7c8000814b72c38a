use super::store;
use crate::{
    config::StoreConfig,
    db::{ListOptions, Store},
    obs::{metrics_report, metrics_reset},
    test_fixtures::{Cluster, Namespace, Widget},
};
use std::{sync::Arc, thread};
use tempfile::TempDir;

fn file_store(dir: &TempDir) -> Store {
    Store::open(StoreConfig::file(dir.path().join("discovery.db"))).unwrap()
}

#[test]
fn create_is_idempotent() {
    let store = store();

    store.create::<Cluster>().unwrap();
    store.create::<Cluster>().unwrap();
    store.create::<Namespace>().unwrap();

    let tables: i64 = store
        .with_reader(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )?)
        })
        .unwrap();
    // Label, Cluster, Namespace
    assert_eq!(tables, 3);
}

#[test]
fn file_store_persists_across_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let store = file_store(&dir);
        store
            .insert(&Widget::new(1, "g1", "a").with_labels([("env", "prod")]))
            .unwrap();
    }

    let store = file_store(&dir);
    let mut got = Widget::new(1, "", "");
    store.get(&mut got).unwrap();
    assert_eq!(got, Widget::new(1, "g1", "a"));
    assert_eq!(store.labels(&got).unwrap().len(), 1);
}

#[test]
fn readers_see_committed_writes() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    assert_eq!(store.config().readers, 4);

    for id in 1..=8 {
        store.insert(&Widget::new(id, "g", "w")).unwrap();
        // round-robin over every reader connection
        assert_eq!(
            store
                .count(&Widget::default(), &ListOptions::new())
                .unwrap(),
            u64::try_from(id).unwrap()
        );
    }
}

#[test]
fn concurrent_writers_never_duplicate_rows() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(file_store(&dir));
    store.create::<Widget>().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for id in 1..=25 {
                    let name = format!("t{t}");
                    let widget =
                        Widget::new(id, "g", &name).with_labels([("writer", name.as_str())]);

                    store.insert(&widget).unwrap();
                    store
                        .list(&Widget::new(0, "g", ""), &ListOptions::new())
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(
        store.count(&Widget::default(), &ListOptions::new()).unwrap(),
        25
    );
    // one label per widget survives the rewrites
    for id in 1..=25 {
        assert_eq!(store.labels(&Widget::new(id, "", "")).unwrap().len(), 1);
    }
}

#[test]
fn global_metrics_count_calls_per_table() {
    metrics_reset();
    let store = store();

    store
        .insert(&Cluster {
            pk: 1,
            name: "source".into(),
            ..Cluster::default()
        })
        .unwrap();
    store
        .insert(&Cluster {
            pk: 1,
            name: "renamed".into(),
            ..Cluster::default()
        })
        .unwrap();
    let _ = store.get(&mut Cluster {
        pk: 2,
        ..Cluster::default()
    });

    // other tests share the global counters; only read this table
    let report = metrics_report();
    let cluster = &report.tables["Cluster"];
    assert!(cluster.insert_calls >= 2);
    assert!(cluster.upsert_fallbacks >= 1);
    assert!(cluster.not_found >= 1);
    assert!(report.ops.insert_calls >= cluster.insert_calls);
}
