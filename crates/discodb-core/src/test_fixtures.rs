//! Record types shared by the unit tests.

use crate::model::Labels;
use discodb_derive::{Fields, Record};

///
/// Widget
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Record)]
pub struct Widget {
    #[sql("pk")]
    pub id: i64,
    #[sql("key")]
    pub group: String,
    pub name: String,
    #[record(labels)]
    pub labels: Labels,
}

impl Widget {
    pub fn new(id: i64, group: &str, name: &str) -> Self {
        Self {
            id,
            group: group.to_string(),
            name: name.to_string(),
            labels: Labels::default(),
        }
    }

    pub fn with_labels(mut self, labels: impl Into<Labels>) -> Self {
        self.labels = labels.into();
        self
    }
}

///
/// Cluster
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Record)]
pub struct Cluster {
    #[sql("pk")]
    pub pk: i64,
    #[sql("key")]
    pub name: String,
    #[sql("const")]
    pub url: String,
    #[record(labels)]
    pub labels: Labels,
}

///
/// Namespace
/// Natural keys only, one of them a foreign key. The keys also form a
/// unique group so a repeated insert collides.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Record)]
pub struct Namespace {
    #[sql("key, unique(ident), fk:Cluster(pk)")]
    pub cluster: i64,
    #[sql("key, unique(ident)")]
    pub name: String,
    #[sql("index(by_phase)")]
    pub phase: String,
    #[record(labels)]
    pub labels: Labels,
}

///
/// Meta
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Fields)]
pub struct Meta {
    #[sql("key")]
    pub namespace: String,
    #[sql("key")]
    pub name: String,
}

///
/// Pod
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Record)]
pub struct Pod {
    #[record(embed)]
    pub meta: Meta,
    #[sql("index(by_node), unique(addr)")]
    pub node: String,
    #[sql("unique(addr)")]
    pub ip: String,
    pub restarts: u16,
    #[record(labels)]
    pub labels: Labels,
}

///
/// Event
/// No key of any kind.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Record)]
pub struct Event {
    pub reason: String,
    pub count: u32,
}

///
/// Tag
/// Keys only; nothing to update.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Record)]
pub struct Tag {
    #[sql("key, unique(name)")]
    pub name: String,
}

///
/// Blob
///

#[derive(Clone, Debug, Default, Record)]
pub struct Blob {
    #[sql("pk")]
    pub id: i64,
    pub data: Vec<u8>,
}

///
/// TwoPk
///

#[derive(Clone, Debug, Default, Record)]
pub struct TwoPk {
    #[sql("pk")]
    pub a: i64,
    #[sql("pk")]
    pub b: i64,
}

///
/// Hidden
///

#[derive(Clone, Debug, Default, Record)]
pub struct Hidden {
    #[sql("pk")]
    pub id: i64,
    pub _note: String,
}

///
/// Shadowed
/// Flattened `name` collides with the embedded one.
///

#[derive(Clone, Debug, Default, Record)]
pub struct Shadowed {
    pub name: String,
    #[record(embed)]
    pub meta: Meta,
}

///
/// Shadow
///

#[derive(Clone, Debug, Default, Record)]
#[record(table = "Label")]
pub struct Shadow {
    #[sql("pk")]
    pub id: i64,
}

///
/// Rack
///

#[derive(Clone, Debug, Default, Record)]
pub struct Rack {
    #[sql("pk")]
    pub id: i64,
    #[sql("index(node)")]
    pub node: String,
}

///
/// RackNode
/// Table name equal to `Rack` joined with its index group name.
///

#[derive(Clone, Debug, Default, Record)]
#[record(table = "Rack_node")]
pub struct RackNode {
    #[sql("key")]
    pub serial: String,
}

///
/// Big
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Record)]
pub struct Big {
    #[sql("pk")]
    pub id: i64,
    pub n: u64,
}

///
/// Empty
///

#[derive(Clone, Debug, Default, Record)]
pub struct Empty {}
