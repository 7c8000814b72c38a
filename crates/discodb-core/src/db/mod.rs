//! Storage layer: DDL, statements, the label index and the gateways that
//! execute them against one SQLite database.

pub mod ddl;
pub mod label;
pub mod options;
pub mod sql;
pub mod store;
pub mod table;

#[cfg(test)]
mod tests;

// re-exports
pub use options::{ListOptions, Page};
pub use sql::Statement;
pub use store::Store;
pub use table::Table;
