//! SQLite entity store implementation.
//!
//! Uses `rusqlite` behind a `tokio-rusqlite` connection. Schema and SQL
//! constants live in [`schema`]; per-entity row binding in [`table`].

mod error;
mod schema;
mod store;
mod table;

pub use store::SqliteStore;
pub use table::Table;
