//! SQLite storage backend.
//!
//! Implements [`RecordStore`](quicksql_core::storage::RecordStore) on a single
//! `json` table using `rusqlite` for the statements and `tokio-rusqlite` to run
//! them off the async executor.

mod error;
mod schema;
mod store;

pub use store::SqliteStore;
