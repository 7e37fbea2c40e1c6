//! In-memory storage backend.
//!
//! A `HashMap`-backed [`RecordStore`](quicksql_core::storage::RecordStore) for
//! tests and for wrapping in test doubles. Nothing is persisted.

mod store;

pub use store::InMemoryStore;
