//! Storage backend implementations.
//!
//! Concrete implementations of the [`RecordStore`](quicksql_core::storage::RecordStore)
//! trait defined in `quicksql_core::storage`.
//!
//! - [`SqliteStore`]: SQLite via `rusqlite` and `tokio-rusqlite`, file-backed
//!   (persistent) or in-memory (mirror)
//! - [`InMemoryStore`]: plain `HashMap`, for tests

pub mod inmemory;
pub mod sqlite;

pub use inmemory::InMemoryStore;
pub use sqlite::SqliteStore;
