//! quicksql - a JSON key-value store on SQLite with an optional in-memory mirror.
//!
//! ```ignore
//! use quicksql::{Config, QuickSql};
//!
//! let db = QuickSql::open(&Config::new("Database.db")).await?;
//! db.set("visits", &0).await?;
//! db.add("visits", 1).await?;
//! assert_eq!(db.get("visits").await?, Some(serde_json::json!(1)));
//! ```

pub mod bench;
pub mod config;
pub mod coordinator;
pub mod diagnostics;
pub mod error;
pub mod storage;

pub use config::Config;
pub use coordinator::DualStore;
pub use diagnostics::PingReport;
pub use error::{Error, Result};
pub use storage::{InMemoryStore, SqliteStore};

/// The SQLite-backed store: a persistent database plus an optional in-memory mirror.
pub type QuickSql = DualStore<SqliteStore, SqliteStore>;
