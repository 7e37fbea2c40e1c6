//! SQLite record store.

use std::path::Path;

use async_trait::async_trait;
use tokio_rusqlite::Connection;

use quicksql_core::storage::{Record, RecordStore, Result, StoreError};

use super::error::map_tokio_rusqlite_error;
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// JSON text for a SQL NULL `value` column, which other writers may leave behind.
const NULL_VALUE: &str = "null";

fn value_text(value: Option<String>) -> String {
    value.unwrap_or_else(|| NULL_VALUE.to_string())
}

/// SQLite-backed record store.
///
/// Each store owns one connection. Statements run on the connection's background
/// thread, one at a time, in the order they are issued.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens a file-based store in write-ahead logging mode.
    ///
    /// The database file and the `json` table are created if they don't exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;
        let mode = Self::enable_wal(&conn).await?;

        tracing::debug!(path = %path.display(), journal_mode = %mode, "Opened SQLite store");
        Ok(Self { conn })
    }

    /// Opens a volatile in-memory store.
    ///
    /// Data is lost when the store is dropped.
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        tracing::debug!("Opened in-memory SQLite store");
        Ok(Self { conn })
    }

    /// Returns the journal mode reported by SQLite (e.g. `wal`, `memory`).
    pub async fn journal_mode(&self) -> Result<String> {
        self.conn
            .call(|conn| {
                conn.pragma_query_value(None, "journal_mode", |row| row.get::<_, String>(0))
                    .map_err(wrap_err)
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(map_tokio_rusqlite_error)
    }

    async fn enable_wal(conn: &Connection) -> Result<String> {
        conn.call(|conn| {
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                row.get::<_, String>(0)
            })
            .map_err(wrap_err)
        })
        .await
        .map_err(map_tokio_rusqlite_error)
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn get_record(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare_cached(schema::SELECT_VALUE_BY_KEY)
                    .map_err(wrap_err)?;
                match stmt.query_row([&key], |row| row.get::<_, Option<String>>(0)) {
                    Ok(value) => Ok(Some(value_text(value))),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn upsert_record(&self, key: &str, value: &str) -> Result<()> {
        let key = key.to_string();
        let value = value.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare_cached(schema::UPSERT).map_err(wrap_err)?;
                stmt.execute([&key, &value]).map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn delete_record(&self, key: &str) -> Result<()> {
        let key = key.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare_cached(schema::DELETE_BY_KEY)
                    .map_err(wrap_err)?;
                stmt.execute([&key]).map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn delete_all(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                conn.execute(schema::DELETE_ALL, []).map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn all_records(&self) -> Result<Vec<Record>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(schema::SELECT_ALL).map_err(wrap_err)?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok(Record::new(
                            row.get::<_, String>(0)?,
                            value_text(row.get::<_, Option<String>>(1)?),
                        ))
                    })
                    .map_err(wrap_err)?;

                let mut records = Vec::new();
                for row_result in rows {
                    records.push(row_result.map_err(wrap_err)?);
                }
                Ok(records)
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn upsert_many(&self, records: Vec<Record>) -> Result<()> {
        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                {
                    let mut stmt = tx.prepare_cached(schema::UPSERT).map_err(wrap_err)?;
                    for record in &records {
                        stmt.execute([&record.key, &record.value])
                            .map_err(wrap_err)?;
                    }
                }
                tx.commit().map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }
}
