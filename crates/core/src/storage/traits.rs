use async_trait::async_trait;

use super::{Record, Result};

/// A single logical table mapping key to serialized value.
///
/// Implementations execute each call fully before returning. Values are opaque
/// JSON text at this level.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Gets the encoded value stored under `key`.
    async fn get_record(&self, key: &str) -> Result<Option<String>>;

    /// Inserts or replaces the value stored under `key`.
    async fn upsert_record(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes the record stored under `key`. Deleting an absent key is not an error.
    async fn delete_record(&self, key: &str) -> Result<()>;

    /// Deletes every record.
    async fn delete_all(&self) -> Result<()>;

    /// Returns every record, in no particular order.
    async fn all_records(&self) -> Result<Vec<Record>>;

    /// Upserts all `records` as one atomic unit.
    async fn upsert_many(&self, records: Vec<Record>) -> Result<()>;
}
