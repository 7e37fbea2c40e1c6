//! In-memory record store implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use quicksql_core::storage::{Record, RecordStore, Result};

/// In-memory record store.
///
/// Uses a HashMap wrapped in `Arc<RwLock<_>>` for thread-safe access. Clones
/// share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `records`.
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let map = records.into_iter().map(|r| (r.key, r.value)).collect();
        Self {
            records: Arc::new(RwLock::new(map)),
        }
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns `true` if the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn get_record(&self, key: &str) -> Result<Option<String>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn upsert_record(&self, key: &str, value: &str) -> Result<()> {
        self.records
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete_record(&self, key: &str) -> Result<()> {
        self.records.write().await.remove(key);
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        self.records.write().await.clear();
        Ok(())
    }

    async fn all_records(&self) -> Result<Vec<Record>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .map(|(key, value)| Record::new(key.clone(), value.clone()))
            .collect())
    }

    async fn upsert_many(&self, records: Vec<Record>) -> Result<()> {
        // A single write guard makes the batch atomic for readers.
        let mut map = self.records.write().await;
        for record in records {
            map.insert(record.key, record.value);
        }
        Ok(())
    }
}
