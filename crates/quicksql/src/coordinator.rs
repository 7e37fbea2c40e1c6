//! Dual-store coordinator.
//!
//! Presents one logical key-value store over a persistent [`RecordStore`] and an
//! optional in-memory mirror:
//!
//! - **Reads**: served from the mirror when present, otherwise from the persistent store.
//!   With a mirror, the persistent store is never consulted on read.
//! - **Writes**: applied to the persistent store first, then to the mirror.
//!
//! The two writes are not one transaction. If the persistent write succeeds and
//! the mirror write fails, the stores stay diverged until the next construction
//! reloads the mirror. Numeric operations are a plain get-modify-set and can lose
//! updates when several callers mutate the same key concurrently.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use quicksql_core::codec::{decode_as, decode_value, encode_value};
use quicksql_core::numeric::{self, NumericOp};
use quicksql_core::storage::RecordStore;

use crate::config::Config;
use crate::error::Result;
use crate::storage::SqliteStore;

/// Key-value store over a persistent store `P` and an optional mirror `M`.
///
/// # Type Parameters
///
/// * `P` - The persistent, authoritative store
/// * `M` - The volatile mirror store
pub struct DualStore<P, M = P>
where
    P: RecordStore,
    M: RecordStore,
{
    persistent: Arc<P>,
    memory: Option<Arc<M>>,
}

impl<P> DualStore<P, P>
where
    P: RecordStore,
{
    /// Creates a coordinator with no mirror; every call goes to `persistent`.
    pub fn persistent_only(persistent: Arc<P>) -> Self {
        Self {
            persistent,
            memory: None,
        }
    }
}

impl<P, M> DualStore<P, M>
where
    P: RecordStore,
    M: RecordStore,
{
    /// Creates a coordinator and, when a mirror is given, copies every record of
    /// `persistent` into it.
    ///
    /// The copy runs exactly once, here, as a single transaction on the mirror.
    pub async fn new(persistent: Arc<P>, memory: Option<Arc<M>>) -> Result<Self> {
        let store = Self { persistent, memory };
        store.bulk_load().await?;
        Ok(store)
    }

    /// Creates a coordinator that mirrors `persistent` into `memory`.
    pub async fn with_memory_mirror(persistent: Arc<P>, memory: Arc<M>) -> Result<Self> {
        Self::new(persistent, Some(memory)).await
    }

    /// Returns `true` if reads are served from an in-memory mirror.
    pub fn has_memory_mirror(&self) -> bool {
        self.memory.is_some()
    }

    pub(crate) fn persistent(&self) -> &P {
        &self.persistent
    }

    pub(crate) fn memory(&self) -> Option<&M> {
        self.memory.as_deref()
    }

    async fn bulk_load(&self) -> Result<()> {
        let Some(memory) = &self.memory else {
            return Ok(());
        };

        let records = self.persistent.all_records().await?;
        let count = records.len();
        memory.upsert_many(records).await?;

        tracing::info!(records = count, "Loaded persistent store into memory mirror");
        Ok(())
    }

    /// Gets the value stored under `key`, or `None` if the key is absent.
    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        let text = self.read_text(key).await?;
        Ok(text.as_deref().map(decode_value).transpose()?)
    }

    /// Gets the value stored under `key` decoded as `T`.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let text = self.read_text(key).await?;
        Ok(text.as_deref().map(decode_as).transpose()?)
    }

    async fn read_text(&self, key: &str) -> Result<Option<String>> {
        let text = match &self.memory {
            Some(memory) => memory.get_record(key).await?,
            None => self.persistent.get_record(key).await?,
        };

        tracing::trace!(key = %key, hit = text.is_some(), "Read record");
        Ok(text)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub async fn set<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> Result<()> {
        let text = encode_value(value)?;
        self.write_through(key, &text).await
    }

    async fn write_through(&self, key: &str, text: &str) -> Result<()> {
        self.persistent.upsert_record(key, text).await?;

        if let Some(memory) = &self.memory {
            if let Err(err) = memory.upsert_record(key, text).await {
                tracing::error!(
                    key = %key,
                    error = %err,
                    "Memory mirror write failed, stores diverged"
                );
                return Err(err.into());
            }
        }

        tracing::debug!(key = %key, "Record written");
        Ok(())
    }

    /// Deletes the record stored under `key`. Deleting an absent key is a no-op.
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.persistent.delete_record(key).await?;

        if let Some(memory) = &self.memory {
            if let Err(err) = memory.delete_record(key).await {
                tracing::error!(
                    key = %key,
                    error = %err,
                    "Memory mirror delete failed, stores diverged"
                );
                return Err(err.into());
            }
        }

        tracing::debug!(key = %key, "Record deleted");
        Ok(())
    }

    /// Deletes every record from both stores. Always returns `true` on success.
    pub async fn clear(&self) -> Result<bool> {
        self.persistent.delete_all().await?;

        if let Some(memory) = &self.memory {
            if let Err(err) = memory.delete_all().await {
                tracing::error!(error = %err, "Memory mirror clear failed, stores diverged");
                return Err(err.into());
            }
        }

        tracing::info!("All records cleared");
        Ok(true)
    }

    /// Adds `delta` to the number under `key` and returns the new value.
    ///
    /// An absent key counts as 0.
    pub async fn add(&self, key: &str, delta: impl Into<Value>) -> Result<Value> {
        self.apply_numeric(NumericOp::Add, key, delta.into()).await
    }

    /// Subtracts `delta` from the number under `key` and returns the new value.
    ///
    /// The key must exist.
    pub async fn sub(&self, key: &str, delta: impl Into<Value>) -> Result<Value> {
        self.apply_numeric(NumericOp::Sub, key, delta.into()).await
    }

    /// Multiplies the number under `key` by `delta` and returns the new value.
    ///
    /// The key must exist.
    pub async fn mul(&self, key: &str, delta: impl Into<Value>) -> Result<Value> {
        self.apply_numeric(NumericOp::Mul, key, delta.into()).await
    }

    /// Divides the number under `key` by `delta` and returns the new value.
    ///
    /// An absent key counts as 1. Dividing by zero fails before anything is read.
    pub async fn div(&self, key: &str, delta: impl Into<Value>) -> Result<Value> {
        self.apply_numeric(NumericOp::Div, key, delta.into()).await
    }

    async fn apply_numeric(&self, op: NumericOp, key: &str, delta: Value) -> Result<Value> {
        numeric::check_operand(op, key, &delta)?;

        let current = self.get(key).await?;
        let updated = numeric::apply(op, key, current.as_ref(), &delta)?;

        self.set(key, &updated).await?;
        tracing::debug!(key = %key, op = %op, value = %updated, "Numeric update applied");
        Ok(updated)
    }
}

impl DualStore<SqliteStore, SqliteStore> {
    /// Opens the SQLite database described by `config`.
    ///
    /// With `hold_data_in_memory`, a second in-memory SQLite database is created
    /// and loaded with every record of the persistent one.
    pub async fn open(config: &Config) -> Result<Self> {
        let persistent = Arc::new(SqliteStore::open(&config.sqlite_path).await?);

        let memory = if config.hold_data_in_memory {
            Some(Arc::new(SqliteStore::open_in_memory().await?))
        } else {
            None
        };

        tracing::info!(
            path = %config.sqlite_path.display(),
            memory_mirror = config.hold_data_in_memory,
            "Opening quicksql store"
        );

        Self::new(persistent, memory).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use quicksql_core::numeric::NumericError;
    use quicksql_core::storage::{Record, Result as StoreResult, StoreError};
    use serde::Deserialize;
    use serde_json::json;

    use crate::error::Error;
    use crate::storage::InMemoryStore;

    // Store that counts reads, to check which store serves `get`
    struct CountingStore {
        inner: InMemoryStore,
        reads: AtomicUsize,
    }

    impl CountingStore {
        fn new(inner: InMemoryStore) -> Self {
            Self {
                inner,
                reads: AtomicUsize::new(0),
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RecordStore for CountingStore {
        async fn get_record(&self, key: &str) -> StoreResult<Option<String>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get_record(key).await
        }

        async fn upsert_record(&self, key: &str, value: &str) -> StoreResult<()> {
            self.inner.upsert_record(key, value).await
        }

        async fn delete_record(&self, key: &str) -> StoreResult<()> {
            self.inner.delete_record(key).await
        }

        async fn delete_all(&self) -> StoreResult<()> {
            self.inner.delete_all().await
        }

        async fn all_records(&self) -> StoreResult<Vec<Record>> {
            self.inner.all_records().await
        }

        async fn upsert_many(&self, records: Vec<Record>) -> StoreResult<()> {
            self.inner.upsert_many(records).await
        }
    }

    // Store whose writes always fail, to simulate a broken mirror
    struct FailingStore;

    fn disk_full() -> StoreError {
        StoreError::QueryFailed("database or disk is full".to_string())
    }

    #[async_trait]
    impl RecordStore for FailingStore {
        async fn get_record(&self, _key: &str) -> StoreResult<Option<String>> {
            Ok(None)
        }

        async fn upsert_record(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(disk_full())
        }

        async fn delete_record(&self, _key: &str) -> StoreResult<()> {
            Err(disk_full())
        }

        async fn delete_all(&self) -> StoreResult<()> {
            Err(disk_full())
        }

        async fn all_records(&self) -> StoreResult<Vec<Record>> {
            Ok(Vec::new())
        }

        async fn upsert_many(&self, records: Vec<Record>) -> StoreResult<()> {
            if records.is_empty() {
                Ok(())
            } else {
                Err(disk_full())
            }
        }
    }

    async fn mirrored() -> (InMemoryStore, InMemoryStore, DualStore<InMemoryStore>) {
        let persistent = InMemoryStore::new();
        let memory = InMemoryStore::new();
        let store = DualStore::with_memory_mirror(
            Arc::new(persistent.clone()),
            Arc::new(memory.clone()),
        )
        .await
        .unwrap();
        (persistent, memory, store)
    }

    // ==================== get / set / delete ====================

    #[tokio::test]
    async fn test_set_and_get_roundtrip() {
        let (_, _, store) = mirrored().await;
        let values = [
            json!(null),
            json!(true),
            json!(42),
            json!(-0.25),
            json!("text"),
            json!([1, "two", [3]]),
            json!({ "nested": { "list": [1, 2], "flag": false } }),
        ];

        for (i, value) in values.iter().enumerate() {
            let key = format!("key{i}");
            store.set(&key, value).await.unwrap();
            assert_eq!(store.get(&key).await.unwrap().as_ref(), Some(value));
        }
    }

    #[tokio::test]
    async fn test_roundtrip_without_mirror() {
        let store = DualStore::persistent_only(Arc::new(InMemoryStore::new()));
        assert!(!store.has_memory_mirror());

        store.set("k", &json!({ "a": 1 })).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(json!({ "a": 1 })));
    }

    #[tokio::test]
    async fn test_get_absent_is_none() {
        let (_, _, store) = mirrored().await;
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_stored_null_is_distinct_from_absent() {
        let (_, _, store) = mirrored().await;

        store.set("k", &Value::Null).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(Value::Null));
    }

    #[tokio::test]
    async fn test_get_as_typed() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Profile {
            name: String,
            level: u32,
        }

        let (_, _, store) = mirrored().await;
        let profile = Profile {
            name: "ada".to_string(),
            level: 3,
        };

        store.set("profile", &profile).await.unwrap();

        assert_eq!(store.get_as::<Profile>("profile").await.unwrap(), Some(profile));
        assert!(matches!(
            store.get_as::<Vec<u8>>("profile").await,
            Err(Error::Codec(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_from_both_stores() {
        let (persistent, memory, store) = mirrored().await;

        store.set("k", &1).await.unwrap();
        store.delete("k").await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(persistent.is_empty().await);
        assert!(memory.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_absent_is_ok() {
        let (_, _, store) = mirrored().await;
        assert!(store.delete("missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_mirror_matches_persistent_after_writes() {
        let (persistent, memory, store) = mirrored().await;

        store.set("a", &1).await.unwrap();
        store.set("b", &"two").await.unwrap();
        store.set("a", &json!([1])).await.unwrap();
        store.delete("b").await.unwrap();
        store.set("c", &json!({ "x": null })).await.unwrap();
        store.add("d", 4).await.unwrap();

        for key in ["a", "b", "c", "d"] {
            assert_eq!(
                persistent.get_record(key).await.unwrap(),
                memory.get_record(key).await.unwrap(),
                "stores diverged on {key}"
            );
        }
    }

    #[tokio::test]
    async fn test_reads_never_touch_persistent_with_mirror() {
        let persistent = Arc::new(CountingStore::new(InMemoryStore::new()));
        let memory = Arc::new(CountingStore::new(InMemoryStore::new()));
        let store = DualStore::with_memory_mirror(persistent.clone(), memory.clone())
            .await
            .unwrap();

        store.set("k", &1).await.unwrap();
        store.get("k").await.unwrap();
        store.get("missing").await.unwrap();
        store.add("k", 1).await.unwrap();

        assert_eq!(persistent.reads(), 0);
        assert_eq!(memory.reads(), 3);
    }

    #[tokio::test]
    async fn test_typed_reads_never_touch_persistent_with_mirror() {
        let persistent = Arc::new(CountingStore::new(InMemoryStore::new()));
        let memory = Arc::new(CountingStore::new(InMemoryStore::new()));
        let store = DualStore::with_memory_mirror(persistent.clone(), memory.clone())
            .await
            .unwrap();

        store.set("k", &[1, 2]).await.unwrap();
        let value: Option<Vec<i64>> = store.get_as("k").await.unwrap();

        assert_eq!(value, Some(vec![1, 2]));
        assert_eq!(persistent.reads(), 0);
        assert_eq!(memory.reads(), 1);
    }

    #[tokio::test]
    async fn test_reads_use_persistent_without_mirror() {
        let persistent = Arc::new(CountingStore::new(InMemoryStore::new()));
        let store = DualStore::persistent_only(persistent.clone());

        store.get("k").await.unwrap();

        assert_eq!(persistent.reads(), 1);
    }

    #[tokio::test]
    async fn test_external_persistent_write_is_not_seen_through_mirror() {
        let (persistent, _, store) = mirrored().await;

        store.set("k", &1).await.unwrap();
        persistent.upsert_record("k", "2").await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(json!(1)));
    }

    // ==================== partial dual-write failure ====================

    #[tokio::test]
    async fn test_failed_mirror_write_leaves_stores_diverged() {
        let persistent = InMemoryStore::new();
        let store = DualStore::new(Arc::new(persistent.clone()), Some(Arc::new(FailingStore)))
            .await
            .unwrap();

        let result = store.set("k", &7).await;

        assert_eq!(result, Err(Error::Store(disk_full())));
        assert_eq!(persistent.get_record("k").await.unwrap(), Some("7".to_string()));
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_mirror_delete_propagates() {
        let persistent = InMemoryStore::new();
        let store = DualStore::new(Arc::new(persistent.clone()), Some(Arc::new(FailingStore)))
            .await
            .unwrap();
        persistent.upsert_record("k", "1").await.unwrap();

        let result = store.delete("k").await;

        assert_eq!(result, Err(Error::Store(disk_full())));
        assert!(persistent.is_empty().await);
    }

    #[tokio::test]
    async fn test_failed_mirror_clear_propagates() {
        let persistent = InMemoryStore::new();
        let store = DualStore::new(Arc::new(persistent.clone()), Some(Arc::new(FailingStore)))
            .await
            .unwrap();
        persistent.upsert_record("a", "1").await.unwrap();

        let result = store.clear().await;

        assert_eq!(result, Err(Error::Store(disk_full())));
        assert!(persistent.is_empty().await);
    }

    #[tokio::test]
    async fn test_bulk_load_failure_fails_construction() {
        let persistent = InMemoryStore::with_records([Record::new("k", "1")]);

        let result = DualStore::new(Arc::new(persistent), Some(Arc::new(FailingStore))).await;

        assert!(matches!(result, Err(Error::Store(_))));
    }

    // ==================== clear / bulk load ====================

    #[tokio::test]
    async fn test_clear_empties_both_stores() {
        let (persistent, memory, store) = mirrored().await;

        store.set("a", &1).await.unwrap();
        store.set("b", &2).await.unwrap();

        assert!(store.clear().await.unwrap());
        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.get("b").await.unwrap(), None);
        assert!(persistent.is_empty().await);
        assert!(memory.is_empty().await);
    }

    #[tokio::test]
    async fn test_bulk_load_copies_existing_records() {
        let persistent = InMemoryStore::with_records([
            Record::new("a", "1"),
            Record::new("b", "\"two\""),
            Record::new("c", "[3]"),
        ]);
        let memory = InMemoryStore::new();

        let store = DualStore::with_memory_mirror(Arc::new(persistent), Arc::new(memory.clone()))
            .await
            .unwrap();

        assert_eq!(memory.len().await, 3);
        assert_eq!(store.get("a").await.unwrap(), Some(json!(1)));
        assert_eq!(store.get("b").await.unwrap(), Some(json!("two")));
        assert_eq!(store.get("c").await.unwrap(), Some(json!([3])));
    }

    // ==================== numeric ops ====================

    #[tokio::test]
    async fn test_add_defaults_absent_to_zero() {
        let (_, _, store) = mirrored().await;

        assert_eq!(store.add("c", 5).await.unwrap(), json!(5));
        assert_eq!(store.get("c").await.unwrap(), Some(json!(5)));

        store.add("c", 5).await.unwrap();
        assert_eq!(store.get("c").await.unwrap(), Some(json!(10)));
    }

    #[tokio::test]
    async fn test_sub_and_mul_require_existing_value() {
        let (_, _, store) = mirrored().await;

        assert!(matches!(
            store.sub("missing", 1).await,
            Err(Error::Numeric(NumericError::TypeMismatch { .. }))
        ));
        assert!(matches!(
            store.mul("missing", 2).await,
            Err(Error::Numeric(NumericError::TypeMismatch { .. }))
        ));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sub_and_mul_reject_non_numeric_value() {
        let (_, _, store) = mirrored().await;
        store.set("name", &"ada").await.unwrap();

        assert!(matches!(
            store.sub("name", 1).await,
            Err(Error::Numeric(NumericError::TypeMismatch { ref found, .. })) if found == "string"
        ));
        assert!(matches!(
            store.mul("name", 2).await,
            Err(Error::Numeric(NumericError::TypeMismatch { ref found, .. })) if found == "string"
        ));
        assert_eq!(store.get("name").await.unwrap(), Some(json!("ada")));
    }

    #[tokio::test]
    async fn test_div_defaults_absent_to_one() {
        let (_, _, store) = mirrored().await;

        store.div("y", 2).await.unwrap();

        assert_eq!(store.get("y").await.unwrap(), Some(json!(0.5)));
    }

    #[tokio::test]
    async fn test_div_by_zero_fails_without_reading() {
        let persistent = Arc::new(CountingStore::new(InMemoryStore::new()));
        let memory = Arc::new(CountingStore::new(InMemoryStore::new()));
        let store = DualStore::with_memory_mirror(persistent, memory.clone())
            .await
            .unwrap();

        store.set("x", &"not a number").await.unwrap();

        assert_eq!(
            store.div("x", 0).await,
            Err(Error::Numeric(NumericError::DivideByZero))
        );
        assert_eq!(memory.reads(), 0);
    }

    #[tokio::test]
    async fn test_failed_numeric_op_does_not_write() {
        let (persistent, _, store) = mirrored().await;

        store.set("name", &"ada").await.unwrap();

        assert!(store.add("name", 1).await.is_err());
        assert!(store.add("name", "1").await.is_err());
        assert_eq!(store.get("name").await.unwrap(), Some(json!("ada")));
        assert_eq!(
            persistent.get_record("name").await.unwrap(),
            Some("\"ada\"".to_string())
        );
    }

    #[tokio::test]
    async fn test_numeric_scenario() {
        let (_, _, store) = mirrored().await;

        store.set("k1", &10).await.unwrap();
        store.add("k1", 5).await.unwrap();
        assert_eq!(store.get("k1").await.unwrap(), Some(json!(15)));

        store.sub("k1", 20).await.unwrap();
        assert_eq!(store.get("k1").await.unwrap(), Some(json!(-5)));

        store.mul("k1", 3).await.unwrap();
        assert_eq!(store.get("k1").await.unwrap(), Some(json!(-15)));

        assert_eq!(
            store.div("k1", 0).await,
            Err(Error::Numeric(NumericError::DivideByZero))
        );
        assert_eq!(store.get("k1").await.unwrap(), Some(json!(-15)));
    }

    #[tokio::test]
    async fn test_numeric_ops_write_integers_as_integers() {
        let (persistent, _, store) = mirrored().await;

        store.set("k", &10).await.unwrap();
        store.div("k", 2).await.unwrap();

        assert_eq!(persistent.get_record("k").await.unwrap(), Some("5".to_string()));
    }
}
