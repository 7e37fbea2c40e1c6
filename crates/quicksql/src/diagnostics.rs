//! Latency probe for the underlying stores.

use std::time::Instant;

use serde::Serialize;
use serde_json::json;

use quicksql_core::codec::encode_value;
use quicksql_core::storage::RecordStore;

use crate::coordinator::DualStore;
use crate::error::Result;

/// Key written and removed by [`DualStore::ping`].
pub const PING_KEY: &str = "pingTestKey";

/// Elapsed time of each phase of a ping, in fractional milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingReport {
    pub write_ms: f64,
    pub read_ms: f64,
    pub delete_ms: f64,
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

impl<P, M> DualStore<P, M>
where
    P: RecordStore,
    M: RecordStore,
{
    /// Writes, reads back and deletes [`PING_KEY`] on every store, timing each phase.
    ///
    /// If the process dies mid-ping the probe key can be left behind.
    pub async fn ping(&self) -> Result<PingReport> {
        let probe = encode_value(&json!({ "test": "value" }))?;

        let started = Instant::now();
        self.persistent().upsert_record(PING_KEY, &probe).await?;
        if let Some(memory) = self.memory() {
            memory.upsert_record(PING_KEY, &probe).await?;
        }
        let write_ms = elapsed_ms(started);

        let started = Instant::now();
        self.persistent().get_record(PING_KEY).await?;
        if let Some(memory) = self.memory() {
            memory.get_record(PING_KEY).await?;
        }
        let read_ms = elapsed_ms(started);

        let started = Instant::now();
        self.persistent().delete_record(PING_KEY).await?;
        if let Some(memory) = self.memory() {
            memory.delete_record(PING_KEY).await?;
        }
        let delete_ms = elapsed_ms(started);

        tracing::debug!(write_ms, read_ms, delete_ms, "Ping completed");
        Ok(PingReport {
            write_ms,
            read_ms,
            delete_ms,
        })
    }
}
