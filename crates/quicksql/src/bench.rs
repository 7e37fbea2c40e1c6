//! Throughput benchmark over the public key-value operations.
//!
//! Runs each operation `count` times against keys `bench:0..count` and times
//! every phase. The final phase deletes the keys again.

use std::time::Instant;

use serde::Serialize;

use quicksql_core::storage::RecordStore;

use crate::coordinator::DualStore;
use crate::error::Result;

/// Default number of keys per phase.
pub const DEFAULT_BENCH_COUNT: usize = 100_000;

/// Elapsed time of one benchmark phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTiming {
    pub phase: &'static str,
    pub elapsed_ms: f64,
}

impl PhaseTiming {
    fn since(phase: &'static str, started: Instant) -> Self {
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(phase, elapsed_ms, "Benchmark phase finished");
        Self { phase, elapsed_ms }
    }
}

/// Timings for a full benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchReport {
    pub count: usize,
    pub phases: Vec<PhaseTiming>,
}

fn bench_key(i: usize) -> String {
    format!("bench:{i}")
}

/// Runs set, get, add, sub, mul, div and delete over `count` keys.
pub async fn run_bench<P, M>(store: &DualStore<P, M>, count: usize) -> Result<BenchReport>
where
    P: RecordStore,
    M: RecordStore,
{
    let keys: Vec<String> = (0..count).map(bench_key).collect();
    let mut phases = Vec::with_capacity(7);

    let started = Instant::now();
    for (i, key) in keys.iter().enumerate() {
        store.set(key, &i).await?;
    }
    phases.push(PhaseTiming::since("set", started));

    let started = Instant::now();
    for key in &keys {
        store.get(key).await?;
    }
    phases.push(PhaseTiming::since("get", started));

    let started = Instant::now();
    for key in &keys {
        store.add(key, 1).await?;
    }
    phases.push(PhaseTiming::since("add", started));

    let started = Instant::now();
    for key in &keys {
        store.sub(key, 1).await?;
    }
    phases.push(PhaseTiming::since("sub", started));

    let started = Instant::now();
    for key in &keys {
        store.mul(key, 2).await?;
    }
    phases.push(PhaseTiming::since("mul", started));

    let started = Instant::now();
    for key in &keys {
        store.div(key, 2).await?;
    }
    phases.push(PhaseTiming::since("div", started));

    let started = Instant::now();
    for key in &keys {
        store.delete(key).await?;
    }
    phases.push(PhaseTiming::since("delete", started));

    Ok(BenchReport { count, phases })
}
