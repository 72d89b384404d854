//! Benchmark Overview Example
//!
//! Loads an exported metadata store snapshot and prints the raw and the
//! aggregated benchmark overview.
//!
//! Run with: cargo run --example overview_snapshot [snapshot.json] [aggregators...]
//!
//! Aggregators default to `mean std`. Set `RUST_LOG=bench_overview=debug` to
//! see the extraction stages.

use anyhow::Context;
use bench_overview::store::InMemoryMetadataStore;
use bench_overview::table::export::write_parquet;
use bench_overview::{overview, Aggregator};
use tracing_subscriber::EnvFilter;

const DEFAULT_SNAPSHOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/data/benchmark_snapshot.json");

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let snapshot = args.next().unwrap_or_else(|| DEFAULT_SNAPSHOT.to_string());
    let mut aggregators = args
        .map(|name| name.parse::<Aggregator>())
        .collect::<Result<Vec<_>, _>>()?;
    if aggregators.is_empty() {
        aggregators = vec![Aggregator::Mean, Aggregator::Std];
    }

    println!("=== Benchmark Overview ===\n");

    let store = InMemoryMetadataStore::from_json_file(&snapshot)
        .with_context(|| format!("loading snapshot {snapshot}"))?;
    println!(
        "Snapshot: {} executions, {} artifacts, {} events\n",
        store.execution_count(),
        store.artifact_count(),
        store.event_count()
    );

    // -------------------------------------------------------------------------
    // 1. One row per benchmark run
    // -------------------------------------------------------------------------
    println!("1. Raw overview");
    let raw = overview(&store, None)?;
    println!("{raw}");

    // -------------------------------------------------------------------------
    // 2. Repetitions collapsed
    // -------------------------------------------------------------------------
    let names: Vec<&str> = aggregators.iter().map(Aggregator::name).collect();
    println!("2. Aggregated overview ({})", names.join(", "));
    let aggregated = overview(&store, Some(&aggregators))?;
    println!("{aggregated}");

    // -------------------------------------------------------------------------
    // 3. Parquet export
    // -------------------------------------------------------------------------
    let path = std::env::temp_dir().join("benchmark_overview.parquet");
    write_parquet(&aggregated, &path)?;
    println!("3. Wrote aggregated overview to {}", path.display());

    Ok(())
}
