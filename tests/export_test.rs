//! Integration test for Arrow/Parquet export of an overview table
//!
//! Builds an overview from an in-memory store, writes it to Parquet and
//! reads it back with the Arrow reader.

use arrow::array::{Array, Float64Array, StringArray, TimestampSecondArray};
use arrow::datatypes::{DataType, TimeUnit};
use bench_overview::config::{DEFAULT_BENCHMARK_RESULT_TYPE, DEFAULT_TRAINER_TYPE};
use bench_overview::store::{Artifact, Event, Execution, InMemoryMetadataStore};
use bench_overview::table::export::{to_record_batch, write_parquet};
use bench_overview::{overview, Aggregator};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;

fn sample_store() -> InMemoryMetadataStore {
    let mut store = InMemoryMetadataStore::new();
    for (id, run, accuracy) in [(1_i64, 1_i64, 0.8), (2, 2, 0.9)] {
        store.add_execution(
            Execution::new(id, DEFAULT_TRAINER_TYPE)
                .with_property("run_id", "1600000000")
                .with_property("hparams", "['optimizer=adam']")
                .with_property("component_id", format!("EstimatorTrainer.bench.run_{run}_of_2")),
        );
        store.add_artifact(
            Artifact::new(id + 100, DEFAULT_BENCHMARK_RESULT_TYPE)
                .with_custom_property("benchmark", format!("bench.run_{run}_of_2"))
                .with_custom_property("run", run)
                .with_custom_property("num_runs", 2_i64)
                .with_custom_property("accuracy", accuracy),
        );
        store.add_event(Event::new(id, id + 100));
    }
    store
}

#[test]
fn test_record_batch_schema() {
    let table = overview(&sample_store(), None).unwrap();
    let batch = to_record_batch(&table).unwrap();

    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.num_columns(), table.num_columns() + 1);

    let schema = batch.schema();
    assert_eq!(schema.field(0).name(), "started_at");
    assert_eq!(
        schema.field(0).data_type(),
        &DataType::Timestamp(TimeUnit::Second, Some("UTC".into()))
    );
    let run = schema.field_with_name("run").unwrap();
    assert_eq!(run.data_type(), &DataType::Int64);
    let optimizer = schema.field_with_name("optimizer").unwrap();
    assert_eq!(optimizer.data_type(), &DataType::Utf8);
    let accuracy = schema.field_with_name("accuracy").unwrap();
    assert_eq!(accuracy.data_type(), &DataType::Float64);
}

#[test]
fn test_write_parquet_round_trip() {
    let table = overview(&sample_store(), Some(&[Aggregator::Mean])).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("overview.parquet");

    write_parquet(&table, &path).unwrap();

    let file = File::open(&path).unwrap();
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap();
    let batches: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
    assert_eq!(batches.len(), 1);

    let batch = &batches[0];
    assert_eq!(batch.num_rows(), 1);

    let started = batch
        .column(0)
        .as_any()
        .downcast_ref::<TimestampSecondArray>()
        .unwrap();
    assert_eq!(started.value(0), 1_600_000_000);

    let benchmark_index = batch.schema().index_of("benchmark").unwrap();
    let benchmark = batch
        .column(benchmark_index)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(benchmark.value(0), "bench");

    let mean_index = batch.schema().index_of("accuracy mean").unwrap();
    let mean = batch
        .column(mean_index)
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert!((mean.value(0) - 0.85).abs() < 1e-9);
    assert!(!mean.is_null(0));
}

#[test]
fn test_write_parquet_missing_directory() {
    let table = overview(&sample_store(), None).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("overview.parquet");

    let err = write_parquet(&table, &path).unwrap_err();
    assert!(matches!(err, bench_overview::Error::Io(_)));
}
