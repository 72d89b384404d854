//! # bench-overview: Benchmark Results Overview
//!
//! Builds a tabular overview of benchmark runs recorded in a pipeline
//! metadata store. Trainer hyperparameters and published benchmark results
//! are joined per run and benchmark, and repeated runs of a benchmark can be
//! aggregated (mean, std, custom functions).
//!
//! ## Pipeline
//!
//! - **Extract**: trainer executions yield hyperparameters, result artifacts
//!   yield metrics ([`results`])
//! - **Merge**: entries are joined on a composite run/benchmark key
//! - **Shape**: contextual columns first, indexed by start time ([`Table`])
//! - **Aggregate**: optional per-group reduction over repeated runs
//!   ([`Aggregator`])
//!
//! ## Example Usage
//!
//! ```rust
//! use bench_overview::config::{DEFAULT_BENCHMARK_RESULT_TYPE, DEFAULT_TRAINER_TYPE};
//! use bench_overview::store::{Artifact, Event, Execution, InMemoryMetadataStore};
//! use bench_overview::{overview, Aggregator};
//!
//! let mut store = InMemoryMetadataStore::new();
//! for run in 1..=2_i64 {
//!     let execution_id = run * 10;
//!     let artifact_id = run * 100;
//!     store.add_execution(
//!         Execution::new(execution_id, DEFAULT_TRAINER_TYPE)
//!             .with_property("run_id", "1600000000")
//!             .with_property("hparams", "['lr=0.1']")
//!             .with_property("component_id", format!("EstimatorTrainer.mnist.run_{run}_of_2")),
//!     );
//!     store.add_artifact(
//!         Artifact::new(artifact_id, DEFAULT_BENCHMARK_RESULT_TYPE)
//!             .with_custom_property("benchmark", format!("mnist.run_{run}_of_2"))
//!             .with_custom_property("run", run)
//!             .with_custom_property("num_runs", 2_i64)
//!             .with_custom_property("accuracy", if run == 1 { "0.8" } else { "0.9" }),
//!     );
//!     store.add_event(Event::new(execution_id, artifact_id));
//! }
//!
//! let raw = overview(&store, None)?;
//! assert_eq!(raw.num_rows(), 2);
//!
//! let aggregated = overview(&store, Some(&[Aggregator::Mean]))?;
//! assert_eq!(aggregated.num_rows(), 1);
//! assert!(aggregated.has_column("accuracy mean"));
//! # Ok::<(), bench_overview::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod aggregate;
pub mod config;
pub mod error;
pub mod overview;
pub mod results;
pub mod scalar;
pub mod store;
pub mod table;

pub use aggregate::{AggregateFn, Aggregator};
pub use config::{OverviewBuilder, OverviewConfig};
pub use error::{Error, Result};
pub use overview::{aggregate_results, make_table, overview, Overview};
pub use scalar::{PropertyMap, Scalar};
pub use table::Table;
