//! Hyperparameter and benchmark result extraction
//!
//! Both extractors produce a [`ResultSet`] keyed by a composite key of run
//! id plus benchmark identifier, so trainer hyperparameters and published
//! results of the same run/benchmark pair land on the same entry:
//!
//! ```text
//! trainer execution  run_id + ".mnist.run_1_of_2"  ─┐
//!                                                    ├─> merged PropertyMap
//! result artifact    run_id + "." + benchmark      ─┘
//! ```

mod benchmark;
mod hparams;
mod literal;

pub use benchmark::get_benchmark_results;
pub use hparams::{get_hparams, parse_hparams};
pub use literal::parse_string_list;

use crate::scalar::{PropertyMap, Scalar};
use crate::store::Execution;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Run id of the pipeline run
pub const RUN_ID_KEY: &str = "run_id";
/// Start time derived from the run id
pub const STARTED_AT: &str = "started_at";
/// Benchmark name including any repetition suffix
pub const BENCHMARK_FULL_KEY: &str = "benchmark_fullname";
/// Benchmark name with the repetition suffix stripped
pub const BENCHMARK_KEY: &str = "benchmark";
/// Repetition index of the run
pub const RUN_KEY: &str = "run";
/// Number of repetitions of the benchmark
pub const NUM_RUNS_KEY: &str = "num_runs";

/// Columns every extracted entry may carry regardless of its content.
pub const DEFAULT_COLUMNS: [&str; 5] = [STARTED_AT, RUN_ID_KEY, BENCHMARK_KEY, RUN_KEY, NUM_RUNS_KEY];

/// Leading columns of an overview table, in display order.
pub const CONTEXTUAL_COLUMNS: [&str; 6] = [
    STARTED_AT,
    RUN_ID_KEY,
    BENCHMARK_FULL_KEY,
    BENCHMARK_KEY,
    RUN_KEY,
    NUM_RUNS_KEY,
];

/// Extracted properties keyed by composite key, plus the names of the
/// properties that carry hyperparameter or metric values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Composite key to property map
    pub properties: BTreeMap<String, PropertyMap>,
    /// Sorted property names (concatenated, not deduplicated, after a merge)
    pub property_names: Vec<String>,
}

impl ResultSet {
    /// Merge `other` into this result set.
    ///
    /// Entries sharing a composite key are unioned property by property,
    /// with `other` winning on collisions. Property name lists are
    /// concatenated.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (key, props) in other.properties {
            self.properties.entry(key).or_default().extend(props);
        }
        self.property_names.extend(other.property_names);
        self
    }

    /// Property maps that carry more than the default columns.
    ///
    /// Entries holding only contextual values (a trainer without results or
    /// an empty result artifact) are skipped.
    #[must_use]
    pub fn complete_entries(&self) -> Vec<PropertyMap> {
        self.properties
            .values()
            .filter(|props| props.len() > DEFAULT_COLUMNS.len())
            .cloned()
            .collect()
    }
}

/// Start time of a run.
///
/// Run ids are epoch seconds; anything else is kept as the literal run id.
#[must_use]
pub fn started_at(run_id: &str) -> Scalar {
    run_id
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map_or_else(|| Scalar::from(run_id), Scalar::Timestamp)
}

fn required_string<'a>(execution: &'a Execution, property: &str) -> Result<&'a str> {
    execution
        .string_property(property)
        .ok_or_else(|| Error::missing_property(format!("execution {}", execution.id()), property))
}
