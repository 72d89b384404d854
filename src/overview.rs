//! Benchmark overview assembly
//!
//! Joins trainer hyperparameters with published benchmark results and
//! shapes them into one table, optionally aggregating repeated runs.
//!
//! ```text
//! get_hparams ──┐
//!               ├─ merge ─ complete_entries ─ make_table ─ [aggregate_results]
//! get_benchmark_results ─┘
//! ```

use crate::aggregate::Aggregator;
use crate::config::{OverviewBuilder, OverviewConfig};
use crate::results::{
    get_benchmark_results, get_hparams, BENCHMARK_FULL_KEY, BENCHMARK_KEY, CONTEXTUAL_COLUMNS,
    NUM_RUNS_KEY, RUN_KEY, STARTED_AT,
};
use crate::scalar::{PropertyMap, Scalar};
use crate::store::MetadataStore;
use crate::table::Table;
use crate::{Error, Result};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Repetition suffix appended to benchmark names, e.g. `.run_2_of_5`
static REPETITION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.run_\d+_of_\d+$").expect("valid repetition pattern"));

/// Strip a trailing repetition suffix from a benchmark name.
///
/// Only the final suffix is removed.
///
/// # Example
///
/// ```rust
/// use bench_overview::overview::strip_run_suffix;
///
/// assert_eq!(strip_run_suffix("taskA.run_3_of_10"), "taskA");
/// assert_eq!(strip_run_suffix("taskA"), "taskA");
/// assert_eq!(strip_run_suffix("taskA.run_3_of_10.run_1_of_2"), "taskA.run_3_of_10");
/// ```
#[must_use]
pub fn strip_run_suffix(name: &str) -> &str {
    REPETITION_SUFFIX
        .find(name)
        .map_or(name, |m| &name[..m.start()])
}

fn warn_on_duplicates(kind: &str, names: &[String]) {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            warn!(column = %name, kind, "Duplicate column name; hparam and metric names overlap");
        }
    }
}

/// Build the raw overview table from merged property maps.
///
/// Adds `benchmark_fullname`, strips repetition suffixes from `benchmark`,
/// orders the contextual columns first followed by `columns`, and indexes
/// the table by `started_at`. A name in `columns` that no entry carries
/// becomes an all-null column.
///
/// # Errors
///
/// Returns [`Error::Table`] if an entry lacks `benchmark` or `started_at`.
pub fn make_table(entries: &[PropertyMap], columns: &[String]) -> Result<Table> {
    if entries.is_empty() {
        return Ok(Table::default());
    }

    let mut table = Table::from_records(entries);
    let full_names: Vec<Scalar> = table
        .column(BENCHMARK_KEY)
        .ok_or_else(|| Error::Table(format!("Column '{BENCHMARK_KEY}' not found")))?
        .into_iter()
        .cloned()
        .collect();
    table.add_column(BENCHMARK_FULL_KEY, full_names)?;
    table.map_column(BENCHMARK_KEY, |value| match value {
        Scalar::String(name) => Scalar::from(strip_run_suffix(name)),
        other => other.clone(),
    })?;

    let mut selection: Vec<String> = CONTEXTUAL_COLUMNS
        .iter()
        .filter(|&&name| !matches!(name, RUN_KEY | NUM_RUNS_KEY) || table.has_column(name))
        .map(ToString::to_string)
        .collect();
    selection.extend(columns.iter().cloned());
    warn_on_duplicates("overview", &selection);

    for name in columns {
        if !table.has_column(name) {
            table.add_column(name.clone(), vec![Scalar::Null; table.num_rows()])?;
        }
    }

    table.select(&selection)?.set_index(STARTED_AT)
}

fn remove_required(columns: &mut Vec<String>, name: &str) -> Result<()> {
    let position = columns.iter().position(|c| c == name).ok_or_else(|| {
        Error::Config(format!(
            "Grouping columns must include '{name}', got {columns:?}"
        ))
    })?;
    columns.remove(position);
    Ok(())
}

/// Aggregate repeated runs of each benchmark.
///
/// Drops `run`, groups by `groupby_columns` minus `run` and
/// `benchmark_fullname` (and minus `num_runs` if the table lacks it), and
/// applies every aggregator to every remaining metric column. Aggregated
/// columns are named `"<column> <aggregator>"`. The result is indexed by
/// `started_at`.
///
/// # Errors
///
/// Returns [`Error::Config`] if `groupby_columns` lacks `run` or
/// `benchmark_fullname`, or names a column the table does not have.
pub fn aggregate_results(
    table: &Table,
    aggregators: &[Aggregator],
    groupby_columns: &[String],
) -> Result<Table> {
    let mut groupby = groupby_columns.to_vec();
    remove_required(&mut groupby, RUN_KEY)?;
    remove_required(&mut groupby, BENCHMARK_FULL_KEY)?;

    if table.is_empty() {
        return Ok(Table::default());
    }

    let mut table = table.clone();
    if table.has_column(RUN_KEY) {
        table.drop_column(RUN_KEY)?;
    }
    if !table.has_column(NUM_RUNS_KEY) {
        if let Some(position) = groupby.iter().position(|c| c == NUM_RUNS_KEY) {
            groupby.remove(position);
        }
    }
    for name in &groupby {
        if !table.has_column(name) && table.index_name() != Some(name.as_str()) {
            return Err(Error::Config(format!("Grouping column '{name}' not found in overview")));
        }
    }
    warn_on_duplicates("grouping", &groupby);

    let metric_columns: Vec<String> = table
        .columns()
        .into_iter()
        .filter(|&name| name != BENCHMARK_FULL_KEY && !groupby.iter().any(|g| g == name))
        .map(ToString::to_string)
        .collect();
    let metric_values: Vec<Vec<&Scalar>> = metric_columns
        .iter()
        .filter_map(|name| table.column(name))
        .collect();

    let mut columns = groupby.clone();
    for metric in &metric_columns {
        for aggregator in aggregators {
            columns.push(format!("{metric} {}", aggregator.name()).trim().to_string());
        }
    }

    let groups = table.group_by(&groupby)?;
    let mut aggregated = Table::new(columns);
    for group in &groups {
        let mut row = group.key().to_vec();
        for values in &metric_values {
            let cells: Vec<Scalar> = group.rows().iter().map(|&r| values[r].clone()).collect();
            row.extend(aggregators.iter().map(|aggregator| aggregator.apply(&cells)));
        }
        aggregated.push_row(row)?;
    }
    debug!(
        groups = groups.len(),
        metrics = metric_columns.len(),
        aggregators = aggregators.len(),
        "Aggregated overview"
    );

    aggregated.set_index(STARTED_AT)
}

/// Overview of benchmark runs recorded in a metadata store.
///
/// # Example
///
/// ```rust
/// use bench_overview::store::InMemoryMetadataStore;
/// use bench_overview::Overview;
///
/// let store = InMemoryMetadataStore::new();
/// let table = Overview::builder()
///     .trainer_type("my.Trainer")
///     .build()
///     .run(&store, None)?;
/// assert!(table.is_empty());
/// # Ok::<(), bench_overview::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Overview {
    config: OverviewConfig,
}

impl Overview {
    /// Create an overview with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an overview builder.
    #[must_use]
    pub fn builder() -> OverviewBuilder {
        OverviewBuilder::new()
    }

    /// Create an overview with the given configuration.
    #[must_use]
    pub const fn with_config(config: OverviewConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &OverviewConfig {
        &self.config
    }

    /// Load hyperparameters and benchmark results and build the overview.
    ///
    /// With no (or an empty list of) aggregators the raw per-run table is
    /// returned; otherwise repeated runs are grouped by their contextual
    /// columns and hyperparameters and each metric is aggregated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseError`] for malformed hyperparameters,
    /// [`Error::UnresolvedArtifact`] or [`Error::MissingProperty`] for an
    /// inconsistent store, and any store error.
    pub fn run<S: MetadataStore + ?Sized>(
        &self,
        store: &S,
        metric_aggregators: Option<&[Aggregator]>,
    ) -> Result<Table> {
        let hparams = get_hparams(store, &self.config)?;
        let metrics = get_benchmark_results(store, &self.config)?;

        let mut groupby_columns: Vec<String> =
            CONTEXTUAL_COLUMNS.iter().map(ToString::to_string).collect();
        groupby_columns.extend(hparams.property_names.iter().cloned());

        let merged = hparams.merge(metrics);
        let entries = merged.complete_entries();
        debug!(
            merged = merged.properties.len(),
            complete = entries.len(),
            "Merged hyperparameters and benchmark results"
        );

        let table = make_table(&entries, &merged.property_names)?;
        let table = match metric_aggregators {
            Some(aggregators) if !aggregators.is_empty() => {
                aggregate_results(&table, aggregators, &groupby_columns)?
            }
            _ => table,
        };
        info!(
            rows = table.num_rows(),
            columns = table.num_columns(),
            "Built benchmark overview"
        );
        Ok(table)
    }
}

/// Build the overview with the default configuration.
///
/// Shorthand for `Overview::new().run(store, metric_aggregators)`.
///
/// # Errors
///
/// See [`Overview::run`].
pub fn overview<S: MetadataStore + ?Sized>(
    store: &S,
    metric_aggregators: Option<&[Aggregator]>,
) -> Result<Table> {
    Overview::new().run(store, metric_aggregators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::RUN_ID_KEY;

    fn entry(benchmark: &str, run: i64, accuracy: f64) -> PropertyMap {
        PropertyMap::from([
            (STARTED_AT.to_string(), Scalar::from("abc")),
            (RUN_ID_KEY.to_string(), Scalar::from("abc")),
            (BENCHMARK_KEY.to_string(), Scalar::from(benchmark)),
            (RUN_KEY.to_string(), Scalar::Integer(run)),
            (NUM_RUNS_KEY.to_string(), Scalar::Integer(2)),
            ("lr".to_string(), Scalar::Float(0.1)),
            ("accuracy".to_string(), Scalar::Float(accuracy)),
        ])
    }

    fn groupby() -> Vec<String> {
        let mut columns: Vec<String> = CONTEXTUAL_COLUMNS.iter().map(ToString::to_string).collect();
        columns.push("lr".to_string());
        columns
    }

    #[test]
    fn test_strip_run_suffix() {
        assert_eq!(strip_run_suffix("taskA.run_3_of_10"), "taskA");
        assert_eq!(strip_run_suffix("taskA"), "taskA");
        assert_eq!(strip_run_suffix("taskA.run_3_of_10.run_1_of_2"), "taskA.run_3_of_10");
        assert_eq!(strip_run_suffix("taskA.run_3_of_10x"), "taskA.run_3_of_10x");
        assert_eq!(strip_run_suffix("taskA_run_3_of_10"), "taskA_run_3_of_10");
    }

    #[test]
    fn test_make_table_empty() {
        let table = make_table(&[], &["lr".to_string()]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.num_columns(), 0);
    }

    #[test]
    fn test_make_table_column_order() {
        let entries = vec![entry("bench.run_1_of_2", 1, 0.8)];
        let table = make_table(&entries, &["lr".to_string(), "accuracy".to_string()]).unwrap();

        assert_eq!(table.index_name(), Some(STARTED_AT));
        assert_eq!(
            table.columns(),
            vec![RUN_ID_KEY, BENCHMARK_FULL_KEY, BENCHMARK_KEY, RUN_KEY, NUM_RUNS_KEY, "lr", "accuracy"]
        );
        assert_eq!(table.value(0, BENCHMARK_KEY), Some(&Scalar::from("bench")));
        assert_eq!(
            table.value(0, BENCHMARK_FULL_KEY),
            Some(&Scalar::from("bench.run_1_of_2"))
        );
    }

    #[test]
    fn test_make_table_drops_absent_run_columns_and_fills_missing() {
        let mut e = entry("bench", 1, 0.8);
        e.remove(RUN_KEY);
        e.remove(NUM_RUNS_KEY);
        let table = make_table(&[e], &["accuracy".to_string(), "f1".to_string()]).unwrap();

        assert_eq!(
            table.columns(),
            vec![RUN_ID_KEY, BENCHMARK_FULL_KEY, BENCHMARK_KEY, "accuracy", "f1"]
        );
        assert_eq!(table.value(0, "f1"), Some(&Scalar::Null));
    }

    #[test]
    fn test_aggregate_results_mean() {
        let entries = vec![entry("bench.run_1_of_2", 1, 0.8), entry("bench.run_2_of_2", 2, 0.9)];
        let table = make_table(&entries, &["lr".to_string(), "accuracy".to_string()]).unwrap();

        let aggregated = aggregate_results(&table, &[Aggregator::Mean], &groupby()).unwrap();
        assert_eq!(aggregated.num_rows(), 1);
        assert_eq!(
            aggregated.columns(),
            vec![RUN_ID_KEY, BENCHMARK_KEY, NUM_RUNS_KEY, "lr", "accuracy mean"]
        );
        let mean = aggregated.value(0, "accuracy mean").and_then(Scalar::as_f64).unwrap();
        assert!((mean - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_results_column_major_labels() {
        let entries = vec![entry("bench", 1, 0.8)];
        let mut table = make_table(&entries, &["lr".to_string(), "accuracy".to_string()]).unwrap();
        table.add_column("loss", vec![Scalar::Float(0.3)]).unwrap();

        let aggregated =
            aggregate_results(&table, &[Aggregator::Mean, Aggregator::Max], &groupby()).unwrap();
        let columns = aggregated.columns();
        assert_eq!(
            &columns[columns.len() - 4..],
            &["accuracy mean", "accuracy max", "loss mean", "loss max"]
        );
    }

    #[test]
    fn test_aggregate_results_requires_run_and_fullname() {
        let table = make_table(&[entry("bench", 1, 0.8)], &["accuracy".to_string()]).unwrap();

        let mut missing_run = groupby();
        missing_run.retain(|c| c != RUN_KEY);
        let err = aggregate_results(&table, &[Aggregator::Mean], &missing_run).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let mut missing_fullname = groupby();
        missing_fullname.retain(|c| c != BENCHMARK_FULL_KEY);
        let err = aggregate_results(&table, &[Aggregator::Mean], &missing_fullname).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_aggregate_results_unknown_grouping_column() {
        let table = make_table(&[entry("bench", 1, 0.8)], &["lr".to_string(), "accuracy".to_string()]).unwrap();
        let mut columns = groupby();
        columns.push("momentum".to_string());

        let err = aggregate_results(&table, &[Aggregator::Mean], &columns).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_aggregate_results_empty_table() {
        let aggregated = aggregate_results(&Table::default(), &[Aggregator::Mean], &groupby()).unwrap();
        assert!(aggregated.is_empty());
    }
}
