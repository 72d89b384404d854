//! Benchmark result extraction

use super::{
    required_string, started_at, ResultSet, BENCHMARK_KEY, DEFAULT_COLUMNS, RUN_ID_KEY, STARTED_AT,
};
use crate::config::OverviewConfig;
use crate::scalar::{parse_scalar, PropertyMap, Scalar};
use crate::store::{Event, MetadataStore, PropertyValue};
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Bookkeeping properties the result publisher writes on every artifact.
const NAME: &str = "name";
const PRODUCER_COMPONENT: &str = "producer_component";
const STATE: &str = "state";

fn to_scalar(value: &PropertyValue) -> Scalar {
    match value {
        PropertyValue::Int(v) => Scalar::Integer(*v),
        PropertyValue::Double(v) => Scalar::Float(*v),
        PropertyValue::String(v) => parse_scalar(v),
    }
}

/// Map each artifact to the run id of an execution linked to it.
///
/// An artifact may be linked to several executions and an execution to
/// several artifacts. Executions without a `run_id` are skipped; among the
/// rest the last event wins. Artifacts with no such execution are absent
/// from the map.
fn artifact_run_ids<S: MetadataStore + ?Sized>(
    store: &S,
    artifact_ids: &[i64],
) -> Result<HashMap<i64, String>> {
    let events = store.get_events_by_artifact_ids(artifact_ids)?;
    let mut artifact_executions: HashMap<i64, Vec<i64>> = HashMap::new();
    for event in &events {
        artifact_executions
            .entry(event.artifact_id())
            .or_default()
            .push(event.execution_id());
    }

    let mut execution_ids: Vec<i64> = events.iter().map(Event::execution_id).collect();
    execution_ids.sort_unstable();
    execution_ids.dedup();
    let executions = store.get_executions_by_id(&execution_ids)?;

    let mut execution_run_ids: HashMap<i64, &str> = HashMap::with_capacity(executions.len());
    for execution in &executions {
        match required_string(execution, RUN_ID_KEY) {
            Ok(run_id) => {
                execution_run_ids.insert(execution.id(), run_id);
            }
            Err(err) => debug!(execution_id = execution.id(), %err, "Skipping execution without run id"),
        }
    }

    Ok(artifact_executions
        .into_iter()
        .filter_map(|(artifact_id, linked)| {
            linked
                .iter()
                .rev()
                .find_map(|id| execution_run_ids.get(id))
                .map(|run_id| (artifact_id, (*run_id).to_string()))
        })
        .collect())
}

/// Load every published benchmark result.
///
/// Entries are keyed by `run_id + "." + benchmark`. Property names are the
/// sorted custom property names, excluding bookkeeping and contextual
/// properties.
///
/// # Errors
///
/// Returns [`Error::UnresolvedArtifact`] if an artifact has no linked
/// execution with a run id, [`Error::MissingProperty`] if an artifact has no
/// `benchmark` property, and any store error.
pub fn get_benchmark_results<S: MetadataStore + ?Sized>(
    store: &S,
    config: &OverviewConfig,
) -> Result<ResultSet> {
    let artifacts = store.get_artifacts_by_type(config.benchmark_result_type())?;
    debug!(
        result_type = config.benchmark_result_type(),
        count = artifacts.len(),
        "Loaded benchmark result artifacts"
    );
    if artifacts.is_empty() {
        return Ok(ResultSet::default());
    }

    let mut property_names = BTreeSet::new();
    let mut metrics: BTreeMap<i64, PropertyMap> = BTreeMap::new();
    for artifact in &artifacts {
        let evals: PropertyMap = artifact
            .custom_properties()
            .iter()
            .map(|(name, value)| (name.clone(), to_scalar(value)))
            .collect();
        property_names.extend(evals.keys().cloned());
        metrics.insert(artifact.id(), evals);
    }

    let artifact_ids: Vec<i64> = metrics.keys().copied().collect();
    let run_ids = artifact_run_ids(store, &artifact_ids)?;

    let mut properties = BTreeMap::new();
    for (artifact_id, mut evals) in metrics {
        let run_id = run_ids
            .get(&artifact_id)
            .ok_or(Error::UnresolvedArtifact(artifact_id))?;
        let benchmark = evals
            .get(BENCHMARK_KEY)
            .map(ToString::to_string)
            .ok_or_else(|| Error::missing_property(format!("artifact {artifact_id}"), BENCHMARK_KEY))?;

        evals.insert(RUN_ID_KEY.to_string(), Scalar::from(run_id.as_str()));
        evals.insert(STARTED_AT.to_string(), started_at(run_id));
        properties.insert(format!("{run_id}.{benchmark}"), evals);
    }

    for excluded in [NAME, PRODUCER_COMPONENT, STATE].iter().chain(DEFAULT_COLUMNS.iter()) {
        property_names.remove(*excluded);
    }

    Ok(ResultSet {
        properties,
        property_names: property_names.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BENCHMARK_RESULT_TYPE;
    use crate::store::{Artifact, Event, Execution, InMemoryMetadataStore};

    fn result_artifact(id: i64, benchmark: &str) -> Artifact {
        Artifact::new(id, DEFAULT_BENCHMARK_RESULT_TYPE)
            .with_custom_property(BENCHMARK_KEY, benchmark)
            .with_custom_property(NAME, "result")
            .with_custom_property(PRODUCER_COMPONENT, "BenchmarkResultPublisher")
            .with_custom_property(STATE, "published")
            .with_custom_property("run", 1_i64)
    }

    #[test]
    fn test_to_scalar() {
        assert_eq!(to_scalar(&PropertyValue::Int(4)), Scalar::Integer(4));
        assert_eq!(to_scalar(&PropertyValue::Double(0.5)), Scalar::Float(0.5));
        assert_eq!(to_scalar(&PropertyValue::from("0.5")), Scalar::Float(0.5));
        assert_eq!(to_scalar(&PropertyValue::from("mnist")), Scalar::from("mnist"));
    }

    #[test]
    fn test_get_benchmark_results_resolves_run_ids() {
        let mut store = InMemoryMetadataStore::new();
        store.add_execution(Execution::new(1, "Publisher").with_property(RUN_ID_KEY, "1600000000"));
        store.add_artifact(result_artifact(10, "mnist").with_custom_property("accuracy", "0.9"));
        store.add_event(Event::new(1, 10));

        let result = get_benchmark_results(&store, &OverviewConfig::default()).unwrap();
        assert_eq!(result.property_names, vec!["accuracy"]);

        let evals = &result.properties["1600000000.mnist"];
        assert_eq!(evals["accuracy"], Scalar::Float(0.9));
        assert_eq!(evals["run"], Scalar::Integer(1));
        assert_eq!(evals[RUN_ID_KEY], Scalar::from("1600000000"));
        assert!(matches!(evals[STARTED_AT], Scalar::Timestamp(_)));
    }

    #[test]
    fn test_get_benchmark_results_unresolved_artifact() {
        let mut store = InMemoryMetadataStore::new();
        store.add_artifact(result_artifact(10, "mnist"));

        let err = get_benchmark_results(&store, &OverviewConfig::default()).unwrap_err();
        assert!(matches!(err, Error::UnresolvedArtifact(10)));
    }

    #[test]
    fn test_get_benchmark_results_skips_execution_without_run_id() {
        let mut store = InMemoryMetadataStore::new();
        store.add_execution(Execution::new(1, "Publisher").with_property(RUN_ID_KEY, "7"));
        store.add_execution(Execution::new(2, "Consumer"));
        store.add_artifact(result_artifact(10, "mnist"));
        store.add_event(Event::new(1, 10));
        store.add_event(Event::new(2, 10));

        let result = get_benchmark_results(&store, &OverviewConfig::default()).unwrap();
        assert!(result.properties.contains_key("7.mnist"));
    }

    #[test]
    fn test_get_benchmark_results_one_execution_many_artifacts() {
        let mut store = InMemoryMetadataStore::new();
        store.add_execution(Execution::new(1, "Publisher").with_property(RUN_ID_KEY, "1600000000"));
        store.add_artifact(result_artifact(10, "a").with_custom_property("accuracy", "0.7"));
        store.add_artifact(result_artifact(11, "b").with_custom_property("accuracy", "0.8"));
        store.add_event(Event::new(1, 10));
        store.add_event(Event::new(1, 11));

        let result = get_benchmark_results(&store, &OverviewConfig::default()).unwrap();
        assert_eq!(result.properties.len(), 2);
        assert_eq!(result.properties["1600000000.a"]["accuracy"], Scalar::Float(0.7));
        assert_eq!(result.properties["1600000000.b"]["accuracy"], Scalar::Float(0.8));
    }

    #[test]
    fn test_artifact_run_ids_last_event_wins() {
        let mut store = InMemoryMetadataStore::new();
        store.add_execution(Execution::new(1, "Publisher").with_property(RUN_ID_KEY, "5"));
        store.add_execution(Execution::new(2, "Publisher").with_property(RUN_ID_KEY, "6"));
        store.add_event(Event::new(1, 10));
        store.add_event(Event::new(2, 10));

        let run_ids = artifact_run_ids(&store, &[10]).unwrap();
        assert_eq!(run_ids.get(&10).map(String::as_str), Some("6"));
    }

    #[test]
    fn test_get_benchmark_results_missing_benchmark() {
        let mut store = InMemoryMetadataStore::new();
        store.add_execution(Execution::new(1, "Publisher").with_property(RUN_ID_KEY, "7"));
        store.add_artifact(Artifact::new(10, DEFAULT_BENCHMARK_RESULT_TYPE).with_custom_property("accuracy", "0.9"));
        store.add_event(Event::new(1, 10));

        let err = get_benchmark_results(&store, &OverviewConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MissingProperty { .. }));
    }

    #[test]
    fn test_get_benchmark_results_empty_store() {
        let store = InMemoryMetadataStore::new();
        let result = get_benchmark_results(&store, &OverviewConfig::default()).unwrap();
        assert_eq!(result, ResultSet::default());
    }
}
