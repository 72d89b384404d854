//! In-memory metadata store snapshot.
//!
//! Useful for tests and for analysing an exported store offline.

use super::{Artifact, Event, Execution, MetadataStore};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Serialized form of a store snapshot.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    executions: Vec<Execution>,
    #[serde(default)]
    artifacts: Vec<Artifact>,
    #[serde(default)]
    events: Vec<Event>,
}

/// Read-only snapshot of a metadata store held in memory.
///
/// Records are kept in id order, so queries return them in a stable order.
/// Adding a record with an existing id replaces it.
///
/// # Example
///
/// ```rust
/// use bench_overview::store::{InMemoryMetadataStore, MetadataStore};
///
/// let store = InMemoryMetadataStore::from_json_str(r#"{
///     "executions": [
///         {"id": 1, "type_name": "Trainer", "properties": {"run_id": {"string_value": "42"}}}
///     ]
/// }"#)?;
/// assert_eq!(store.get_executions_by_type("Trainer")?.len(), 1);
/// # Ok::<(), bench_overview::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryMetadataStore {
    executions: BTreeMap<i64, Execution>,
    artifacts: BTreeMap<i64, Artifact>,
    events: Vec<Event>,
}

impl InMemoryMetadataStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the text is not a valid snapshot.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)
            .map_err(|e| Error::Store(format!("Invalid store snapshot: {e}")))?;

        let mut store = Self::new();
        for execution in snapshot.executions {
            store.add_execution(execution);
        }
        for artifact in snapshot.artifacts {
            store.add_artifact(artifact);
        }
        store.events = snapshot.events;
        Ok(store)
    }

    /// Load a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Store`]
    /// if its content is not a valid snapshot.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Check if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executions.is_empty() && self.artifacts.is_empty() && self.events.is_empty()
    }

    /// Get the number of executions in the store.
    #[must_use]
    pub fn execution_count(&self) -> usize {
        self.executions.len()
    }

    /// Get the number of artifacts in the store.
    #[must_use]
    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    /// Get the number of events in the store.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Add an execution to the store.
    pub fn add_execution(&mut self, execution: Execution) {
        self.executions.insert(execution.id(), execution);
    }

    /// Add an artifact to the store.
    pub fn add_artifact(&mut self, artifact: Artifact) {
        self.artifacts.insert(artifact.id(), artifact);
    }

    /// Add an event to the store.
    pub fn add_event(&mut self, event: Event) {
        self.events.push(event);
    }
}

impl MetadataStore for InMemoryMetadataStore {
    fn get_executions_by_type(&self, type_name: &str) -> Result<Vec<Execution>> {
        Ok(self
            .executions
            .values()
            .filter(|execution| execution.type_name() == type_name)
            .cloned()
            .collect())
    }

    fn get_executions_by_id(&self, execution_ids: &[i64]) -> Result<Vec<Execution>> {
        Ok(execution_ids
            .iter()
            .filter_map(|id| self.executions.get(id))
            .cloned()
            .collect())
    }

    fn get_artifacts_by_type(&self, type_name: &str) -> Result<Vec<Artifact>> {
        Ok(self
            .artifacts
            .values()
            .filter(|artifact| artifact.type_name() == type_name)
            .cloned()
            .collect())
    }

    fn get_events_by_artifact_ids(&self, artifact_ids: &[i64]) -> Result<Vec<Event>> {
        Ok(self
            .events
            .iter()
            .filter(|event| artifact_ids.contains(&event.artifact_id()))
            .copied()
            .collect())
    }
}
