//! Metadata store access
//!
//! The overview only reads from the store. The schema mirrors the
//! pipeline metadata layout:
//!
//! ```text
//! Execution (1) ──< Event >── (1) Artifact
//!     │                              │
//!     └── properties                 └── custom_properties
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use bench_overview::store::{Artifact, Event, Execution, InMemoryMetadataStore, MetadataStore};
//!
//! let mut store = InMemoryMetadataStore::new();
//! store.add_execution(Execution::new(1, "Trainer").with_property("run_id", "1600000000"));
//! store.add_artifact(Artifact::new(7, "BenchmarkResult").with_custom_property("accuracy", "0.9"));
//! store.add_event(Event::new(1, 7));
//!
//! let events = store.get_events_by_artifact_ids(&[7])?;
//! assert_eq!(events[0].execution_id(), 1);
//! # Ok::<(), bench_overview::Error>(())
//! ```

mod memory;
mod records;

pub use memory::InMemoryMetadataStore;
pub use records::{Artifact, Event, Execution, PropertyValue};

use crate::Result;

/// Read-only query interface of a pipeline metadata store.
///
/// Implementations wrap a live connection; the overview borrows it for the
/// duration of one call and never mutates or closes it.
pub trait MetadataStore {
    /// Get all executions of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Store`] if the store cannot be queried.
    fn get_executions_by_type(&self, type_name: &str) -> Result<Vec<Execution>>;

    /// Get the executions with the given ids. Unknown ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Store`] if the store cannot be queried.
    fn get_executions_by_id(&self, execution_ids: &[i64]) -> Result<Vec<Execution>>;

    /// Get all artifacts of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Store`] if the store cannot be queried.
    fn get_artifacts_by_type(&self, type_name: &str) -> Result<Vec<Artifact>>;

    /// Get every event that references one of the given artifacts.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Store`] if the store cannot be queried.
    fn get_events_by_artifact_ids(&self, artifact_ids: &[i64]) -> Result<Vec<Event>>;
}
