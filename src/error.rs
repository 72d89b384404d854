//! Error types for bench-overview
//!
//! Every failure is surfaced to the caller. Value coercion never fails, so
//! there is no variant for it.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// bench-overview error types
#[derive(Error, Debug)]
pub enum Error {
    /// Serialized hyperparameters could not be parsed as a literal list
    #[error("Hyperparameter parse error: {0}\nThe producer's serialization format may have changed")]
    ParseError(String),

    /// A record lacks a property the overview depends on
    #[error("{record} has no string property '{property}'")]
    MissingProperty {
        /// Record description, e.g. `execution 12`
        record: String,
        /// Name of the missing property
        property: String,
    },

    /// Benchmark result artifact without an owning execution
    #[error("Artifact {0} has no producing execution with a run id\nThe metadata store is inconsistent")]
    UnresolvedArtifact(i64),

    /// Caller-supplied configuration is inconsistent (grouping columns, aggregator names)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Table operation on a missing column or mismatched row shape
    #[error("Table error: {0}")]
    Table(String),

    /// Metadata store access failed
    #[error("Metadata store error: {0}")]
    Store(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

impl Error {
    pub(crate) fn missing_property(record: impl Into<String>, property: &str) -> Self {
        Self::MissingProperty {
            record: record.into(),
            property: property.to_string(),
        }
    }
}
