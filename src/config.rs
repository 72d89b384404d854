//! Overview configuration
//!
//! Names the store types the overview reads. The defaults match the
//! benchmark pipeline's trainer component and result publisher.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Execution type of the trainer component.
pub const DEFAULT_TRAINER_TYPE: &str =
    "my_orchestrator.components.trainer.component.EstimatorTrainer";

/// Token prefixing the trainer's component id.
pub const DEFAULT_TRAINER_ID_PREFIX: &str = "EstimatorTrainer";

/// Artifact type of published benchmark results.
pub const DEFAULT_BENCHMARK_RESULT_TYPE: &str = "NitroML.BenchmarkResult";

/// Store type names used to locate hyperparameters and results.
///
/// Missing fields fall back to their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverviewConfig {
    trainer_type: String,
    trainer_id_prefix: String,
    benchmark_result_type: String,
}

impl Default for OverviewConfig {
    fn default() -> Self {
        Self {
            trainer_type: DEFAULT_TRAINER_TYPE.to_string(),
            trainer_id_prefix: DEFAULT_TRAINER_ID_PREFIX.to_string(),
            benchmark_result_type: DEFAULT_BENCHMARK_RESULT_TYPE.to_string(),
        }
    }
}

impl OverviewConfig {
    /// Load a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the text is not a valid configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(format!("Invalid configuration: {e}")))
    }

    /// Get the trainer execution type.
    #[must_use]
    pub fn trainer_type(&self) -> &str {
        &self.trainer_type
    }

    /// Get the trainer component-id prefix.
    #[must_use]
    pub fn trainer_id_prefix(&self) -> &str {
        &self.trainer_id_prefix
    }

    /// Get the benchmark result artifact type.
    #[must_use]
    pub fn benchmark_result_type(&self) -> &str {
        &self.benchmark_result_type
    }
}

/// Builder for [`crate::Overview`].
#[derive(Debug, Default)]
pub struct OverviewBuilder {
    config: OverviewConfig,
}

impl OverviewBuilder {
    /// Create a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trainer execution type
    #[must_use]
    pub fn trainer_type(mut self, type_name: impl Into<String>) -> Self {
        self.config.trainer_type = type_name.into();
        self
    }

    /// Set the token stripped from the trainer's component id
    #[must_use]
    pub fn trainer_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.trainer_id_prefix = prefix.into();
        self
    }

    /// Set the benchmark result artifact type
    #[must_use]
    pub fn benchmark_result_type(mut self, type_name: impl Into<String>) -> Self {
        self.config.benchmark_result_type = type_name.into();
        self
    }

    /// Start from an existing configuration
    #[must_use]
    pub fn config(mut self, config: OverviewConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the overview
    #[must_use]
    pub fn build(self) -> crate::Overview {
        crate::Overview::with_config(self.config)
    }
}
