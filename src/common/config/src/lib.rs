//! Configuration management for Tessera.
//!
//! Provides runtime configuration for job dispatch and settings plans.

use std::path::Path;

use serde::{Deserialize, Serialize};

use common_error::{TesseraError, TesseraResult};

/// Global Tessera configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TesseraConfig {
    /// Job dispatch configuration.
    pub execution: ExecutionConfig,
    /// Settings plan configuration.
    pub settings: SettingsConfig,
}

impl TesseraConfig {
    /// Parse a configuration from a JSON document.
    ///
    /// Missing sections and fields fall back to their defaults.
    pub fn from_json_str(json: &str) -> TesseraResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| TesseraError::config(format!("invalid configuration: {e}")))
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> TesseraResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            TesseraError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&contents)
    }

    /// Set the execution configuration.
    pub fn with_execution(mut self, execution: ExecutionConfig) -> Self {
        self.execution = execution;
        self
    }

    /// Set the settings configuration.
    pub fn with_settings(mut self, settings: SettingsConfig) -> Self {
        self.settings = settings;
        self
    }
}

/// Job dispatch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Upper bound on concurrently dispatched operations per job (`None` = unbounded).
    pub max_in_flight_operations: Option<usize>,
    /// Check the operation graph for cycles before dispatching it.
    pub verify_graph: bool,
    /// Send a best-effort kill to nodes with in-flight work after failure or cancellation.
    pub cancel_in_flight_on_failure: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_in_flight_operations: None,
            verify_graph: true,
            cancel_in_flight_on_failure: true,
        }
    }
}

impl ExecutionConfig {
    /// Cap the number of concurrently dispatched operations.
    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        self.max_in_flight_operations = Some(limit.max(1));
        self
    }

    /// Enable or disable graph verification.
    pub fn with_verify_graph(mut self, enabled: bool) -> Self {
        self.verify_graph = enabled;
        self
    }

    /// Enable or disable best-effort kill requests.
    pub fn with_cancel_in_flight(mut self, enabled: bool) -> Self {
        self.cancel_in_flight_on_failure = enabled;
        self
    }
}

/// Settings plan configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Carry persistent assignments into the transient delta.
    pub mirror_persistent_into_transient: bool,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            mirror_persistent_into_transient: true,
        }
    }
}

impl SettingsConfig {
    /// Enable or disable the transient carry-over.
    pub fn with_mirror(mut self, enabled: bool) -> Self {
        self.mirror_persistent_into_transient = enabled;
        self
    }
}
