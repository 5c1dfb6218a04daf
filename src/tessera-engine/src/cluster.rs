//! Cluster-wide configuration mutation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use common_error::TesseraResult;
use tessera_core::Settings;

/// One request changing persistent and transient cluster settings together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterUpdateSettingsRequest {
    /// Settings surviving a full cluster restart.
    pub persistent: Settings,
    /// Settings lost on restart.
    pub transient: Settings,
}

/// The cluster's answer to a [`ClusterUpdateSettingsRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterUpdateSettingsResponse {
    /// Whether every node acknowledged the change in time.
    pub acknowledged: bool,
    /// Persistent settings as applied.
    pub persistent: Settings,
    /// Transient settings as applied.
    pub transient: Settings,
}

/// Applies settings changes to the cluster state.
#[async_trait]
pub trait ClusterSettingsAction: Send + Sync {
    /// Apply `request` and report whether it was acknowledged.
    async fn update(
        &self,
        request: ClusterUpdateSettingsRequest,
    ) -> TesseraResult<ClusterUpdateSettingsResponse>;
}
