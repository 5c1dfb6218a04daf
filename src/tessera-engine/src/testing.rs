//! In-memory collaborators for exercising plans without a cluster.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use common_error::{TesseraError, TesseraResult};
use tessera_core::{Settings, Value};
use tessera_distributed::testing::RecordingSubmitter;

use crate::cluster::{
    ClusterSettingsAction, ClusterUpdateSettingsRequest, ClusterUpdateSettingsResponse,
};
use crate::dependencies::DependencyCarrier;

#[derive(Debug, Default)]
struct ClusterState {
    persistent: BTreeMap<String, Value>,
    transient: BTreeMap<String, Value>,
    requests: Vec<ClusterUpdateSettingsRequest>,
}

/// A [`ClusterSettingsAction`] applying updates to an in-memory store.
#[derive(Debug)]
pub struct InMemoryClusterSettings {
    acknowledged: bool,
    failure: Option<String>,
    state: Mutex<ClusterState>,
}

impl Default for InMemoryClusterSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryClusterSettings {
    /// Create a store that acknowledges every update.
    pub fn new() -> Self {
        Self {
            acknowledged: true,
            failure: None,
            state: Mutex::new(ClusterState::default()),
        }
    }

    /// Answer updates with `acknowledged`.
    pub fn with_acknowledged(mut self, acknowledged: bool) -> Self {
        self.acknowledged = acknowledged;
        self
    }

    /// Fail every update with a remote error.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<ClusterUpdateSettingsRequest> {
        self.lock().requests.clone()
    }

    pub fn persistent_value(&self, key: &str) -> Option<Value> {
        self.lock().persistent.get(key).cloned()
    }

    pub fn transient_value(&self, key: &str) -> Option<Value> {
        self.lock().transient.get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, ClusterState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ClusterSettingsAction for InMemoryClusterSettings {
    async fn update(
        &self,
        request: ClusterUpdateSettingsRequest,
    ) -> TesseraResult<ClusterUpdateSettingsResponse> {
        let mut state = self.lock();
        state.requests.push(request.clone());
        if let Some(message) = &self.failure {
            return Err(TesseraError::remote(message.clone()));
        }

        apply(&mut state.persistent, &request.persistent);
        apply(&mut state.transient, &request.transient);
        Ok(ClusterUpdateSettingsResponse {
            acknowledged: self.acknowledged,
            persistent: request.persistent,
            transient: request.transient,
        })
    }
}

fn apply(store: &mut BTreeMap<String, Value>, settings: &Settings) {
    for (key, value) in settings.iter() {
        store.insert(key.to_string(), value.clone());
    }
}

/// Dependencies backed by an acknowledging submitter and `cluster_settings`.
pub fn dependencies(cluster_settings: Arc<InMemoryClusterSettings>) -> DependencyCarrier {
    DependencyCarrier::new(Arc::new(RecordingSubmitter::new()), cluster_settings)
}
