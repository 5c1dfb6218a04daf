//! Capabilities a plan needs to dispatch itself.

use std::fmt;
use std::sync::Arc;

use common_config::ExecutionConfig;
use tessera_core::{
    BasicSymbolEvaluator, BuiltinSettingsRegistry, SettingsRegistry, SymbolEvaluator,
};
use tessera_distributed::{JobLauncher, NodeOperationSubmitter};

use crate::cluster::ClusterSettingsAction;

/// The external services handed to [`Plan::execute_or_fail`].
///
/// [`Plan::execute_or_fail`]: crate::Plan::execute_or_fail
#[derive(Clone)]
pub struct DependencyCarrier {
    submitter: Arc<dyn NodeOperationSubmitter>,
    evaluator: Arc<dyn SymbolEvaluator>,
    registry: Arc<dyn SettingsRegistry>,
    cluster_settings: Arc<dyn ClusterSettingsAction>,
}

impl DependencyCarrier {
    /// Create a carrier with the basic evaluator and the builtin settings registry.
    pub fn new(
        submitter: Arc<dyn NodeOperationSubmitter>,
        cluster_settings: Arc<dyn ClusterSettingsAction>,
    ) -> Self {
        Self {
            submitter,
            evaluator: Arc::new(BasicSymbolEvaluator::new()),
            registry: Arc::new(BuiltinSettingsRegistry::new()),
            cluster_settings,
        }
    }

    /// Replace the symbol evaluator.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn SymbolEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Replace the settings registry.
    pub fn with_registry(mut self, registry: Arc<dyn SettingsRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn submitter(&self) -> &Arc<dyn NodeOperationSubmitter> {
        &self.submitter
    }

    pub fn evaluator(&self) -> &dyn SymbolEvaluator {
        self.evaluator.as_ref()
    }

    pub fn registry(&self) -> &dyn SettingsRegistry {
        self.registry.as_ref()
    }

    pub fn cluster_settings(&self) -> &Arc<dyn ClusterSettingsAction> {
        &self.cluster_settings
    }

    /// A launcher dispatching through this carrier's submitter.
    pub fn launcher(&self, config: &ExecutionConfig) -> JobLauncher {
        JobLauncher::new(Arc::clone(&self.submitter), config.clone())
    }
}

impl fmt::Debug for DependencyCarrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyCarrier").finish_non_exhaustive()
    }
}
