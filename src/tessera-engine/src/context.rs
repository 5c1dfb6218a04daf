//! Per-execution planner context.

use tokio::sync::watch;

use common_config::TesseraConfig;
use common_runtime::CancellationHandle;
use tessera_core::{Functions, TransactionContext};
use tessera_distributed::JobId;

/// State for one statement execution.
///
/// Owned by the invocation and never shared between executions.
#[derive(Debug, Clone)]
pub struct PlannerContext {
    job_id: JobId,
    transaction: TransactionContext,
    functions: Functions,
    config: TesseraConfig,
    cancel_rx: watch::Receiver<bool>,
}

impl PlannerContext {
    /// Create a context for `job_id` that is never cancelled.
    pub fn new(job_id: JobId) -> Self {
        let (_handle, cancel_rx) = CancellationHandle::new();
        Self {
            job_id,
            transaction: TransactionContext::default(),
            functions: Functions::builtin(),
            config: TesseraConfig::default(),
            cancel_rx,
        }
    }

    /// Set the transaction state.
    pub fn with_transaction(mut self, transaction: TransactionContext) -> Self {
        self.transaction = transaction;
        self
    }

    /// Set the function registry.
    pub fn with_functions(mut self, functions: Functions) -> Self {
        self.functions = functions;
        self
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: TesseraConfig) -> Self {
        self.config = config;
        self
    }

    /// Observe cancellation through `cancel_rx`.
    pub fn with_cancellation(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = cancel_rx;
        self
    }

    /// Identity of the execution.
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Transaction state.
    pub fn transaction(&self) -> &TransactionContext {
        &self.transaction
    }

    /// Function registry for evaluation.
    pub fn functions(&self) -> &Functions {
        &self.functions
    }

    /// Configuration.
    pub fn config(&self) -> &TesseraConfig {
        &self.config
    }

    /// A receiver for the cancellation signal.
    pub fn cancellation(&self) -> watch::Receiver<bool> {
        self.cancel_rx.clone()
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let ctx = PlannerContext::new(JobId::new("job-1"));
        assert_eq!(ctx.job_id(), &JobId::new("job-1"));
        assert_eq!(ctx.transaction().current_schema, "doc");
        assert!(ctx.functions().get("concat").is_some());
        assert!(!ctx.is_cancelled());
    }

    #[test]
    fn test_cancellation() {
        let (handle, rx) = CancellationHandle::new();
        let ctx = PlannerContext::new(JobId::new("job-1")).with_cancellation(rx);
        assert!(!ctx.is_cancelled());
        handle.cancel();
        assert!(ctx.is_cancelled());
        assert!(*ctx.cancellation().borrow());
    }
}
