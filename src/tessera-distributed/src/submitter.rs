//! Transport seam for dispatching operations to nodes.

use async_trait::async_trait;

use common_error::TesseraResult;

use crate::operation::{JobId, NodeId, NodeOperation, NodeOperationResult};

/// Submits node operations to cluster nodes.
///
/// Implemented by the transport layer; the launcher only awaits completions.
#[async_trait]
pub trait NodeOperationSubmitter: Send + Sync {
    /// Run `operation` on its node and wait for it to complete.
    async fn submit(
        &self,
        job_id: &JobId,
        operation: &NodeOperation,
    ) -> TesseraResult<NodeOperationResult>;

    /// Ask `node` to stop working on `job_id`.
    ///
    /// Best effort: work may still complete after this returns.
    async fn kill(&self, job_id: &JobId, node: &NodeId) -> TesseraResult<()> {
        let _ = (job_id, node);
        Ok(())
    }
}
