use tessera_core::{BoxedRowConsumer, Rejection};
use tessera_distributed::{NodeOperation, NodeOperationCtx, NodeOperationTree};

use super::StatementType;
use crate::context::PlannerContext;
use crate::dependencies::DependencyCarrier;

/// A data-manipulation plan: the planner's node operations for one statement.
#[derive(Debug, Clone)]
pub struct DistributedPlan {
    statement_type: StatementType,
    operations: Vec<NodeOperation>,
}

impl DistributedPlan {
    pub fn new(statement_type: StatementType, operations: Vec<NodeOperation>) -> Self {
        Self {
            statement_type,
            operations,
        }
    }

    pub fn statement_type(&self) -> StatementType {
        self.statement_type
    }

    pub fn operations(&self) -> &[NodeOperation] {
        &self.operations
    }

    pub(crate) fn execute_or_fail(
        &self,
        dependencies: &DependencyCarrier,
        ctx: &PlannerContext,
        consumer: BoxedRowConsumer,
    ) -> Result<(), Rejection> {
        let tree = match NodeOperationTree::new(ctx.job_id().clone(), self.operations.clone()) {
            Ok(tree) => tree,
            Err(e) => return Err(Rejection::new(e, consumer)),
        };

        dependencies
            .launcher(&ctx.config().execution)
            .launch(NodeOperationCtx::new(tree), consumer, ctx.cancellation())
            .map(|_| ())
    }
}
