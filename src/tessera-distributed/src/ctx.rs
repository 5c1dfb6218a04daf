//! Leaf discovery over an operation graph.
//!
//! Leaves are the operations nobody produces for: their phase id never
//! appears in another operation's downstream list, so they can start
//! immediately and in any order. Everything here is linear in operations
//! plus edges and never recurses.

use std::collections::{HashMap, HashSet};

use crate::operation::{JobId, NodeOperation, PhaseId};
use crate::tree::NodeOperationTree;

/// Dispatch context for the operations of one job.
#[derive(Debug, Clone)]
pub struct NodeOperationCtx {
    tree: NodeOperationTree,
}

impl NodeOperationCtx {
    /// Create a context for a constructed tree.
    pub fn new(tree: NodeOperationTree) -> Self {
        Self { tree }
    }

    /// The job being dispatched.
    pub fn job_id(&self) -> &JobId {
        self.tree.job_id()
    }

    /// The underlying operation graph.
    pub fn tree(&self) -> &NodeOperationTree {
        &self.tree
    }

    /// Operation for a phase id.
    pub fn operation(&self, phase_id: PhaseId) -> Option<&NodeOperation> {
        self.tree.get(phase_id)
    }

    /// Phase ids of operations with no upstream producer.
    ///
    /// Returned in planner order; callers must not rely on it.
    pub fn find_leafs(&self) -> Vec<PhaseId> {
        let targets: HashSet<PhaseId> = self
            .tree
            .operations()
            .iter()
            .flat_map(|op| op.downstream.iter().copied())
            .collect();

        self.tree
            .operations()
            .iter()
            .map(|op| op.phase_id)
            .filter(|id| !targets.contains(id))
            .collect()
    }

    /// Number of producers naming each operation as a downstream target.
    ///
    /// Leaves map to zero.
    pub fn upstream_counts(&self) -> HashMap<PhaseId, usize> {
        let mut counts: HashMap<PhaseId, usize> = self
            .tree
            .operations()
            .iter()
            .map(|op| (op.phase_id, 0))
            .collect();
        for op in self.tree.operations() {
            for target in &op.downstream {
                *counts.entry(*target).or_insert(0) += 1;
            }
        }
        counts
    }
}
