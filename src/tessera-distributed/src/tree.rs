//! The operation graph of one job.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use common_display::{DisplayNode, DisplayTree};
use common_error::{TesseraResult, graph_err};

use crate::operation::{JobId, NodeId, NodeOperation, PhaseId};

/// The set of node operations for one job.
///
/// Downstream references must form a directed acyclic graph. Construction
/// checks identity and reference integrity; [`verify_acyclic`] checks the
/// acyclicity precondition when asked to.
///
/// [`verify_acyclic`]: NodeOperationTree::verify_acyclic
#[derive(Debug, Clone)]
pub struct NodeOperationTree {
    job_id: JobId,
    operations: Vec<NodeOperation>,
    index: HashMap<PhaseId, usize>,
}

impl NodeOperationTree {
    /// Build a tree from planner output.
    ///
    /// Fails on an empty set, duplicate phase ids, self references and
    /// downstream references to phases outside the set.
    pub fn new(job_id: JobId, operations: Vec<NodeOperation>) -> TesseraResult<Self> {
        if operations.is_empty() {
            graph_err!("job {job_id} has no operations");
        }

        let mut index = HashMap::with_capacity(operations.len());
        for (pos, op) in operations.iter().enumerate() {
            if index.insert(op.phase_id, pos).is_some() {
                graph_err!("job {job_id} has duplicate phase {}", op.phase_id);
            }
        }

        for op in &operations {
            for target in &op.downstream {
                if *target == op.phase_id {
                    graph_err!("phase {} of job {job_id} targets itself", op.phase_id);
                }
                if !index.contains_key(target) {
                    graph_err!(
                        "phase {} of job {job_id} targets unknown phase {target}",
                        op.phase_id
                    );
                }
            }
        }

        Ok(Self {
            job_id,
            operations,
            index,
        })
    }

    /// Check that no phase can reach itself along downstream edges.
    ///
    /// Iterative in-degree elimination; never recurses.
    pub fn verify_acyclic(&self) -> TesseraResult<()> {
        let mut in_degree: HashMap<PhaseId, usize> =
            self.operations.iter().map(|op| (op.phase_id, 0)).collect();
        for op in &self.operations {
            for target in &op.downstream {
                if let Some(count) = in_degree.get_mut(target) {
                    *count += 1;
                }
            }
        }

        let mut queue: VecDeque<PhaseId> = in_degree
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut visited = 0usize;

        while let Some(id) = queue.pop_front() {
            visited += 1;
            let Some(op) = self.get(id) else { continue };
            for target in &op.downstream {
                if let Some(count) = in_degree.get_mut(target) {
                    *count -= 1;
                    if *count == 0 {
                        queue.push_back(*target);
                    }
                }
            }
        }

        if visited != self.operations.len() {
            let mut cyclic: Vec<_> = in_degree
                .into_iter()
                .filter(|(_, count)| *count > 0)
                .map(|(id, _)| id.0)
                .collect();
            cyclic.sort_unstable();
            graph_err!(
                "job {} contains a cycle through phases {cyclic:?}",
                self.job_id
            );
        }
        Ok(())
    }

    /// The job this tree belongs to.
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Operations in planner order.
    pub fn operations(&self) -> &[NodeOperation] {
        &self.operations
    }

    /// Consume the tree into its operations.
    pub fn into_operations(self) -> Vec<NodeOperation> {
        self.operations
    }

    /// Operation for a phase id.
    pub fn get(&self, phase_id: PhaseId) -> Option<&NodeOperation> {
        self.index.get(&phase_id).map(|pos| &self.operations[*pos])
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Always `false` for a constructed tree.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Distinct nodes taking part in the job, sorted.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.operations
            .iter()
            .map(|op| op.node.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Render the graph with each consumer-facing phase as a root and its
    /// producers as children.
    pub fn explain(&self) -> String {
        let mut producers: HashMap<PhaseId, Vec<PhaseId>> = HashMap::new();
        for op in &self.operations {
            for target in &op.downstream {
                producers.entry(*target).or_default().push(op.phase_id);
            }
        }

        let mut root = DisplayNode::new(format!("Job[{}]", self.job_id))
            .with_details(format!("operations={}", self.operations.len()));
        for op in self.operations.iter().filter(|op| op.is_terminal()) {
            let mut path = HashSet::new();
            root = root.with_child(self.display_node(op, &producers, &mut path));
        }
        DisplayTree::new(&root).to_string()
    }

    fn display_node(
        &self,
        op: &NodeOperation,
        producers: &HashMap<PhaseId, Vec<PhaseId>>,
        path: &mut HashSet<PhaseId>,
    ) -> DisplayNode {
        let mut node = DisplayNode::new(op.name.clone())
            .with_details(format!("phase={}, node={}", op.phase_id, op.node));
        if !path.insert(op.phase_id) {
            return node.with_details(format!("phase={}, cycle", op.phase_id));
        }
        for producer in producers.get(&op.phase_id).into_iter().flatten() {
            if let Some(upstream) = self.get(*producer) {
                node = node.with_child(self.display_node(upstream, producers, path));
            }
        }
        path.remove(&op.phase_id);
        node
    }
}
