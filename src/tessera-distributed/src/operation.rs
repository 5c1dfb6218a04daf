//! Node operations: the dispatchable units of a distributed job.
//!
//! An operation runs one execution phase on one node and names the phases
//! that receive its output. Data flows from an operation to its downstream
//! targets, so a target may only start once all of its producers completed.

use std::fmt;

use serde::{Deserialize, Serialize};

use tessera_core::{Row, acknowledgement_row};

/// Identifier of an execution phase, unique within a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhaseId(pub u32);

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a cluster node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a node id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one execution of an operation graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    /// Create a job id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One node-local unit of distributed work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeOperation {
    /// Phase identifier, unique within the job.
    pub phase_id: PhaseId,
    /// Phase name for logging and explain output (e.g. `collect`, `merge`).
    pub name: String,
    /// Node that executes the phase.
    pub node: NodeId,
    /// Phases receiving this operation's output, without duplicates.
    pub downstream: Vec<PhaseId>,
}

impl NodeOperation {
    /// Create an operation without downstream targets.
    pub fn new(phase_id: u32, name: impl Into<String>, node: impl Into<String>) -> Self {
        Self {
            phase_id: PhaseId(phase_id),
            name: name.into(),
            node: NodeId::new(node),
            downstream: Vec::new(),
        }
    }

    /// Add a downstream target; repeated targets are ignored.
    pub fn with_downstream(mut self, phase_id: u32) -> Self {
        let target = PhaseId(phase_id);
        if !self.downstream.contains(&target) {
            self.downstream.push(target);
        }
        self
    }

    /// Whether the output of this operation goes to the job's consumer.
    pub fn is_terminal(&self) -> bool {
        self.downstream.is_empty()
    }
}

impl fmt::Display for NodeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[phase={}, node={}]", self.name, self.phase_id, self.node)
    }
}

/// What a node reports when an operation completes.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOperationResult {
    /// Streamed result rows.
    Rows(Vec<Row>),
    /// A single acknowledgement.
    Acknowledged(bool),
}

impl NodeOperationResult {
    /// Rows to deliver to the consumer when the operation is terminal.
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Self::Rows(rows) => rows,
            Self::Acknowledged(acknowledged) => vec![acknowledgement_row(acknowledged)],
        }
    }
}
