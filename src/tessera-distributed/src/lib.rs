//! Distributed dispatch of node operation graphs.
//!
//! A planner produces a [`NodeOperationTree`]: node-local operations linked
//! by the phases that receive their output. [`NodeOperationCtx`] finds the
//! leaves to start from and [`JobLauncher`] drives the graph to completion
//! through a [`NodeOperationSubmitter`].

pub mod ctx;
pub mod launcher;
pub mod operation;
pub mod submitter;
pub mod testing;
pub mod tree;

pub use ctx::NodeOperationCtx;
pub use launcher::JobLauncher;
pub use operation::{JobId, NodeId, NodeOperation, NodeOperationResult, PhaseId};
pub use submitter::NodeOperationSubmitter;
pub use tree::NodeOperationTree;
