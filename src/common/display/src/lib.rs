//! Display utilities for Tessera.
//!
//! Provides tree rendering for operation graphs.

mod tree;

pub use tree::{DisplayNode, DisplayTree, TreeNode};
