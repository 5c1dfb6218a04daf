//! Tree display utilities for operation graphs.

use std::fmt;

/// A node in a display tree.
pub trait TreeNode {
    /// Get the display name of this node.
    fn name(&self) -> &str;

    /// Get child nodes.
    fn children(&self) -> Vec<&dyn TreeNode>;

    /// Get additional details to display.
    fn details(&self) -> Option<String> {
        None
    }
}

/// Owned tree node for structures that are not trees themselves.
///
/// Graph renderers build these on the fly; a node reachable along two paths
/// simply appears twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayNode {
    /// Label printed for the node.
    pub name: String,
    /// Optional parenthesized details.
    pub details: Option<String>,
    /// Child nodes in print order.
    pub children: Vec<DisplayNode>,
}

impl DisplayNode {
    /// Create a leaf display node.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            details: None,
            children: Vec::new(),
        }
    }

    /// Attach details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Append a child.
    pub fn with_child(mut self, child: DisplayNode) -> Self {
        self.children.push(child);
        self
    }
}

impl TreeNode for DisplayNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn children(&self) -> Vec<&dyn TreeNode> {
        self.children.iter().map(|c| c as &dyn TreeNode).collect()
    }

    fn details(&self) -> Option<String> {
        self.details.clone()
    }
}

/// Helper for displaying tree structures.
pub struct DisplayTree<'a> {
    root: &'a dyn TreeNode,
}

impl<'a> DisplayTree<'a> {
    /// Create a new display tree.
    pub fn new(root: &'a dyn TreeNode) -> Self {
        Self { root }
    }

    fn fmt_node(
        f: &mut fmt::Formatter<'_>,
        node: &dyn TreeNode,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let connector = if is_last { "└─ " } else { "├─ " };

        write!(f, "{prefix}{connector}{}", node.name())?;

        if let Some(details) = node.details() {
            write!(f, " ({details})")?;
        }
        writeln!(f)?;

        let children = node.children();
        let child_prefix = format!("{prefix}{}", if is_last { "   " } else { "│  " });

        for (i, child) in children.iter().enumerate() {
            let is_last_child = i == children.len() - 1;
            Self::fmt_node(f, *child, &child_prefix, is_last_child)?;
        }

        Ok(())
    }
}

impl fmt::Display for DisplayTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root.name())?;
        if let Some(details) = self.root.details() {
            write!(f, " ({details})")?;
        }
        writeln!(f)?;

        let children = self.root.children();
        for (i, child) in children.iter().enumerate() {
            let is_last = i == children.len() - 1;
            Self::fmt_node(f, *child, "", is_last)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_tree() {
        let tree = DisplayNode::new("Job")
            .with_child(DisplayNode::new("collect").with_details("node=n1"))
            .with_child(DisplayNode::new("merge").with_child(DisplayNode::new("scan")));

        let output = DisplayTree::new(&tree).to_string();
        let expected = "Job\n├─ collect (node=n1)\n└─ merge\n   └─ scan\n";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_root_details() {
        let tree = DisplayNode::new("Job").with_details("ops=0");
        assert_eq!(DisplayTree::new(&tree).to_string(), "Job (ops=0)\n");
    }
}
