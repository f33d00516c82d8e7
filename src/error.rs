use std::{error::Error, fmt};

use crate::node::NodeId;

/// Errors that can occur when manipulating a tree.
///
/// Every failing operation is all-or-nothing: the tree is left untouched.
pub enum TreeError {
    /// Attaching the first node under the second would create a cycle.
    Cycle(NodeId, NodeId),
    /// The first node is not a direct child of the second.
    NotAChild(NodeId, NodeId),
    /// The node belongs to a different tree.
    ForeignNode(NodeId),
}

impl Error for TreeError {}

impl fmt::Debug for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::Cycle(node, parent) => write!(f, "Cycle({} -> {})", node, parent),
            TreeError::NotAChild(child, parent) => {
                write!(f, "NotAChild({} -> {})", child, parent)
            }
            TreeError::ForeignNode(node) => write!(f, "ForeignNode({})", node),
        }
    }
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::Cycle(node, parent) => {
                write!(
                    f,
                    "Cannot add node {}: it is an ancestor of node {}",
                    node, parent
                )
            }
            TreeError::NotAChild(child, parent) => {
                write!(f, "Node {} is not a child of node {}", child, parent)
            }
            TreeError::ForeignNode(node) => {
                write!(f, "Node {} belongs to a different tree", node)
            }
        }
    }
}
