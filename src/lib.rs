#![doc = include_str!("../README.md")]

mod error;
mod iter;
mod node;
mod tree;
mod tree_structure;

pub use error::TreeError;
pub use iter::{TraversalOrder, TreeIter};
pub use node::{Node, NodeId};
pub use tree::Tree;

/// A convenience type alias for the result of tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;
