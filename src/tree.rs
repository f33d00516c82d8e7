use std::sync::Arc;

use parking_lot::RwLock;
use tracing::instrument;

use crate::{
    node::{Node, NodeId},
    tree_structure::TreeStructure,
};

/// The shared store that owns every node created from it.
///
/// A `Tree` starts empty; nodes are created with [`create_node`](Tree::create_node)
/// and wired together through the [`Node`] handles it returns. There is no
/// distinguished root type — any node without a parent is a root, so a single
/// `Tree` may hold several independent trees at once.
///
/// Reads may run concurrently. Mutations (`add`/`remove`) take the write lock
/// one at a time, but compound sequences of operations are not transactional;
/// callers that need a stable structure across several calls must serialize
/// externally.
pub struct Tree<T> {
    pub(crate) structure: RwLock<TreeStructure<T>>,
}

impl<T> Tree<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            structure: RwLock::new(TreeStructure::new()),
        })
    }

    /// Creates an isolated root node holding `content` and returns its handle.
    #[instrument(level = "debug", skip(self, content))]
    pub fn create_node(self: &Arc<Self>, content: T) -> Node<T> {
        let id = self.structure.write().insert(content);
        Node::new(id, self.clone())
    }

    /// Returns a handle for `id`, or `None` if no such node was ever created
    /// in this tree.
    pub fn get(self: &Arc<Self>, id: NodeId) -> Option<Node<T>> {
        if self.structure.read().contains(id) {
            Some(Node::new(id, self.clone()))
        } else {
            None
        }
    }

    /// Handles for every node that currently has no parent.
    pub fn roots(self: &Arc<Self>) -> Vec<Node<T>> {
        let structure = self.structure.read();
        let mut ids = structure
            .nodes
            .values()
            .filter(|node| node.parent.is_none())
            .map(|node| node.id)
            .collect::<Vec<_>>();
        ids.sort();
        ids.into_iter().map(|id| Node::new(id, self.clone())).collect()
    }

    /// The number of nodes ever created in this tree, attached or not.
    pub fn len(&self) -> usize {
        self.structure.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_node_starts_detached() {
        let tree = Tree::new();
        let node = tree.create_node("a");

        assert!(node.is_root());
        assert!(node.is_leaf());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn get_resolves_known_ids_only() {
        let tree = Tree::new();
        let node = tree.create_node("a");

        assert_eq!(tree.get(node.id()), Some(node));
        assert!(tree.get(NodeId(42)).is_none());
    }

    #[test]
    fn roots_tracks_detachment() {
        let tree = Tree::new();
        let a = tree.create_node("a");
        let b = tree.create_node("b");
        a.add(&b).unwrap();

        assert_eq!(tree.roots(), vec![a.clone()]);

        a.remove(&b).unwrap();
        assert_eq!(tree.roots(), vec![a, b]);
    }
}
