use std::collections::{HashMap, HashSet};

use tracing::instrument;

use crate::node::NodeId;

/// A single node as stored in the arena.
#[derive(Debug)]
pub(crate) struct TreeNode<T> {
    pub id: NodeId,
    pub content: T,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// The interior of a [`Tree`](crate::Tree): an arena of nodes keyed by stable
/// integer handles, plus the id-level algorithms the public API is built on.
///
/// Nodes are never removed from the arena. Detaching a node only severs its
/// parent link; the node and its subtree stay valid and independently rooted.
#[derive(Debug)]
pub(crate) struct TreeStructure<T> {
    pub nodes: HashMap<NodeId, TreeNode<T>>,
    next_id: u64,
}

impl<T> TreeStructure<T> {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            next_id: 0,
        }
    }

    /// Allocates a fresh detached node and returns its handle.
    pub fn insert(&mut self, content: T) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            TreeNode {
                id,
                content,
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get_children(&self, id: NodeId) -> Option<&[NodeId]> {
        self.nodes.get(&id).map(|node| node.children.as_slice())
    }

    pub fn get_parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    /// Walks parent links from `node` to its root, testing each ancestor
    /// against `candidate`. A node is never its own ancestor.
    pub fn is_ancestor(&self, candidate: NodeId, node: NodeId) -> bool {
        if candidate == node {
            return false;
        }

        let mut current = self.get_parent(node);
        while let Some(parent) = current {
            if parent == candidate {
                return true;
            }
            current = self.get_parent(parent);
        }

        false
    }

    /// Points `child` at `parent` and records it in the parent's child list.
    ///
    /// Callers have already ruled out cycles. A child that is still attached
    /// to another parent keeps its entry in that parent's child list; the
    /// caller detaches with [`unlink`](Self::unlink) first if it wants a move.
    #[instrument(level = "trace", skip(self))]
    pub fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            if !node.children.contains(&child) {
                node.children.push(child);
            }
        }
    }

    /// Severs the link between `parent` and a direct child, leaving the
    /// child's own subtree intact.
    #[instrument(level = "trace", skip(self))]
    pub fn unlink(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = None;
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.retain(|id| *id != child);
        }
    }

    pub fn depth(&self, id: NodeId) -> usize {
        match self.get_parent(id) {
            None => 0,
            Some(parent) => 1 + self.depth(parent),
        }
    }

    pub fn collect_descendants(&self, id: NodeId, acc: &mut HashSet<NodeId>) {
        if let Some(children) = self.get_children(id) {
            for &child in children {
                acc.insert(child);
                self.collect_descendants(child, acc);
            }
        }
    }

    pub fn collect_leaves(&self, id: NodeId, acc: &mut HashSet<NodeId>) {
        match self.get_children(id) {
            Some(children) if !children.is_empty() => {
                for &child in children {
                    self.collect_leaves(child, acc);
                }
            }
            _ => {
                acc.insert(id);
            }
        }
    }
}
