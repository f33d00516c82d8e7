use std::{
    collections::HashSet,
    fmt,
    hash::{Hash, Hasher},
    io,
    sync::Arc,
};

use parking_lot::{MappedRwLockReadGuard, RwLockReadGuard};
use tracing::instrument;

use crate::{
    iter::{TraversalOrder, TreeIter},
    Result, Tree, TreeError,
};

/// A stable handle identifying a node within its [`Tree`].
///
/// Ids are assigned by the tree at creation time and are never reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cheap, cloneable handle to a node in a [`Tree`].
///
/// All mutation and query operations live here. Handles compare equal when
/// they refer to the same node of the same tree; content plays no part in
/// equality, since two distinct nodes may hold equal content.
pub struct Node<T> {
    id: NodeId,
    tree: Arc<Tree<T>>,
}

impl<T> Node<T> {
    pub(crate) fn new(id: NodeId, tree: Arc<Tree<T>>) -> Self {
        Self { id, tree }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// A read guard over this node's content.
    ///
    /// The content is set at creation and never changes; the guard only
    /// exists because the node lives in the shared store. Holding it blocks
    /// mutations, so drop it before calling `add` or `remove`.
    pub fn content(&self) -> MappedRwLockReadGuard<'_, T> {
        RwLockReadGuard::map(self.tree.structure.read(), |structure| {
            &structure.nodes[&self.id].content
        })
    }

    /// Attaches `node` as a child of this node and returns its handle, so
    /// construction can be chained.
    ///
    /// Fails with [`TreeError::Cycle`] if `node` is this node or one of its
    /// ancestors, and with [`TreeError::ForeignNode`] if it was created by a
    /// different tree. On failure nothing is modified.
    ///
    /// A node that is still attached to another parent is repointed here
    /// while the old parent's child list keeps its entry; call
    /// [`remove`](Node::remove) on the old parent first to move a node
    /// cleanly.
    #[instrument(level = "debug", skip(self))]
    pub fn add(&self, node: &Node<T>) -> Result<Node<T>> {
        if !Arc::ptr_eq(&self.tree, &node.tree) {
            return Err(TreeError::ForeignNode(node.id));
        }

        let mut structure = self.tree.structure.write();
        if node.id == self.id || structure.is_ancestor(node.id, self.id) {
            return Err(TreeError::Cycle(node.id, self.id));
        }

        structure.link(self.id, node.id);
        Ok(node.clone())
    }

    /// Creates a node holding `content` and attaches it in one step.
    ///
    /// A freshly created node cannot be an ancestor, so this never fails.
    #[instrument(level = "debug", skip(self, content))]
    pub fn add_child(&self, content: T) -> Node<T> {
        let mut structure = self.tree.structure.write();
        let id = structure.insert(content);
        structure.link(self.id, id);
        drop(structure);
        Node::new(id, self.tree.clone())
    }

    /// [`add_child`](Node::add_child) with `T::default()` as the content.
    pub fn add_default(&self) -> Node<T>
    where
        T: Default,
    {
        self.add_child(T::default())
    }

    /// Detaches a direct child, turning it into the root of its own subtree.
    ///
    /// Fails with [`TreeError::NotAChild`] if `child` is not currently a
    /// direct child of this node; nothing is modified in that case.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&self, child: &Node<T>) -> Result<()> {
        if !Arc::ptr_eq(&self.tree, &child.tree) {
            return Err(TreeError::ForeignNode(child.id));
        }

        let mut structure = self.tree.structure.write();
        let is_child = structure
            .get_children(self.id)
            .is_some_and(|children| children.contains(&child.id));
        if !is_child {
            return Err(TreeError::NotAChild(child.id, self.id));
        }

        structure.unlink(self.id, child.id);
        Ok(())
    }

    /// True iff this node has no parent.
    pub fn is_root(&self) -> bool {
        self.tree.structure.read().get_parent(self.id).is_none()
    }

    /// True iff this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.tree
            .structure
            .read()
            .get_children(self.id)
            .is_none_or(|children| children.is_empty())
    }

    pub fn parent(&self) -> Option<Node<T>> {
        self.tree
            .structure
            .read()
            .get_parent(self.id)
            .map(|id| Node::new(id, self.tree.clone()))
    }

    /// Handles for the direct children, in attachment order.
    pub fn children(&self) -> Vec<Node<T>> {
        let structure = self.tree.structure.read();
        structure
            .get_children(self.id)
            .unwrap_or_default()
            .iter()
            .map(|&id| Node::new(id, self.tree.clone()))
            .collect()
    }

    /// Walks parent links up to the root of this node's tree. Returns this
    /// node itself if it is a root.
    pub fn root(&self) -> Node<T> {
        let structure = self.tree.structure.read();
        let mut current = self.id;
        while let Some(parent) = structure.get_parent(current) {
            current = parent;
        }
        drop(structure);
        Node::new(current, self.tree.clone())
    }

    /// The number of edges between this node and its root. 0 for a root.
    pub fn depth(&self) -> usize {
        self.tree.structure.read().depth(self.id)
    }

    /// The chain of ancestors from the root down to (but excluding) this
    /// node. Empty for a root.
    pub fn ancestors(&self) -> Vec<Node<T>> {
        let structure = self.tree.structure.read();
        let mut ids = Vec::new();
        let mut current = structure.get_parent(self.id);
        while let Some(parent) = current {
            ids.push(parent);
            current = structure.get_parent(parent);
        }
        drop(structure);

        ids.reverse();
        ids.into_iter()
            .map(|id| Node::new(id, self.tree.clone()))
            .collect()
    }

    /// True iff this node appears on the path from `node` up to its root.
    /// A node is never its own ancestor.
    pub fn is_ancestor_of(&self, node: &Node<T>) -> bool {
        Arc::ptr_eq(&self.tree, &node.tree)
            && self.tree.structure.read().is_ancestor(self.id, node.id)
    }

    /// Every node strictly below this one. Empty for a leaf.
    pub fn descendants(&self) -> HashSet<Node<T>> {
        let structure = self.tree.structure.read();
        let mut ids = HashSet::new();
        structure.collect_descendants(self.id, &mut ids);
        drop(structure);

        ids.into_iter()
            .map(|id| Node::new(id, self.tree.clone()))
            .collect()
    }

    /// Every leaf reachable from this node; `{self}` if this node is a leaf.
    pub fn leaves(&self) -> HashSet<Node<T>> {
        let structure = self.tree.structure.read();
        let mut ids = HashSet::new();
        structure.collect_leaves(self.id, &mut ids);
        drop(structure);

        ids.into_iter()
            .map(|id| Node::new(id, self.tree.clone()))
            .collect()
    }

    /// The parent's other children. Empty for a root.
    pub fn siblings(&self) -> HashSet<Node<T>> {
        let structure = self.tree.structure.read();
        let ids = match structure.get_parent(self.id) {
            None => Vec::new(),
            Some(parent) => structure
                .get_children(parent)
                .unwrap_or_default()
                .iter()
                .copied()
                .filter(|id| *id != self.id)
                .collect(),
        };
        drop(structure);

        ids.into_iter()
            .map(|id| Node::new(id, self.tree.clone()))
            .collect()
    }

    /// A lazy breadth-first iterator over this node and its descendants:
    /// this node first, then each level of children in turn.
    pub fn iter(&self) -> TreeIter<T> {
        self.traverse(TraversalOrder::BreadthFirst)
    }

    /// Like [`iter`](Node::iter), with an explicit traversal order.
    pub fn traverse(&self, order: TraversalOrder) -> TreeIter<T> {
        TreeIter::new(self.tree.clone(), self.id, order)
    }

    /// Eagerly visits this node and all descendants breadth-first.
    pub fn each(&self, mut f: impl FnMut(&Node<T>)) {
        for node in self.iter() {
            f(&node);
        }
    }

    /// Renders this subtree to `out`, one node per line in depth-first
    /// pre-order, indented two spaces per level below this node, using
    /// `label` as the line text.
    pub fn print_with<W: io::Write>(
        &self,
        out: &mut W,
        label: impl Fn(&Node<T>) -> String,
    ) -> io::Result<()> {
        let mut rendered = String::new();
        self.render(&mut rendered, &label, 0);
        out.write_all(rendered.as_bytes())
    }

    fn render(&self, out: &mut String, label: &impl Fn(&Node<T>) -> String, level: usize) {
        for _ in 0..level {
            out.push_str("  ");
        }
        out.push_str(&label(self));
        out.push('\n');

        for child in self.children() {
            child.render(out, label, level + 1);
        }
    }
}

impl<T: fmt::Display> Node<T> {
    /// [`print_with`](Node::print_with) labelling each node with the
    /// `Display` form of its content.
    pub fn print<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_with(out, |node| node.content().to_string())
    }
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            tree: self.tree.clone(),
        }
    }
}

impl<T> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Node").field(&self.id).finish()
    }
}

impl<T: fmt::Display> fmt::Display for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered = String::new();
        self.render(&mut rendered, &|node: &Node<T>| node.content().to_string(), 0);
        f.write_str(&rendered)
    }
}

impl<T> PartialEq for Node<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.tree, &other.tree)
    }
}

impl<T> Eq for Node<T> {}

impl<T> Hash for Node<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readding_an_attached_node_keeps_the_old_child_entry() {
        // Pins the documented `add` behavior: no implicit detach.
        let tree = Tree::new();
        let a = tree.create_node("a");
        let b = tree.create_node("b");
        let c = a.add_child("c");

        b.add(&c).unwrap();

        assert_eq!(c.parent(), Some(b.clone()));
        assert!(a.children().contains(&c));
        assert!(b.children().contains(&c));
    }

    #[test]
    fn print_indents_two_spaces_per_level() {
        let tree = Tree::new();
        let root = tree.create_node("root");
        let c1 = root.add_child("c1");
        c1.add_child("gc");
        root.add_child("c2");

        let mut out = Vec::new();
        root.print(&mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "root\n  c1\n    gc\n  c2\n"
        );
    }

    #[test]
    fn print_indentation_is_relative_to_the_printed_node() {
        let tree = Tree::new();
        let root = tree.create_node("root");
        let c1 = root.add_child("c1");
        c1.add_child("gc");

        let mut out = Vec::new();
        c1.print(&mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "c1\n  gc\n");
    }

    #[test]
    fn print_with_uses_the_label_fn() {
        let tree = Tree::new();
        let root = tree.create_node(1);
        root.add_child(2);

        let mut out = Vec::new();
        root.print_with(&mut out, |node| format!("<{}>", *node.content()))
            .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "<1>\n  <2>\n");
    }

    #[test]
    fn display_matches_print() {
        let tree = Tree::new();
        let root = tree.create_node("root");
        root.add_child("child");

        assert_eq!(root.to_string(), "root\n  child\n");
    }

    #[test]
    fn handles_compare_by_identity_not_content() {
        let tree = Tree::new();
        let a = tree.create_node("same");
        let b = tree.create_node("same");

        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
