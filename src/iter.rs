use std::collections::VecDeque;
use std::sync::Arc;

use crate::{Node, NodeId, Tree};

/// The traversal order for iterating over the nodes in a subtree.
#[derive(Clone, Copy)]
pub enum TraversalOrder {
    /// Depth-first pre-order traversal
    DepthFirst,
    /// Breadth-first traversal
    BreadthFirst,
}

/// An iterator over a node and its descendants in either depth-first or
/// breadth-first order.
///
/// The iterator is lazy: it takes one short read lock per step and yields
/// one node at a time. It assumes the subtree is not mutated while the
/// iteration is in progress.
pub struct TreeIter<T> {
    tree: Arc<Tree<T>>,
    order: TraversalOrder,
    start: NodeId,
    // For BFS
    queue: VecDeque<NodeId>,
    // For DFS
    last_node: Option<NodeId>,
}

impl<T> TreeIter<T> {
    pub(crate) fn new(tree: Arc<Tree<T>>, start: NodeId, order: TraversalOrder) -> Self {
        let mut queue = VecDeque::new();
        if matches!(order, TraversalOrder::BreadthFirst) {
            queue.push_back(start);
        }

        Self {
            tree,
            order,
            queue,
            start,
            last_node: None,
        }
    }
}

impl<T> Iterator for TreeIter<T> {
    type Item = Node<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.order {
            TraversalOrder::BreadthFirst => {
                let current_id = self.queue.pop_front()?;

                let structure = self.tree.structure.read();
                if let Some(children) = structure.get_children(current_id) {
                    for &child in children {
                        self.queue.push_back(child);
                    }
                }
                drop(structure);

                Some(Node::new(current_id, self.tree.clone()))
            }

            TraversalOrder::DepthFirst => {
                let Some(last_node) = self.last_node else {
                    self.last_node = Some(self.start);
                    return Some(Node::new(self.start, self.tree.clone()));
                };

                let structure = self.tree.structure.read();
                let children = structure.get_children(last_node)?;

                if !children.is_empty() {
                    let next_id = children[0];
                    self.last_node = Some(next_id);
                    drop(structure);
                    Some(Node::new(next_id, self.tree.clone()))
                } else {
                    // No children, backtrack to find next sibling
                    let mut current = last_node;
                    loop {
                        // Stop if we've reached the start node while backtracking
                        if current == self.start {
                            return None;
                        }

                        let parent_id = structure.get_parent(current)?;
                        let siblings = structure.get_children(parent_id)?;
                        let current_idx = siblings.iter().position(|id| *id == current)?;

                        if current_idx + 1 < siblings.len() {
                            let next_id = siblings[current_idx + 1];
                            self.last_node = Some(next_id);
                            drop(structure);
                            return Some(Node::new(next_id, self.tree.clone()));
                        }

                        current = parent_id;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Node, Tree};

    use super::TraversalOrder;

    fn setup_tree() -> Node<i32> {
        let tree = Tree::new();
        let root = tree.create_node(0);

        let node1 = root.add_child(1);
        let node2 = root.add_child(2);
        let node3 = root.add_child(3);

        node1.add_child(4);
        node1.add_child(5);

        node2.add_child(6);
        node2.add_child(7);
        node2.add_child(8);

        node3.add_child(9);

        root
    }

    #[test]
    fn test_dfs() {
        let root = setup_tree();
        let result = root
            .traverse(TraversalOrder::DepthFirst)
            .map(|n| *n.content())
            .collect::<Vec<_>>();

        assert_eq!(result, vec![0, 1, 4, 5, 2, 6, 7, 8, 3, 9]);
    }

    #[test]
    fn test_bfs() {
        let root = setup_tree();
        let result = root
            .traverse(TraversalOrder::BreadthFirst)
            .map(|n| *n.content())
            .collect::<Vec<_>>();

        assert_eq!(result, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_start_at() {
        let root = setup_tree();
        let node1 = root.children().into_iter().next().unwrap();
        let result = node1
            .traverse(TraversalOrder::DepthFirst)
            .map(|n| *n.content())
            .collect::<Vec<_>>();

        assert_eq!(result, vec![1, 4, 5]);
    }

    #[test]
    fn test_iter_defaults_to_bfs() {
        let root = setup_tree();
        let result = root.iter().map(|n| *n.content()).collect::<Vec<_>>();

        assert_eq!(result, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_single_node() {
        let tree = Tree::new();
        let root = tree.create_node(0);

        assert_eq!(root.iter().count(), 1);
        assert_eq!(root.traverse(TraversalOrder::DepthFirst).count(), 1);
    }
}
