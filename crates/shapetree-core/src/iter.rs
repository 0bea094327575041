//! Tree walks
//!
//! Pre- and post-order iteration over a tree (or subtree) of shapes,
//! skipping subtrees whose root is ignored. A pre-order walk from a
//! subtree root runs until the root's "uncle" - the first sibling found
//! while climbing toward the tree root; a post-order walk starts at the
//! deepest first descendant and ends where a step past the subtree root
//! would land.

use crate::shape::NodeId;
use crate::tree::ShapeTree;

/// Order of a tree walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Parents before children
    Pre,
    /// Children before parents
    Post,
}

/// Iterator over the non-ignored shapes of a (sub)tree
#[derive(Debug, Clone)]
pub struct TreeIter<'a> {
    tree: &'a ShapeTree,
    cur: Option<NodeId>,
    end: Option<NodeId>,
    order: Order,
}

impl<'a> TreeIter<'a> {
    pub(crate) fn new(tree: &'a ShapeTree, root: NodeId, order: Order) -> Self {
        if tree.shape(root).ignore {
            // The whole subtree is skipped.
            return TreeIter {
                tree,
                cur: Some(root),
                end: Some(root),
                order,
            };
        }
        let (cur, end) = match order {
            Order::Pre => (Some(root), uncle(tree, root)),
            Order::Post => (Some(go_bottom(tree, root)), post_step(tree, root)),
        };
        TreeIter {
            tree,
            cur,
            end,
            order,
        }
    }
}

impl Iterator for TreeIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.cur?;
        if Some(cur) == self.end {
            return None;
        }
        self.cur = match self.order {
            Order::Pre => self
                .tree
                .find_child(cur)
                .or_else(|| uncle(self.tree, cur)),
            Order::Post => post_step(self.tree, cur),
        };
        Some(cur)
    }
}

/// Deepest shape reached by following first children from `id`.
fn go_bottom(tree: &ShapeTree, mut id: NodeId) -> NodeId {
    while let Some(c) = tree.find_child(id) {
        id = c;
    }
    id
}

/// First sibling found while climbing from `id` toward the tree root.
fn uncle(tree: &ShapeTree, mut id: NodeId) -> Option<NodeId> {
    loop {
        if let Some(sib) = tree.find_sibling(id) {
            return Some(sib);
        }
        id = tree.find_parent(id)?;
    }
}

/// One post-order step from `id`.
fn post_step(tree: &ShapeTree, id: NodeId) -> Option<NodeId> {
    match tree.find_sibling(id) {
        Some(sib) => Some(go_bottom(tree, sib)),
        None => tree.find_parent(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root -> a -> (a1, a2), root -> b
    fn sample_tree() -> (ShapeTree, NodeId, NodeId, NodeId, NodeId) {
        let mut tree = ShapeTree::new(4, 4).unwrap();
        let b = tree.add_child(ShapeTree::ROOT);
        let a = tree.add_child(ShapeTree::ROOT);
        let a2 = tree.add_child(a);
        let a1 = tree.add_child(a);
        (tree, a, b, a1, a2)
    }

    #[test]
    fn test_preorder_visits_parents_first() {
        let (tree, a, b, a1, a2) = sample_tree();
        let order: Vec<NodeId> = tree.iter(Order::Pre).collect();
        assert_eq!(order, vec![ShapeTree::ROOT, a, a1, a2, b]);
    }

    #[test]
    fn test_postorder_visits_children_first() {
        let (tree, a, b, a1, a2) = sample_tree();
        let order: Vec<NodeId> = tree.iter(Order::Post).collect();
        assert_eq!(order, vec![a1, a2, a, b, ShapeTree::ROOT]);
    }

    #[test]
    fn test_subtree_walk() {
        let (tree, a, _b, a1, a2) = sample_tree();
        let order: Vec<NodeId> = tree.subtree(a, Order::Pre).collect();
        assert_eq!(order, vec![a, a1, a2]);
        let order: Vec<NodeId> = tree.subtree(a, Order::Post).collect();
        assert_eq!(order, vec![a1, a2, a]);
    }

    #[test]
    fn test_ignored_subtree_is_skipped() {
        let (mut tree, a, b, _a1, _a2) = sample_tree();
        tree.shape_mut(a).ignore = true;
        // A subtree walk from an ignored root yields nothing; the whole-tree
        // walk surfaces a's children in a's place.
        assert_eq!(tree.subtree(a, Order::Pre).count(), 0);
        let order: Vec<NodeId> = tree.iter(Order::Pre).collect();
        assert_eq!(order.len(), 4);
        assert!(order.contains(&ShapeTree::ROOT) && order.contains(&b));
        assert!(!order.contains(&a));
    }
}
