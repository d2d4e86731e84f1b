//! A mutable, unbalanced BST whose nodes keep a link to their parent. Nodes live in an arena and
//! refer to each other by slot index, so parent links never own anything and a deleted node's
//! slot can be reused safely.
//!
//! Equal values are allowed. On insertion they go to the left of any node they compare equal to.
//!
//! # Examples
//!
//! ```
//! use arena_bst::arena::Tree;
//!
//! let mut tree = Tree::new();
//!
//! // Nothing in here yet.
//! assert_eq!(tree.find(&1), None);
//!
//! // Inserting hands back a handle to the new node.
//! let one = tree.insert(1);
//! assert_eq!(tree.find(&1), Some(one));
//! assert_eq!(tree[one], 1);
//!
//! // Equal values are kept side by side.
//! tree.insert(1);
//! tree.insert(0);
//! assert_eq!(tree.walk().copied().collect::<Vec<_>>(), vec![0, 1, 1]);
//!
//! // Deleting by value returns the removed value.
//! assert_eq!(tree.delete(&1), Some(1));
//! assert_eq!(tree.delete(&1), Some(1));
//! assert_eq!(tree.delete(&1), None);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::ops::Index;

use tracing::trace;

use crate::error::{Error, Result};
use crate::iter::{Walk, WalkNodes};
use crate::slots::{NodeId, Slots};

/// Which child slot of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) parent: Option<usize>,
    pub(crate) left: Option<usize>,
    pub(crate) right: Option<usize>,
}

impl<T: Clone> Clone for Node<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            parent: self.parent,
            left: self.left,
            right: self.right,
        }
    }
}

impl<T> Node<T> {
    fn new(value: T, parent: Option<usize>) -> Self {
        Self {
            value,
            parent,
            left: None,
            right: None,
        }
    }

    fn child(&self, side: Side) -> Option<usize> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn child_mut(&mut self, side: Side) -> &mut Option<usize> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// A Binary Search Tree holding values of type `T`. It supports inserting, finding, and deleting
/// values, walking them in sorted order, and moving between neighbouring nodes.
///
/// The tree does no rebalancing: inserting values in sorted order yields a chain as deep as the
/// tree is long.
pub struct Tree<T> {
    nodes: Slots<Node<T>>,
    root: Option<usize>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Tree<T> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("len", &self.len())
            .field("root", &self.root().map(|root| root.value()))
            .field("values", &Values(self))
            .finish()
    }
}

/// Prints the values of a tree as a flat, sorted list. Stack use does not depend on the height
/// of the tree.
struct Values<'a, T>(&'a Tree<T>);

impl<'a, T: fmt::Debug> fmt::Debug for Values<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.walk()).finish()
    }
}

impl<T> Tree<T> {
    /// Generates a new, empty `Tree`.
    pub fn new() -> Self {
        Self {
            nodes: Slots::new(),
            root: None,
        }
    }

    /// Generates a new, empty `Tree` with room for `capacity` nodes before it reallocates.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Slots::with_capacity(capacity),
            root: None,
        }
    }

    /// The number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The number of nodes the tree can hold before it reallocates. Slots freed by deletion count
    /// towards this.
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Releases memory held by deleted nodes where possible.
    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
    }

    /// Removes every node. All previously handed out [`NodeId`]s go stale.
    pub fn clear(&mut self) {
        trace!(len = self.len(), "clearing tree");
        self.nodes.clear();
        self.root = None;
    }

    /// The root node, if the tree is not empty.
    pub fn root(&self) -> Option<NodeRef<'_, T>> {
        self.root.map(|index| self.node_ref(index))
    }

    /// Looks up a node by handle. Returns `None` if the node has been deleted.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_, T>> {
        if self.nodes.contains(id) {
            Some(self.node_ref(id.index()))
        } else {
            None
        }
    }

    /// Looks up a node by handle.
    ///
    /// ## Panics
    ///
    /// When the node has been deleted.
    pub fn node(&self, id: NodeId) -> NodeRef<'_, T> {
        self.node_ref(self.index_of(id))
    }

    /// The value held by a node.
    ///
    /// ## Panics
    ///
    /// When the node has been deleted.
    pub fn value(&self, id: NodeId) -> &T {
        &self.node_at(self.index_of(id)).value
    }

    /// The node holding the smallest value in the tree.
    pub fn first(&self) -> Option<NodeId> {
        self.root.map(|root| self.id_at(self.minimum_index(root)))
    }

    /// The node holding the largest value in the tree.
    pub fn last(&self) -> Option<NodeId> {
        self.root.map(|root| self.id_at(self.maximum_index(root)))
    }

    /// The smallest value in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use arena_bst::arena::Tree;
    ///
    /// let tree = Tree::from_values([3, 1, 2]);
    /// assert_eq!(tree.min(), Some(&1));
    /// assert_eq!(Tree::<i32>::new().min(), None);
    /// ```
    pub fn min(&self) -> Option<&T> {
        self.first().map(|id| self.value(id))
    }

    /// The largest value in the tree.
    pub fn max(&self) -> Option<&T> {
        self.last().map(|id| self.value(id))
    }

    /// The node holding the smallest value in the subtree rooted at `id`.
    ///
    /// ## Panics
    ///
    /// When the node has been deleted.
    pub fn minimum_node(&self, id: NodeId) -> NodeId {
        self.id_at(self.minimum_index(self.index_of(id)))
    }

    /// The node holding the largest value in the subtree rooted at `id`.
    ///
    /// ## Panics
    ///
    /// When the node has been deleted.
    pub fn maximum_node(&self, id: NodeId) -> NodeId {
        self.id_at(self.maximum_index(self.index_of(id)))
    }

    /// The node that comes right after `id` in sorted order, or `None` if `id` is the last node.
    ///
    /// ## Panics
    ///
    /// When the node has been deleted.
    pub fn successor_node(&self, id: NodeId) -> Option<NodeId> {
        self.successor_index(self.index_of(id))
            .map(|index| self.id_at(index))
    }

    /// The node that comes right before `id` in sorted order, or `None` if `id` is the first node.
    ///
    /// ## Panics
    ///
    /// When the node has been deleted.
    pub fn predecessor_node(&self, id: NodeId) -> Option<NodeId> {
        self.predecessor_index(self.index_of(id))
            .map(|index| self.id_at(index))
    }

    /// Walks the values of the tree in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use arena_bst::arena::Tree;
    ///
    /// let tree = Tree::from_values([15, 6, 3, 2, 4, 7, 13, 9, 18, 17, 20]);
    ///
    /// assert_eq!(
    ///     tree.walk().copied().collect::<Vec<_>>(),
    ///     vec![2, 3, 4, 6, 7, 9, 13, 15, 17, 18, 20],
    /// );
    /// ```
    pub fn walk(&self) -> Walk<'_, T> {
        Walk::new(self, self.root)
    }

    /// Walks the nodes of the tree in ascending order of their values.
    pub fn walk_nodes(&self) -> WalkNodes<'_, T> {
        WalkNodes::new(self, self.root)
    }

    /// The number of nodes on the longest path from the root to a leaf. An empty tree has a height
    /// of 0.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(usize, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();
        while let Some((index, depth)) = stack.pop() {
            height = height.max(depth);
            let node = self.node_at(index);
            stack.extend(node.left.map(|left| (left, depth + 1)));
            stack.extend(node.right.map(|right| (right, depth + 1)));
        }
        height
    }

    /// Removes the node named by `id` and returns its value. Every other node stays in the tree
    /// and `id` goes stale.
    ///
    /// # Examples
    ///
    /// ```
    /// use arena_bst::arena::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(2);
    /// let first = tree.insert(1);
    /// let second = tree.insert(1);
    ///
    /// // Exactly the named node is removed, not just any node with the same value.
    /// assert_eq!(tree.delete_node(second), 1);
    /// assert!(tree.get(second).is_none());
    /// assert!(tree.get(first).is_some());
    /// ```
    ///
    /// ## Panics
    ///
    /// When the node has already been deleted. Nothing in the tree is touched in that case.
    pub fn delete_node(&mut self, id: NodeId) -> T {
        let index = self.index_of(id);
        self.delete_index(index)
    }

    pub(crate) fn node_at(&self, index: usize) -> &Node<T> {
        self.nodes.at(index)
    }

    fn node_at_mut(&mut self, index: usize) -> &mut Node<T> {
        self.nodes.at_mut(index)
    }

    pub(crate) fn id_at(&self, index: usize) -> NodeId {
        self.nodes
            .id_at(index)
            .unwrap_or_else(|| panic!("link to vacant slot {}", index))
    }

    fn node_ref(&self, index: usize) -> NodeRef<'_, T> {
        NodeRef { tree: self, index }
    }

    fn index_of(&self, id: NodeId) -> usize {
        if !self.nodes.contains(id) {
            panic!("{:?} does not name a node in this tree", id);
        }
        id.index()
    }

    fn minimum_index(&self, mut index: usize) -> usize {
        while let Some(left) = self.node_at(index).left {
            index = left;
        }
        index
    }

    fn maximum_index(&self, mut index: usize) -> usize {
        while let Some(right) = self.node_at(index).right {
            index = right;
        }
        index
    }

    fn successor_index(&self, index: usize) -> Option<usize> {
        if let Some(right) = self.node_at(index).right {
            return Some(self.minimum_index(right));
        }

        // Otherwise the successor is the lowest ancestor whose left subtree holds `index`.
        let mut current = index;
        let mut parent = self.node_at(index).parent;
        while let Some(p) = parent {
            if self.node_at(p).right != Some(current) {
                break;
            }
            current = p;
            parent = self.node_at(p).parent;
        }
        parent
    }

    fn predecessor_index(&self, index: usize) -> Option<usize> {
        if let Some(left) = self.node_at(index).left {
            return Some(self.maximum_index(left));
        }

        let mut current = index;
        let mut parent = self.node_at(index).parent;
        while let Some(p) = parent {
            if self.node_at(p).left != Some(current) {
                break;
            }
            current = p;
            parent = self.node_at(p).parent;
        }
        parent
    }

    /// Puts `replacement` where `index` sits in its parent (or in the root slot) and points
    /// `replacement` back at that parent. The children of `replacement` are left alone and
    /// `index` keeps its stale links until the caller deals with it.
    fn transplant(&mut self, index: usize, replacement: Option<usize>) {
        let parent = self.node_at(index).parent;
        match parent {
            None => self.root = replacement,
            Some(p) => {
                let parent_node = self.node_at_mut(p);
                if parent_node.left == Some(index) {
                    parent_node.left = replacement;
                } else {
                    debug_assert_eq!(parent_node.right, Some(index));
                    parent_node.right = replacement;
                }
            }
        }
        if let Some(r) = replacement {
            self.node_at_mut(r).parent = parent;
        }
        trace!(index, ?replacement, ?parent, "transplanted");
    }

    fn delete_index(&mut self, index: usize) -> T {
        let (left, right) = {
            let node = self.node_at(index);
            (node.left, node.right)
        };

        match (left, right) {
            (None, _) => {
                trace!(index, "deleting node without left child");
                self.transplant(index, right);
            }
            (Some(_), None) => {
                trace!(index, "deleting node without right child");
                self.transplant(index, left);
            }
            (Some(left), Some(right)) => {
                // With a right child present, the successor is the minimum of the right subtree
                // and so has no left child.
                let successor = self
                    .successor_index(index)
                    .expect("Node with right child has a successor");
                trace!(index, successor, "deleting node with two children");

                if successor != right {
                    let successor_right = self.node_at(successor).right;
                    self.transplant(successor, successor_right);
                    self.node_at_mut(successor).right = Some(right);
                    self.node_at_mut(right).parent = Some(successor);
                }
                self.transplant(index, Some(successor));
                self.node_at_mut(successor).left = Some(left);
                self.node_at_mut(left).parent = Some(successor);

                if cfg!(debug_assertions) {
                    let successor_node = self.node_at(successor);
                    assert_eq!(successor_node.parent, self.node_at(index).parent);
                    assert_eq!(successor_node.left, Some(left));
                    assert_eq!(self.node_at(left).parent, Some(successor));
                }
            }
        }

        self.nodes.remove_at(index).value
    }
}

impl<T: Ord> Tree<T> {
    /// Builds a tree by inserting each value in turn.
    ///
    /// # Examples
    ///
    /// ```
    /// use arena_bst::arena::Tree;
    ///
    /// let tree = Tree::from_values(vec![2, 1, 3]);
    /// assert_eq!(tree.len(), 3);
    /// assert_eq!(tree.root().map(|root| *root.value()), Some(2));
    /// ```
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let values = values.into_iter();
        let mut tree = Self::with_capacity(values.size_hint().0);
        tree.extend(values);
        tree
    }

    /// Inserts `value` into the tree and returns a handle to its new node. A value equal to one
    /// already in the tree is placed in that node's left subtree.
    ///
    /// # Examples
    ///
    /// ```
    /// use arena_bst::arena::Tree;
    ///
    /// let mut tree = Tree::new();
    /// let root = tree.insert(5);
    /// let duplicate = tree.insert(5);
    ///
    /// assert_eq!(tree.node(duplicate).parent().map(|p| p.id()), Some(root));
    /// assert_eq!(tree.node(root).left().map(|l| l.id()), Some(duplicate));
    /// ```
    pub fn insert(&mut self, value: T) -> NodeId {
        match self.root {
            Some(root) => self.insert_below(root, value),
            None => {
                let id = self.nodes.insert(Node::new(value, None));
                self.root = Some(id.index());
                trace!(index = id.index(), "inserted root");
                id
            }
        }
    }

    /// Inserts `value` by descending from the node `start` instead of from the root.
    ///
    /// Every value in the subtree under `start` has to stay within the bounds that `start`'s
    /// ancestors impose, so `value` must fit there too.
    ///
    /// ## Panics
    ///
    /// When `start` has been deleted, or when `value` falls outside the range of `start`'s
    /// subtree. The tree is left untouched in both cases.
    pub fn insert_at(&mut self, start: NodeId, value: T) -> NodeId {
        let start = self.index_of(start);
        assert!(
            self.admits(start, &value),
            "value does not belong under the start node"
        );
        self.insert_below(start, value)
    }

    /// Potentially finds a node holding `value`. When several nodes hold it, this returns the one
    /// closest to the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use arena_bst::arena::Tree;
    ///
    /// let mut tree = Tree::new();
    /// let one = tree.insert(1);
    ///
    /// assert_eq!(tree.find(&1), Some(one));
    /// assert_eq!(tree.find(&42), None);
    /// ```
    pub fn find(&self, value: &T) -> Option<NodeId> {
        self.root
            .and_then(|root| self.find_index(root, value))
            .map(|index| self.id_at(index))
    }

    /// Like [`Tree::find`] but only searches the subtree rooted at `start`.
    ///
    /// ## Panics
    ///
    /// When `start` has been deleted.
    pub fn find_from(&self, start: NodeId, value: &T) -> Option<NodeId> {
        self.find_index(self.index_of(start), value)
            .map(|index| self.id_at(index))
    }

    /// Returns `true` if some node holds `value`.
    pub fn contains(&self, value: &T) -> bool {
        self.find(value).is_some()
    }

    /// Finds a node holding `value` and returns its successor. `Ok(None)` means the found node is
    /// the last one.
    ///
    /// # Examples
    ///
    /// ```
    /// use arena_bst::{arena::Tree, Error};
    ///
    /// let tree = Tree::from_values([15, 6, 7, 18]);
    ///
    /// let next = tree.successor(&6).unwrap().map(|id| tree[id]);
    /// assert_eq!(next, Some(7));
    /// assert_eq!(tree.successor(&18), Ok(None));
    /// assert_eq!(tree.successor(&42), Err(Error::NotFound));
    /// ```
    pub fn successor(&self, value: &T) -> Result<Option<NodeId>> {
        let id = self.find(value).ok_or(Error::NotFound)?;
        Ok(self.successor_node(id))
    }

    /// Finds a node holding `value` and returns its predecessor. `Ok(None)` means the found node
    /// is the first one.
    pub fn predecessor(&self, value: &T) -> Result<Option<NodeId>> {
        let id = self.find(value).ok_or(Error::NotFound)?;
        Ok(self.predecessor_node(id))
    }

    /// Deletes a node holding `value` and returns the value it held. If no node holds `value`,
    /// nothing happens and `None` is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use arena_bst::arena::Tree;
    ///
    /// let mut tree = Tree::from_values([2, 1, 3]);
    ///
    /// assert_eq!(tree.delete(&2), Some(2));
    /// assert_eq!(tree.delete(&2), None);
    /// assert_eq!(tree.walk().copied().collect::<Vec<_>>(), vec![1, 3]);
    /// ```
    pub fn delete(&mut self, value: &T) -> Option<T> {
        let index = self.find_index(self.root?, value)?;
        Some(self.delete_index(index))
    }

    fn insert_below(&mut self, start: usize, value: T) -> NodeId {
        let mut current = start;
        let mut depth = 1;
        let side = loop {
            let node = self.node_at(current);
            let side = if value <= node.value {
                Side::Left
            } else {
                Side::Right
            };
            match node.child(side) {
                Some(child) => {
                    current = child;
                    depth += 1;
                }
                None => break side,
            }
        };

        let id = self.nodes.insert(Node::new(value, Some(current)));
        *self.node_at_mut(current).child_mut(side) = Some(id.index());
        trace!(index = id.index(), parent = current, ?side, depth, "inserted node");

        if cfg!(debug_assertions) {
            let parent = self.node_at(current);
            let child = self.node_at(id.index());
            match side {
                Side::Left => assert!(child.value <= parent.value),
                Side::Right => assert!(child.value > parent.value),
            }
            assert_eq!(child.parent, Some(current));
        }

        id
    }

    fn find_index(&self, start: usize, value: &T) -> Option<usize> {
        let mut current = start;
        loop {
            let node = self.node_at(current);
            current = match value.cmp(&node.value) {
                Ordering::Equal => return Some(current),
                Ordering::Less => node.left?,
                Ordering::Greater => node.right?,
            };
        }
    }

    /// Checks `value` against the bounds set by every ancestor of `index`.
    fn admits(&self, index: usize, value: &T) -> bool {
        let mut current = index;
        while let Some(parent) = self.node_at(current).parent {
            let parent_node = self.node_at(parent);
            let fits = if parent_node.left == Some(current) {
                *value <= parent_node.value
            } else {
                *value >= parent_node.value
            };
            if !fits {
                return false;
            }
            current = parent;
        }
        true
    }
}

impl<T> Index<NodeId> for Tree<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &T {
        self.value(id)
    }
}

impl<T: Ord> FromIterator<T> for Tree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_values(iter)
    }
}

impl<T: Ord> Extend<T> for Tree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a Tree<T> {
    type Item = &'a T;
    type IntoIter = Walk<'a, T>;

    fn into_iter(self) -> Walk<'a, T> {
        self.walk()
    }
}

/// A borrowed view of one node, used to navigate the tree from that node.
pub struct NodeRef<'a, T> {
    tree: &'a Tree<T>,
    index: usize,
}

impl<'a, T> Clone for NodeRef<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<'a, T> Copy for NodeRef<'a, T> {}

impl<'a, T> PartialEq for NodeRef<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}
impl<'a, T> Eq for NodeRef<'a, T> {}

impl<'a, T> NodeRef<'a, T> {
    /// The handle of this node.
    pub fn id(&self) -> NodeId {
        self.tree.id_at(self.index)
    }

    /// The value held by this node.
    pub fn value(&self) -> &'a T {
        &self.node().value
    }

    /// The parent of this node, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        self.node().parent.map(|index| self.tree.node_ref(index))
    }

    /// The root of the left subtree.
    pub fn left(&self) -> Option<Self> {
        self.node().left.map(|index| self.tree.node_ref(index))
    }

    /// The root of the right subtree.
    pub fn right(&self) -> Option<Self> {
        self.node().right.map(|index| self.tree.node_ref(index))
    }

    /// Returns `true` if this node is the root of its tree.
    pub fn is_root(&self) -> bool {
        self.node().parent.is_none()
    }

    /// Returns `true` if this node has no children.
    pub fn is_leaf(&self) -> bool {
        let node = self.node();
        node.left.is_none() && node.right.is_none()
    }

    /// The node holding the smallest value in this subtree.
    pub fn minimum(&self) -> Self {
        self.tree.node_ref(self.tree.minimum_index(self.index))
    }

    /// The node holding the largest value in this subtree.
    pub fn maximum(&self) -> Self {
        self.tree.node_ref(self.tree.maximum_index(self.index))
    }

    /// The next node in sorted order across the whole tree.
    pub fn successor(&self) -> Option<Self> {
        self.tree
            .successor_index(self.index)
            .map(|index| self.tree.node_ref(index))
    }

    /// The previous node in sorted order across the whole tree.
    pub fn predecessor(&self) -> Option<Self> {
        self.tree
            .predecessor_index(self.index)
            .map(|index| self.tree.node_ref(index))
    }

    /// Walks the values of this subtree in ascending order.
    pub fn walk(&self) -> Walk<'a, T> {
        Walk::new(self.tree, Some(self.index))
    }

    fn node(&self) -> &'a Node<T> {
        self.tree.node_at(self.index)
    }
}

impl<'a, T: fmt::Display> fmt::Display for NodeRef<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value().fmt(f)
    }
}

impl<'a, T: fmt::Debug> fmt::Debug for NodeRef<'a, T> {
    // Children are printed by value only so formatting never descends the tree.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("value", self.value())
            .field("left", &self.left().map(|left| left.value()))
            .field("right", &self.right().map(|right| right.value()))
            .finish()
    }
}
