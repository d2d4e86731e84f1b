//! In-order iterators over an [`arena::Tree`](crate::arena::Tree).
//!
//! Traversal keeps an explicit stack of the ancestors still waiting to be visited instead of
//! recursing, so walking a degenerate (linear) tree never grows the call stack.

use std::iter::FusedIterator;

use crate::arena::Tree;
use crate::slots::NodeId;

/// Yields slot indices in ascending value order.
struct InOrder<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<usize>,
}

impl<'a, T> Clone for InOrder<'a, T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            stack: self.stack.clone(),
        }
    }
}

impl<'a, T> InOrder<'a, T> {
    fn new(tree: &'a Tree<T>, start: Option<usize>) -> Self {
        let mut in_order = Self {
            tree,
            stack: Vec::new(),
        };
        in_order.push_left_spine(start);
        in_order
    }

    fn push_left_spine(&mut self, mut current: Option<usize>) {
        while let Some(index) = current {
            self.stack.push(index);
            current = self.tree.node_at(index).left;
        }
    }
}

impl<'a, T> Iterator for InOrder<'a, T> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let index = self.stack.pop()?;
        self.push_left_spine(self.tree.node_at(index).right);
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.stack.len(), Some(self.tree.len()))
    }
}

/// A lazy, in-order iterator over the values of a tree (or subtree).
///
/// Created by [`Tree::walk`] and [`NodeRef::walk`](crate::arena::NodeRef::walk). Values come out
/// in non-decreasing order; runs of equal values appear in the order the tree holds them.
pub struct Walk<'a, T> {
    inner: InOrder<'a, T>,
}

impl<'a, T> Walk<'a, T> {
    pub(crate) fn new(tree: &'a Tree<T>, start: Option<usize>) -> Self {
        Self {
            inner: InOrder::new(tree, start),
        }
    }
}

impl<'a, T> Clone for Walk<'a, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for Walk<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let tree = self.inner.tree;
        self.inner.next().map(|index| &tree.node_at(index).value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T> FusedIterator for Walk<'a, T> {}

/// Like [`Walk`] but yields the [`NodeId`] of each node.
pub struct WalkNodes<'a, T> {
    inner: InOrder<'a, T>,
}

impl<'a, T> WalkNodes<'a, T> {
    pub(crate) fn new(tree: &'a Tree<T>, start: Option<usize>) -> Self {
        Self {
            inner: InOrder::new(tree, start),
        }
    }
}

impl<'a, T> Clone for WalkNodes<'a, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for WalkNodes<'a, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let tree = self.inner.tree;
        self.inner.next().map(|index| tree.id_at(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T> FusedIterator for WalkNodes<'a, T> {}
