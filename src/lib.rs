//! This crate exposes a mutable Binary Search Tree (BST) whose nodes know their parent, mostly
//! for educational purposes.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` will typically store
//! some sort of value (the value that was inserted, for example) and will
//! sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    value less than or equal to its own value.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    value greater than or equal to its own value.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching for values in the tree takes `O(height)` (where `height` is defined as the longest
//! path from the root `Node` to a leaf `Node`). BSTs also naturally support sorted iteration by
//! visiting the left subtree, then the subtree root, then the right subtree.
//!
//! ## Parent links
//!
//! The tree in [`arena`] also records each node's parent. That makes it possible to step from any
//! node to its in-order successor or predecessor without searching from the root, and to delete a
//! node given only a handle to it. The tree does not rebalance itself, so the order of insertion
//! decides its shape: sorted input produces a chain.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod arena;
mod error;
pub mod iter;
mod slots;


pub use arena::{NodeRef, Tree};
pub use error::{Error, Result};
pub use slots::NodeId;
