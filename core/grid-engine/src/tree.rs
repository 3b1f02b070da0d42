//! FILENAME: core/grid-engine/src/tree.rs
//! Group Tree - Rows and the recursive group nodes that hold them.
//!
//! Every position in the tree is a tagged `TreeNode`: either a leaf `Row`
//! or a nested `GroupNode`. Consumers dispatch on the tag. A node's
//! children are all rows (innermost level) or all groups, never a mix.

use std::sync::Arc;
use crate::definition::{Aggregate, GroupKey};
use crate::view::RowKind;

// ============================================================================
// ROW
// ============================================================================

/// One input record tagged for display, with its position in the
/// unfiltered, ungrouped input.
#[derive(Debug, PartialEq)]
pub struct Row<T> {
    pub content: Arc<T>,
    pub original_index: usize,
}

impl<T> Row<T> {
    pub fn new(content: Arc<T>, original_index: usize) -> Self {
        Row {
            content,
            original_index,
        }
    }

    pub fn kind(&self) -> RowKind {
        RowKind::Element
    }
}

impl<T> Clone for Row<T> {
    fn clone(&self) -> Self {
        Row {
            content: Arc::clone(&self.content),
            original_index: self.original_index,
        }
    }
}

// ============================================================================
// GROUP NODE
// ============================================================================

/// One group at one nesting level.
#[derive(Debug, PartialEq)]
pub struct GroupNode<K, T, A> {
    /// Id of the group definition that produced this level.
    pub group_id: String,
    /// Display title of that group definition.
    pub title: String,
    /// Accumulated key: one entry per enclosing level, this level last.
    pub key: GroupKey<K>,
    pub children: Vec<TreeNode<K, T, A>>,
    pub aggregate: Option<Arc<Aggregate<K, A>>>,
}

impl<K, T, A> GroupNode<K, T, A> {
    /// This level's own key (the last entry of the accumulated key).
    pub fn level_key(&self) -> Option<&K> {
        self.key.last()
    }

    /// Nesting depth, 0 for the outermost level.
    pub fn depth(&self) -> usize {
        self.key.depth().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// All leaf rows under this node, depth-first.
    pub fn leaves(&self) -> Vec<&Row<T>> {
        let mut out = Vec::new();
        collect_leaves(&self.children, &mut out);
        out
    }

    pub fn leaf_count(&self) -> usize {
        self.children.iter().map(TreeNode::leaf_count).sum()
    }
}

impl<K: Clone, T, A> Clone for GroupNode<K, T, A> {
    fn clone(&self) -> Self {
        GroupNode {
            group_id: self.group_id.clone(),
            title: self.title.clone(),
            key: self.key.clone(),
            children: self.children.clone(),
            aggregate: self.aggregate.clone(),
        }
    }
}

// ============================================================================
// TREE NODE
// ============================================================================

#[derive(Debug, PartialEq)]
pub enum TreeNode<K, T, A> {
    Row(Row<T>),
    Group(GroupNode<K, T, A>),
}

impl<K, T, A> TreeNode<K, T, A> {
    pub fn as_row(&self) -> Option<&Row<T>> {
        match self {
            TreeNode::Row(row) => Some(row),
            TreeNode::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupNode<K, T, A>> {
        match self {
            TreeNode::Row(_) => None,
            TreeNode::Group(group) => Some(group),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Row(_) => 1,
            TreeNode::Group(group) => group.leaf_count(),
        }
    }
}

impl<K: Clone, T, A> Clone for TreeNode<K, T, A> {
    fn clone(&self) -> Self {
        match self {
            TreeNode::Row(row) => TreeNode::Row(row.clone()),
            TreeNode::Group(group) => TreeNode::Group(group.clone()),
        }
    }
}

/// All leaf rows in a forest, depth-first.
pub fn leaves<K, T, A>(nodes: &[TreeNode<K, T, A>]) -> Vec<&Row<T>> {
    let mut out = Vec::new();
    collect_leaves(nodes, &mut out);
    out
}

fn collect_leaves<'a, K, T, A>(nodes: &'a [TreeNode<K, T, A>], out: &mut Vec<&'a Row<T>>) {
    for node in nodes {
        match node {
            TreeNode::Row(row) => out.push(row),
            TreeNode::Group(group) => collect_leaves(&group.children, out),
        }
    }
}
