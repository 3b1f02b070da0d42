//! FILENAME: core/grid-engine/src/view.rs
//! Grid View - The flat, index-addressable output handed to the renderer.
//!
//! The pipeline's last stage linearizes the group tree into `GridRow`s.
//! `ElementList` wraps that sequence with the lookups a virtualized list
//! needs: a total count, O(1) access by index, and per-row heights.

use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::definition::{Aggregate, GroupKey};
use crate::tree::Row;

/// Height used when the caller configures none.
pub const DEFAULT_ROW_HEIGHT: f64 = 26.0;

// ============================================================================
// ROW TYPES
// ============================================================================

/// The kind tag carried by every output row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    /// A data record.
    Element,
    /// A synthetic header opening a group.
    Group,
    /// A synthetic summary row closing a group.
    Aggregate,
}

/// Header row emitted before a group's children.
#[derive(Debug, PartialEq)]
pub struct GroupHeader<K, A> {
    pub group_id: String,
    pub title: String,
    pub depth: usize,
    pub key: GroupKey<K>,
    pub aggregate: Option<Arc<Aggregate<K, A>>>,
}

/// Summary row emitted after a group's children.
#[derive(Debug, PartialEq)]
pub struct AggregateRow<K, A> {
    pub group_id: String,
    pub depth: usize,
    pub aggregate: Arc<Aggregate<K, A>>,
}

/// One displayable row.
#[derive(Debug, PartialEq)]
pub enum GridRow<K, T, A> {
    Element(Row<T>),
    GroupHeader(GroupHeader<K, A>),
    Aggregate(AggregateRow<K, A>),
}

impl<K, T, A> GridRow<K, T, A> {
    pub fn kind(&self) -> RowKind {
        match self {
            GridRow::Element(_) => RowKind::Element,
            GridRow::GroupHeader(_) => RowKind::Group,
            GridRow::Aggregate(_) => RowKind::Aggregate,
        }
    }

    pub fn as_element(&self) -> Option<&Row<T>> {
        match self {
            GridRow::Element(row) => Some(row),
            _ => None,
        }
    }

    pub fn as_group_header(&self) -> Option<&GroupHeader<K, A>> {
        match self {
            GridRow::GroupHeader(header) => Some(header),
            _ => None,
        }
    }

    pub fn as_aggregate(&self) -> Option<&AggregateRow<K, A>> {
        match self {
            GridRow::Aggregate(row) => Some(row),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, GridRow::Element(_))
    }

    /// Position in the original input, for element rows only.
    pub fn original_index(&self) -> Option<usize> {
        self.as_element().map(|row| row.original_index)
    }
}

impl<K: Clone, T, A> Clone for GridRow<K, T, A> {
    fn clone(&self) -> Self {
        match self {
            GridRow::Element(row) => GridRow::Element(row.clone()),
            GridRow::GroupHeader(header) => GridRow::GroupHeader(GroupHeader {
                group_id: header.group_id.clone(),
                title: header.title.clone(),
                depth: header.depth,
                key: header.key.clone(),
                aggregate: header.aggregate.clone(),
            }),
            GridRow::Aggregate(row) => GridRow::Aggregate(AggregateRow {
                group_id: row.group_id.clone(),
                depth: row.depth,
                aggregate: Arc::clone(&row.aggregate),
            }),
        }
    }
}

// ============================================================================
// ROW HEIGHT
// ============================================================================

/// Either one height for every row or a height computed per row.
pub enum RowHeight<K, T, A> {
    Fixed(f64),
    Computed(Arc<dyn Fn(&GridRow<K, T, A>) -> f64 + Send + Sync>),
}

impl<K, T, A> RowHeight<K, T, A> {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&GridRow<K, T, A>) -> f64 + Send + Sync + 'static,
    {
        RowHeight::Computed(Arc::new(f))
    }

    pub fn height_of(&self, row: &GridRow<K, T, A>) -> f64 {
        match self {
            RowHeight::Fixed(h) => *h,
            RowHeight::Computed(f) => f(row),
        }
    }
}

impl<K, T, A> Default for RowHeight<K, T, A> {
    fn default() -> Self {
        RowHeight::Fixed(DEFAULT_ROW_HEIGHT)
    }
}

impl<K, T, A> Clone for RowHeight<K, T, A> {
    fn clone(&self) -> Self {
        match self {
            RowHeight::Fixed(h) => RowHeight::Fixed(*h),
            RowHeight::Computed(f) => RowHeight::Computed(Arc::clone(f)),
        }
    }
}

impl<K, T, A> fmt::Debug for RowHeight<K, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowHeight::Fixed(h) => f.debug_tuple("Fixed").field(h).finish(),
            RowHeight::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

// ============================================================================
// ELEMENT LIST
// ============================================================================

/// The flattened pipeline output, owned by whoever ran the pipeline.
#[derive(Debug)]
pub struct ElementList<K, T, A> {
    rows: Vec<GridRow<K, T, A>>,
    element_count: usize,
}

impl<K, T, A> ElementList<K, T, A> {
    pub fn new(rows: Vec<GridRow<K, T, A>>) -> Self {
        let element_count = rows.iter().filter(|r| r.is_element()).count();
        ElementList {
            rows,
            element_count,
        }
    }

    pub fn empty() -> Self {
        ElementList {
            rows: Vec::new(),
            element_count: 0,
        }
    }

    /// Number of rows the renderer will lay out.
    pub fn total_count(&self) -> usize {
        self.rows.len()
    }

    pub fn element_at(&self, index: usize) -> Option<&GridRow<K, T, A>> {
        self.rows.get(index)
    }

    /// Number of element (data) rows, excluding headers and aggregates.
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    pub fn row_height(&self, index: usize, height: &RowHeight<K, T, A>) -> Option<f64> {
        self.element_at(index).map(|row| height.height_of(row))
    }

    /// Sum of all row heights.
    pub fn total_height(&self, height: &RowHeight<K, T, A>) -> f64 {
        match height {
            RowHeight::Fixed(h) => *h * self.rows.len() as f64,
            RowHeight::Computed(f) => self.rows.iter().map(|r| f(r)).sum(),
        }
    }

    pub fn rows(&self) -> &[GridRow<K, T, A>] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GridRow<K, T, A>> {
        self.rows.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<K, T, A> Default for ElementList<K, T, A> {
    fn default() -> Self {
        ElementList::empty()
    }
}

impl<K, T, A> From<Vec<GridRow<K, T, A>>> for ElementList<K, T, A> {
    fn from(rows: Vec<GridRow<K, T, A>>) -> Self {
        ElementList::new(rows)
    }
}
