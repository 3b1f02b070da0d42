//! FILENAME: core/grid-runtime/src/state.rs
//! Grid State - The user-editable rule sets and column layout.
//!
//! Sort and filter rules feed the pipeline. Column widths, visibility and
//! order only affect presentation; changing them never triggers a
//! recompute, but each change produces a `ColumnEvent` for the caller.

use std::collections::{HashMap, HashSet};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use grid_engine::{
    ColumnDescriptor, ColumnEntry, ColumnSet, Filter, GridError, GridResult, Matcher,
    SortDirection, SortSpec,
};

const LOG_TARGET: &str = "grid::state";

// ============================================================================
// COLUMN EVENTS
// ============================================================================

/// Notification produced by a column layout change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnEvent {
    Resize { id: String, width: f64 },
    OrderChange { columns_order: Vec<String> },
    VisibilityChange { id: String, visible: bool },
}

// ============================================================================
// COLUMN LAYOUT
// ============================================================================

/// Widths, visibility and order of the top-level column entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnLayout {
    widths: HashMap<String, f64>,
    visibility: HashMap<String, bool>,
    order: Vec<String>,
}

impl ColumnLayout {
    /// Initial layout: declared widths (or the default), `!hidden`, declared order.
    pub fn new<T, V>(columns: &ColumnSet<T, V>, default_width: f64) -> Self {
        let entries = columns.entries();
        ColumnLayout {
            widths: entries
                .iter()
                .map(|e| (e.id().to_string(), e.width().unwrap_or(default_width)))
                .collect(),
            visibility: entries
                .iter()
                .map(|e| (e.id().to_string(), !e.hidden()))
                .collect(),
            order: entries.iter().map(|e| e.id().to_string()).collect(),
        }
    }

    pub fn width(&self, id: &str) -> Option<f64> {
        self.widths.get(id).copied()
    }

    pub fn is_visible(&self, id: &str) -> Option<bool> {
        self.visibility.get(id).copied()
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    fn check_known(&self, id: &str) -> GridResult<()> {
        if self.widths.contains_key(id) {
            Ok(())
        } else {
            Err(GridError::UnknownColumn(id.to_string()))
        }
    }

    pub fn resize(&mut self, id: &str, width: f64) -> GridResult<ColumnEvent> {
        self.check_known(id)?;
        self.widths.insert(id.to_string(), width);
        Ok(ColumnEvent::Resize {
            id: id.to_string(),
            width,
        })
    }

    pub fn set_visibility(&mut self, id: &str, visible: bool) -> GridResult<ColumnEvent> {
        self.check_known(id)?;
        self.visibility.insert(id.to_string(), visible);
        Ok(ColumnEvent::VisibilityChange {
            id: id.to_string(),
            visible,
        })
    }

    /// Replaces the order. The new order must be a permutation of the current one.
    pub fn set_order(&mut self, order: Vec<String>) -> GridResult<ColumnEvent> {
        let current: HashSet<&str> = self.order.iter().map(String::as_str).collect();
        let proposed: HashSet<&str> = order.iter().map(String::as_str).collect();
        if order.len() != self.order.len() || current != proposed {
            return Err(GridError::InvalidColumnOrder(format!(
                "expected a permutation of [{}], got [{}]",
                self.order.join(", "),
                order.join(", ")
            )));
        }
        self.order = order.clone();
        Ok(ColumnEvent::OrderChange {
            columns_order: order,
        })
    }

    /// Entries in the current display order.
    pub fn ordered_columns<'a, T, V>(
        &self,
        columns: &'a ColumnSet<T, V>,
    ) -> Vec<&'a ColumnEntry<T, V>> {
        self.order.iter().filter_map(|id| columns.entry(id)).collect()
    }

    /// Flattened descriptors of the visible entries, in display order.
    pub fn visible_columns<'a, T, V>(
        &self,
        columns: &'a ColumnSet<T, V>,
    ) -> Vec<&'a ColumnDescriptor<T, V>> {
        self.ordered_columns(columns)
            .into_iter()
            .filter(|e| self.is_visible(e.id()).unwrap_or(true))
            .flat_map(|e| e.descriptors())
            .collect()
    }
}

// ============================================================================
// GRID STATE
// ============================================================================

/// Active sort rules, active filters and column layout of one grid.
pub struct GridState<V> {
    column_ids: HashSet<String>,
    sort: Vec<SortSpec>,
    filters: Vec<Filter<V>>,
    layout: ColumnLayout,
}

impl<V> GridState<V> {
    pub fn new<T>(columns: &ColumnSet<T, V>, default_width: f64) -> Self {
        GridState {
            column_ids: columns.flat_columns().iter().map(|c| c.id.clone()).collect(),
            sort: Vec::new(),
            filters: Vec::new(),
            layout: ColumnLayout::new(columns, default_width),
        }
    }

    fn check_column(&self, column_id: &str) -> GridResult<()> {
        if self.column_ids.contains(column_id) {
            Ok(())
        } else {
            warn!(target: LOG_TARGET, "rejected rule for unknown column '{}'", column_id);
            Err(GridError::UnknownColumn(column_id.to_string()))
        }
    }

    pub fn sort(&self) -> &[SortSpec] {
        &self.sort
    }

    pub fn filters(&self) -> &[Filter<V>] {
        &self.filters
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut ColumnLayout {
        &mut self.layout
    }

    /// Replaces the whole sort rule set. Rules with direction `None` are dropped.
    pub fn set_sort(&mut self, specs: Vec<SortSpec>) -> GridResult<()> {
        for spec in &specs {
            self.check_column(&spec.column_id)?;
        }
        self.sort = specs
            .into_iter()
            .filter(|s| s.direction != SortDirection::None)
            .collect();
        Ok(())
    }

    /// Sets the direction for one column.
    ///
    /// An existing rule keeps its priority position; `None` removes it.
    /// A new rule is appended with the lowest priority.
    pub fn update_sort(&mut self, column_id: &str, direction: SortDirection) -> GridResult<()> {
        self.check_column(column_id)?;
        let existing = self.sort.iter().position(|s| s.column_id == column_id);

        match (existing, direction) {
            (None, SortDirection::None) => {}
            (None, _) => self.sort.push(SortSpec::new(column_id, direction)),
            (Some(index), SortDirection::None) => {
                self.sort.remove(index);
            }
            (Some(index), _) => self.sort[index].direction = direction,
        }

        info!(
            target: LOG_TARGET,
            "sort column='{}' direction={:?} rules={}",
            column_id,
            direction,
            self.sort.len()
        );
        Ok(())
    }

    /// Installs the filter for one column, replacing any previous one in place.
    pub fn update_filter(&mut self, column_id: &str, matcher: Matcher<V>) -> GridResult<()> {
        self.check_column(column_id)?;
        let filter = Filter::from_matcher(column_id, matcher);

        match self.filters.iter().position(|f| f.column_id == column_id) {
            Some(index) => self.filters[index] = filter,
            None => self.filters.push(filter),
        }

        info!(target: LOG_TARGET, "filter column='{}' filters={}", column_id, self.filters.len());
        Ok(())
    }

    /// Removes the filter for one column. Returns whether one was active.
    pub fn clear_filter(&mut self, column_id: &str) -> bool {
        let before = self.filters.len();
        self.filters.retain(|f| f.column_id != column_id);
        before != self.filters.len()
    }
}

impl<V> Clone for GridState<V> {
    fn clone(&self) -> Self {
        GridState {
            column_ids: self.column_ids.clone(),
            sort: self.sort.clone(),
            filters: self.filters.clone(),
            layout: self.layout.clone(),
        }
    }
}

impl<V> std::fmt::Debug for GridState<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridState")
            .field("sort", &self.sort)
            .field("filters", &self.filters)
            .field("layout", &self.layout)
            .finish()
    }
}
