//! FILENAME: core/grid-engine/src/engine.rs
//! Grid Engine - The pipeline that turns records into display rows.
//!
//! A run is a pure function of its inputs:
//!   enrich -> filter (pre-group) -> sort -> group -> filter (post-group) -> flatten
//!
//! Exactly one of the two filter stages runs. The pre-group stage is used
//! when there are no group levels or when aggregates must not see
//! filtered-out records; otherwise grouping and aggregation see every
//! record and filtering prunes the finished tree.
//!
//! Every column a filter or sort rule names is resolved before any stage
//! runs, so a misconfigured run fails without doing work.

use std::hash::Hash;
use std::sync::Arc;
use log::{debug, trace};
use rustc_hash::FxHashMap;
use crate::column::{ColumnDescriptor, ColumnSet};
use crate::definition::{
    Aggregate, AggregateReducer, Filter, GroupDefinition, GroupKey, PipelineOptions,
    SortDirection, SortSpec,
};
use crate::error::{GridError, GridResult};
use crate::tree::{GroupNode, Row, TreeNode};
use crate::view::{AggregateRow, ElementList, GridRow, GroupHeader};

const LOG_TARGET: &str = "grid::pipeline";

// ============================================================================
// RULE BINDING
// ============================================================================

/// A filter paired with the column it reads.
struct BoundFilter<'a, T, V> {
    column: &'a ColumnDescriptor<T, V>,
    filter: &'a Filter<V>,
}

/// A sort rule paired with the column it orders by.
struct BoundSort<'a, T, V> {
    column: &'a ColumnDescriptor<T, V>,
    direction: SortDirection,
}

fn bind_filters<'a, T, V>(
    filters: &'a [Filter<V>],
    columns: &'a ColumnSet<T, V>,
) -> GridResult<Vec<BoundFilter<'a, T, V>>> {
    filters
        .iter()
        .map(|filter| {
            Ok(BoundFilter {
                column: columns.resolve(&filter.column_id)?,
                filter,
            })
        })
        .collect()
}

/// Rules with direction `None` carry no ordering and are dropped here.
fn bind_sorts<'a, T, V>(
    sort_specs: &'a [SortSpec],
    columns: &'a ColumnSet<T, V>,
) -> GridResult<Vec<BoundSort<'a, T, V>>> {
    sort_specs
        .iter()
        .filter(|spec| spec.direction != SortDirection::None)
        .map(|spec| {
            Ok(BoundSort {
                column: columns.resolve(&spec.column_id)?,
                direction: spec.direction,
            })
        })
        .collect()
}

fn row_matches<T, V>(row: &Row<T>, filters: &[BoundFilter<'_, T, V>]) -> bool {
    filters
        .iter()
        .all(|bound| bound.filter.matches(&bound.column.value_of(&row.content)))
}

// ============================================================================
// STAGES
// ============================================================================

/// Tags every record with its position in the input.
pub fn enrich<T>(records: &[Arc<T>]) -> Vec<Row<T>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| Row::new(Arc::clone(record), index))
        .collect()
}

/// Keeps the rows for which every filter matches. No filters keeps everything.
pub fn filter_rows<T, V>(
    rows: &[Row<T>],
    filters: &[Filter<V>],
    columns: &ColumnSet<T, V>,
) -> GridResult<Vec<Row<T>>> {
    let bound = bind_filters(filters, columns)?;
    Ok(apply_row_filters(rows.to_vec(), &bound))
}

fn apply_row_filters<T, V>(rows: Vec<Row<T>>, filters: &[BoundFilter<'_, T, V>]) -> Vec<Row<T>> {
    if filters.is_empty() {
        return rows;
    }
    rows.into_iter().filter(|row| row_matches(row, filters)).collect()
}

/// Multi-key stable sort with `sort_specs[0]` as the primary key.
pub fn sort_rows<T, V>(
    rows: &[Row<T>],
    sort_specs: &[SortSpec],
    columns: &ColumnSet<T, V>,
) -> GridResult<Vec<Row<T>>> {
    let bound = bind_sorts(sort_specs, columns)?;
    Ok(apply_sorts(rows.to_vec(), &bound))
}

/// Applies the rules lowest priority first; each pass is stable, so ties
/// keep the order established by the passes before it.
fn apply_sorts<T, V>(rows: Vec<Row<T>>, sorts: &[BoundSort<'_, T, V>]) -> Vec<Row<T>> {
    sorts.iter().rev().fold(rows, |rows, sort| {
        let mut keyed: Vec<(V, Row<T>)> = rows
            .into_iter()
            .map(|row| (sort.column.value_of(&row.content), row))
            .collect();
        keyed.sort_by(|a, b| sort.direction.apply(sort.column.compare(&a.0, &b.0)));
        keyed.into_iter().map(|(_, row)| row).collect()
    })
}

/// Builds the group tree. With no group levels the rows come back as leaves.
pub fn group_rows<T, K, A>(
    rows: Vec<Row<T>>,
    groups: &[GroupDefinition<T, K, A>],
    reducer: Option<&AggregateReducer<T, K, A>>,
) -> Vec<TreeNode<K, T, A>>
where
    K: Eq + Hash + Clone,
{
    group_level(rows, groups, &GroupKey::root(), reducer)
}

fn group_level<T, K, A>(
    rows: Vec<Row<T>>,
    groups: &[GroupDefinition<T, K, A>],
    path: &GroupKey<K>,
    reducer: Option<&AggregateReducer<T, K, A>>,
) -> Vec<TreeNode<K, T, A>>
where
    K: Eq + Hash + Clone,
{
    let Some((group, inner_groups)) = groups.split_first() else {
        return rows.into_iter().map(TreeNode::Row).collect();
    };

    // Partition in first-seen key order; members keep their incoming order.
    let mut positions: FxHashMap<K, usize> = FxHashMap::default();
    let mut partitions: Vec<(K, Vec<Row<T>>)> = Vec::new();
    for row in rows {
        let key = group.key_of(&row.content);
        match positions.get(&key) {
            Some(&pos) => partitions[pos].1.push(row),
            None => {
                positions.insert(key.clone(), partitions.len());
                partitions.push((key, vec![row]));
            }
        }
    }

    trace!(
        target: LOG_TARGET,
        "group level '{}' depth={} partitions={}",
        group.id,
        path.depth(),
        partitions.len()
    );

    let mut nodes: Vec<(K, GroupNode<K, T, A>)> = partitions
        .into_iter()
        .map(|(level_key, members)| {
            let key = path.with_level(&group.id, level_key.clone());
            let aggregate = reducer.map(|reduce| {
                let contents: Vec<&T> = members.iter().map(|row| row.content.as_ref()).collect();
                Arc::new(Aggregate {
                    value: reduce(&contents, &key),
                    group_key: key.clone(),
                })
            });
            let children = group_level(members, inner_groups, &key, reducer);
            let node = GroupNode {
                group_id: group.id.clone(),
                title: group.title.clone(),
                key,
                children,
                aggregate,
            };
            (level_key, node)
        })
        .collect();

    nodes.sort_by(|(key_a, node_a), (key_b, node_b)| {
        group.compare(
            key_a,
            key_b,
            node_a.aggregate.as_deref(),
            node_b.aggregate.as_deref(),
        )
    });

    nodes
        .into_iter()
        .map(|(_, node)| TreeNode::Group(node))
        .collect()
}

/// Removes non-matching rows at every depth and prunes groups left empty.
/// Aggregates are carried over untouched.
pub fn filter_tree<K, T, A, V>(
    nodes: Vec<TreeNode<K, T, A>>,
    filters: &[Filter<V>],
    columns: &ColumnSet<T, V>,
) -> GridResult<Vec<TreeNode<K, T, A>>> {
    let bound = bind_filters(filters, columns)?;
    Ok(prune_tree(nodes, &bound))
}

fn prune_tree<K, T, A, V>(
    nodes: Vec<TreeNode<K, T, A>>,
    filters: &[BoundFilter<'_, T, V>],
) -> Vec<TreeNode<K, T, A>> {
    if filters.is_empty() {
        return nodes;
    }
    nodes
        .into_iter()
        .filter_map(|node| match node {
            TreeNode::Row(row) => row_matches(&row, filters).then_some(TreeNode::Row(row)),
            TreeNode::Group(mut group) => {
                group.children = prune_tree(group.children, filters);
                (!group.is_empty()).then_some(TreeNode::Group(group))
            }
        })
        .collect()
}

/// Depth-first linearization of the tree into display order.
///
/// Each group emits its header (when `show_group_headers`), then its
/// children, then its aggregate row (when `show_aggregates` and the group
/// has an aggregate).
pub fn flatten<K, T, A>(
    nodes: Vec<TreeNode<K, T, A>>,
    show_group_headers: bool,
    show_aggregates: bool,
) -> Vec<GridRow<K, T, A>> {
    let mut out = Vec::new();
    flatten_into(nodes, show_group_headers, show_aggregates, &mut out);
    out
}

fn flatten_into<K, T, A>(
    nodes: Vec<TreeNode<K, T, A>>,
    show_group_headers: bool,
    show_aggregates: bool,
    out: &mut Vec<GridRow<K, T, A>>,
) {
    for node in nodes {
        match node {
            TreeNode::Row(row) => out.push(GridRow::Element(row)),
            TreeNode::Group(group) => {
                let depth = group.depth();
                let GroupNode {
                    group_id,
                    title,
                    key,
                    children,
                    aggregate,
                } = group;

                if show_group_headers {
                    out.push(GridRow::GroupHeader(GroupHeader {
                        group_id: group_id.clone(),
                        title,
                        depth,
                        key,
                        aggregate: aggregate.clone(),
                    }));
                }

                flatten_into(children, show_group_headers, show_aggregates, out);

                if show_aggregates {
                    if let Some(aggregate) = aggregate {
                        out.push(GridRow::Aggregate(AggregateRow {
                            group_id,
                            depth,
                            aggregate,
                        }));
                    }
                }
            }
        }
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Column configuration, aggregate reducer and options shared by every run.
pub struct Pipeline<T, V, K, A> {
    columns: ColumnSet<T, V>,
    reducer: Option<AggregateReducer<T, K, A>>,
    options: PipelineOptions,
}

impl<T, V, K, A> Pipeline<T, V, K, A>
where
    K: Eq + Hash + Clone,
{
    pub fn new(columns: ColumnSet<T, V>) -> Self {
        Pipeline {
            columns,
            reducer: None,
            options: PipelineOptions::default(),
        }
    }

    pub fn with_reducer<F>(mut self, reducer: F) -> Self
    where
        F: Fn(&[&T], &GroupKey<K>) -> A + Send + Sync + 'static,
    {
        self.reducer = Some(Arc::new(reducer));
        self
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn columns(&self) -> &ColumnSet<T, V> {
        &self.columns
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn has_reducer(&self) -> bool {
        self.reducer.is_some()
    }

    /// True when filtering runs on the flat rows before grouping.
    pub fn filters_before_grouping(&self, groups: &[GroupDefinition<T, K, A>]) -> bool {
        groups.is_empty() || !self.options.include_filtered_elements_in_aggregates
    }

    /// Checks a run's configuration without executing it.
    pub fn validate(
        &self,
        groups: &[GroupDefinition<T, K, A>],
        sort_specs: &[SortSpec],
        filters: &[Filter<V>],
    ) -> GridResult<()> {
        self.check_aggregates(groups)?;
        bind_filters(filters, &self.columns)?;
        bind_sorts(sort_specs, &self.columns)?;
        Ok(())
    }

    fn check_aggregates(&self, groups: &[GroupDefinition<T, K, A>]) -> GridResult<()> {
        if !groups.is_empty() && self.options.show_aggregates && !self.has_reducer() {
            return Err(GridError::AggregateConfiguration);
        }
        Ok(())
    }

    /// Runs the full pipeline and returns the display rows.
    pub fn compute_elements(
        &self,
        records: &[Arc<T>],
        groups: &[GroupDefinition<T, K, A>],
        sort_specs: &[SortSpec],
        filters: &[Filter<V>],
    ) -> GridResult<ElementList<K, T, A>> {
        self.check_aggregates(groups)?;
        let bound_filters = bind_filters(filters, &self.columns)?;
        let bound_sorts = bind_sorts(sort_specs, &self.columns)?;
        let pre_group = self.filters_before_grouping(groups);

        let rows = enrich(records);

        let rows = if pre_group {
            apply_row_filters(rows, &bound_filters)
        } else {
            rows
        };
        let filtered_count = rows.len();

        let rows = apply_sorts(rows, &bound_sorts);

        let tree = group_level(rows, groups, &GroupKey::root(), self.reducer.as_ref());

        let tree = if pre_group {
            tree
        } else {
            prune_tree(tree, &bound_filters)
        };

        let out = ElementList::new(flatten(
            tree,
            self.options.show_group_headers,
            self.options.show_aggregates,
        ));

        debug!(
            target: LOG_TARGET,
            "computed elements: records={} after_pre_filter={} groups={} sorts={} filters={} policy={} rows={} elements={}",
            records.len(),
            filtered_count,
            groups.len(),
            bound_sorts.len(),
            bound_filters.len(),
            if pre_group { "pre-group" } else { "post-group" },
            out.total_count(),
            out.element_count()
        );

        Ok(out)
    }
}

impl<T, V, K, A> Clone for Pipeline<T, V, K, A> {
    fn clone(&self) -> Self {
        Pipeline {
            columns: self.columns.clone(),
            reducer: self.reducer.clone(),
            options: self.options.clone(),
        }
    }
}
