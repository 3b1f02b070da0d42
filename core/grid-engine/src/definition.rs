//! FILENAME: core/grid-engine/src/definition.rs
//! Grid Definition - The caller-owned rules the pipeline reads.
//!
//! This module contains all the types needed to DESCRIBE a grid run:
//! sort rules, filters, group levels, aggregates and pipeline options.
//! The pipeline only ever reads these; it never mutates them.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use crate::column::natural_order;

// ============================================================================
// SORTING
// ============================================================================

/// Sort direction for one column. `None` means "no rule for this column".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
    None,
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Asc
    }
}

impl SortDirection {
    /// Applies the direction to an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Desc => ordering.reverse(),
            SortDirection::Asc | SortDirection::None => ordering,
        }
    }
}

/// One sort rule. In a rule sequence, the first entry is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub column_id: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column_id: impl Into<String>, direction: SortDirection) -> Self {
        SortSpec {
            column_id: column_id.into(),
            direction,
        }
    }

    pub fn asc(column_id: impl Into<String>) -> Self {
        SortSpec::new(column_id, SortDirection::Asc)
    }

    pub fn desc(column_id: impl Into<String>) -> Self {
        SortSpec::new(column_id, SortDirection::Desc)
    }
}

// ============================================================================
// FILTERING
// ============================================================================

/// Predicate over an extracted column value.
pub type Matcher<V> = Arc<dyn Fn(&V) -> bool + Send + Sync>;

/// A column reference plus a predicate over the value read from it.
pub struct Filter<V> {
    pub column_id: String,
    matcher: Matcher<V>,
}

impl<V> Filter<V> {
    pub fn new<F>(column_id: impl Into<String>, matcher: F) -> Self
    where
        F: Fn(&V) -> bool + Send + Sync + 'static,
    {
        Filter {
            column_id: column_id.into(),
            matcher: Arc::new(matcher),
        }
    }

    pub fn from_matcher(column_id: impl Into<String>, matcher: Matcher<V>) -> Self {
        Filter {
            column_id: column_id.into(),
            matcher,
        }
    }

    pub fn matches(&self, value: &V) -> bool {
        (self.matcher)(value)
    }
}

impl<V> Clone for Filter<V> {
    fn clone(&self) -> Self {
        Filter {
            column_id: self.column_id.clone(),
            matcher: Arc::clone(&self.matcher),
        }
    }
}

impl<V> fmt::Debug for Filter<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("column_id", &self.column_id)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// GROUP KEYS AND AGGREGATES
// ============================================================================

/// The accumulated key of a group: one `(group id, key)` pair per enclosing
/// level, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupKey<K>(SmallVec<[(String, K); 4]>);

impl<K> GroupKey<K> {
    pub fn root() -> Self {
        GroupKey(SmallVec::new())
    }

    /// Returns a new key extended by one inner level.
    pub fn with_level(&self, group_id: &str, key: K) -> Self
    where
        K: Clone,
    {
        let mut levels = self.0.clone();
        levels.push((group_id.to_string(), key));
        GroupKey(levels)
    }

    pub fn get(&self, group_id: &str) -> Option<&K> {
        self.0.iter().find(|(id, _)| id == group_id).map(|(_, k)| k)
    }

    /// The innermost level's key.
    pub fn last(&self) -> Option<&K> {
        self.0.last().map(|(_, k)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &K)> {
        self.0.iter().map(|(id, k)| (id.as_str(), k))
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl<K> Default for GroupKey<K> {
    fn default() -> Self {
        GroupKey::root()
    }
}

/// A summary value computed over one group's member records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate<K, A> {
    pub group_key: GroupKey<K>,
    pub value: A,
}

/// Computes a group's aggregate from its member records.
pub type AggregateReducer<T, K, A> = Arc<dyn Fn(&[&T], &GroupKey<K>) -> A + Send + Sync>;

// ============================================================================
// GROUP DEFINITION
// ============================================================================

pub type GroupingFunction<T, K> = Arc<dyn Fn(&T) -> K + Send + Sync>;

/// Orders sibling groups by their level key, optionally consulting aggregates.
pub type GroupComparator<K, A> = Arc<
    dyn Fn(&K, &K, Option<&Aggregate<K, A>>, Option<&Aggregate<K, A>>) -> Ordering + Send + Sync,
>;

fn natural_group_order<K: PartialOrd, A>(
    a: &K,
    b: &K,
    _: Option<&Aggregate<K, A>>,
    _: Option<&Aggregate<K, A>>,
) -> Ordering {
    natural_order(a, b)
}

/// One grouping level. A sequence of definitions nests outer to inner.
pub struct GroupDefinition<T, K, A> {
    pub id: String,
    pub title: String,
    grouping_function: GroupingFunction<T, K>,
    comparator: GroupComparator<K, A>,
}

impl<T, K, A> GroupDefinition<T, K, A> {
    /// Creates a level ordered by its keys in natural ascending order.
    pub fn new<F>(id: impl Into<String>, grouping_function: F) -> Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
        K: PartialOrd + 'static,
        A: 'static,
    {
        let id = id.into();
        GroupDefinition {
            title: id.clone(),
            id,
            grouping_function: Arc::new(grouping_function),
            comparator: Arc::new(natural_group_order::<K, A>),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&K, &K, Option<&Aggregate<K, A>>, Option<&Aggregate<K, A>>) -> Ordering
            + Send
            + Sync
            + 'static,
    {
        self.comparator = Arc::new(comparator);
        self
    }

    pub fn key_of(&self, record: &T) -> K {
        (self.grouping_function)(record)
    }

    pub fn compare(
        &self,
        a: &K,
        b: &K,
        aggregate_a: Option<&Aggregate<K, A>>,
        aggregate_b: Option<&Aggregate<K, A>>,
    ) -> Ordering {
        (self.comparator)(a, b, aggregate_a, aggregate_b)
    }
}

impl<T, K, A> Clone for GroupDefinition<T, K, A> {
    fn clone(&self) -> Self {
        GroupDefinition {
            id: self.id.clone(),
            title: self.title.clone(),
            grouping_function: Arc::clone(&self.grouping_function),
            comparator: Arc::clone(&self.comparator),
        }
    }
}

impl<T, K, A> fmt::Debug for GroupDefinition<T, K, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupDefinition")
            .field("id", &self.id)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// PIPELINE OPTIONS
// ============================================================================

/// Switches that shape a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineOptions {
    /// Emit a header row before each group's children.
    pub show_group_headers: bool,

    /// Group and aggregate unfiltered data, then filter the tree.
    /// Only takes effect when at least one group level exists.
    pub include_filtered_elements_in_aggregates: bool,

    /// Emit an aggregate row after each group's children.
    /// Requires an aggregate reducer whenever groups exist.
    pub show_aggregates: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            show_group_headers: true,
            include_filtered_elements_in_aggregates: false,
            show_aggregates: false,
        }
    }
}
