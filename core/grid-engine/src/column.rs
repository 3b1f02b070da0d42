//! FILENAME: core/grid-engine/src/column.rs
//! Column Descriptors - How values are read out of records and compared.
//!
//! A column is configured once by the caller and is read-only afterwards.
//! Columns may be clustered under a named `ColumnGroup`; every pipeline
//! lookup works on the flattened set, where group members appear in their
//! declared position.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::error::{GridError, GridResult};

/// Reads a comparable value out of a record.
pub type ValueGetter<T, V> = Arc<dyn Fn(&T) -> V + Send + Sync>;

/// Orders two extracted values.
pub type ValueComparator<V> = Arc<dyn Fn(&V, &V) -> Ordering + Send + Sync>;

/// Natural ascending order, made total: a value that is not comparable
/// with itself (e.g. NaN) sorts after every comparable value and equal to
/// other such values.
pub fn natural_order<V: PartialOrd>(a: &V, b: &V) -> Ordering {
    match a.partial_cmp(b) {
        Some(ordering) => ordering,
        None => {
            let a_comparable = a.partial_cmp(a).is_some();
            let b_comparable = b.partial_cmp(b).is_some();
            b_comparable.cmp(&a_comparable)
        }
    }
}

// ============================================================================
// COLUMN DESCRIPTOR
// ============================================================================

/// Value extraction and comparison contract for one field.
pub struct ColumnDescriptor<T, V> {
    pub id: String,
    pub title: Option<String>,
    pub width: Option<f64>,
    pub hidden: bool,
    value_getter: ValueGetter<T, V>,
    comparator: ValueComparator<V>,
}

impl<T, V> ColumnDescriptor<T, V> {
    /// Creates a column compared in natural ascending order.
    pub fn new<F>(id: impl Into<String>, value_getter: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: PartialOrd + 'static,
    {
        ColumnDescriptor {
            id: id.into(),
            title: None,
            width: None,
            hidden: false,
            value_getter: Arc::new(value_getter),
            comparator: Arc::new(natural_order::<V>),
        }
    }

    pub fn with_comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&V, &V) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Arc::new(comparator);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Title shown in the header, falling back to the id.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    pub fn value_of(&self, record: &T) -> V {
        (self.value_getter)(record)
    }

    pub fn compare(&self, a: &V, b: &V) -> Ordering {
        (self.comparator)(a, b)
    }
}

impl<T, V> Clone for ColumnDescriptor<T, V> {
    fn clone(&self) -> Self {
        ColumnDescriptor {
            id: self.id.clone(),
            title: self.title.clone(),
            width: self.width,
            hidden: self.hidden,
            value_getter: Arc::clone(&self.value_getter),
            comparator: Arc::clone(&self.comparator),
        }
    }
}

impl<T, V> fmt::Debug for ColumnDescriptor<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("width", &self.width)
            .field("hidden", &self.hidden)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// COLUMN GROUP
// ============================================================================

/// A named cluster of columns, laid out and resized as one unit.
pub struct ColumnGroup<T, V> {
    pub id: String,
    pub title: Option<String>,
    pub width: Option<f64>,
    pub hidden: bool,
    pub columns: Vec<ColumnDescriptor<T, V>>,
}

impl<T, V> ColumnGroup<T, V> {
    pub fn new(id: impl Into<String>, columns: Vec<ColumnDescriptor<T, V>>) -> Self {
        ColumnGroup {
            id: id.into(),
            title: None,
            width: None,
            hidden: false,
            columns,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}

impl<T, V> Clone for ColumnGroup<T, V> {
    fn clone(&self) -> Self {
        ColumnGroup {
            id: self.id.clone(),
            title: self.title.clone(),
            width: self.width,
            hidden: self.hidden,
            columns: self.columns.clone(),
        }
    }
}

impl<T, V> fmt::Debug for ColumnGroup<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnGroup")
            .field("id", &self.id)
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// COLUMN ENTRY
// ============================================================================

/// A top-level column slot: a single column or a column group.
pub enum ColumnEntry<T, V> {
    Column(ColumnDescriptor<T, V>),
    Group(ColumnGroup<T, V>),
}

impl<T, V> ColumnEntry<T, V> {
    pub fn id(&self) -> &str {
        match self {
            ColumnEntry::Column(c) => &c.id,
            ColumnEntry::Group(g) => &g.id,
        }
    }

    pub fn width(&self) -> Option<f64> {
        match self {
            ColumnEntry::Column(c) => c.width,
            ColumnEntry::Group(g) => g.width,
        }
    }

    pub fn hidden(&self) -> bool {
        match self {
            ColumnEntry::Column(c) => c.hidden,
            ColumnEntry::Group(g) => g.hidden,
        }
    }

    /// The descriptors this entry expands to, in declared order.
    pub fn descriptors(&self) -> &[ColumnDescriptor<T, V>] {
        match self {
            ColumnEntry::Column(c) => std::slice::from_ref(c),
            ColumnEntry::Group(g) => &g.columns,
        }
    }
}

impl<T, V> Clone for ColumnEntry<T, V> {
    fn clone(&self) -> Self {
        match self {
            ColumnEntry::Column(c) => ColumnEntry::Column(c.clone()),
            ColumnEntry::Group(g) => ColumnEntry::Group(g.clone()),
        }
    }
}

impl<T, V> fmt::Debug for ColumnEntry<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnEntry::Column(c) => f.debug_tuple("Column").field(c).finish(),
            ColumnEntry::Group(g) => f.debug_tuple("Group").field(g).finish(),
        }
    }
}

impl<T, V> From<ColumnDescriptor<T, V>> for ColumnEntry<T, V> {
    fn from(column: ColumnDescriptor<T, V>) -> Self {
        ColumnEntry::Column(column)
    }
}

impl<T, V> From<ColumnGroup<T, V>> for ColumnEntry<T, V> {
    fn from(group: ColumnGroup<T, V>) -> Self {
        ColumnEntry::Group(group)
    }
}

/// Expands column groups into their members, preserving declared order.
pub fn flat_columns<T, V>(entries: &[ColumnEntry<T, V>]) -> Vec<&ColumnDescriptor<T, V>> {
    entries.iter().flat_map(|e| e.descriptors()).collect()
}

/// Finds a column by id in the flattened column set.
pub fn resolve<'a, T, V>(
    entries: &'a [ColumnEntry<T, V>],
    id: &str,
) -> GridResult<&'a ColumnDescriptor<T, V>> {
    flat_columns(entries)
        .into_iter()
        .find(|c| c.id == id)
        .ok_or_else(|| GridError::UnknownColumn(id.to_string()))
}

// ============================================================================
// COLUMN SET
// ============================================================================

/// Validated column configuration with an id index over the flattened set.
pub struct ColumnSet<T, V> {
    entries: Vec<ColumnEntry<T, V>>,
    index: FxHashMap<String, (usize, usize)>,
}

impl<T, V> ColumnSet<T, V> {
    /// Builds the set, rejecting repeated column ids (after group expansion)
    /// and repeated top-level entry ids.
    pub fn new(entries: Vec<ColumnEntry<T, V>>) -> GridResult<Self> {
        let mut index = FxHashMap::default();
        let mut entry_ids = FxHashMap::default();

        for (entry_pos, entry) in entries.iter().enumerate() {
            if entry_ids.insert(entry.id().to_string(), entry_pos).is_some() {
                return Err(GridError::DuplicateColumn(entry.id().to_string()));
            }
            for (member_pos, column) in entry.descriptors().iter().enumerate() {
                if index.insert(column.id.clone(), (entry_pos, member_pos)).is_some() {
                    return Err(GridError::DuplicateColumn(column.id.clone()));
                }
            }
        }

        Ok(ColumnSet { entries, index })
    }

    pub fn entries(&self) -> &[ColumnEntry<T, V>] {
        &self.entries
    }

    pub fn entry(&self, id: &str) -> Option<&ColumnEntry<T, V>> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn flat_columns(&self) -> Vec<&ColumnDescriptor<T, V>> {
        flat_columns(&self.entries)
    }

    pub fn resolve(&self, id: &str) -> GridResult<&ColumnDescriptor<T, V>> {
        let &(entry_pos, member_pos) = self
            .index
            .get(id)
            .ok_or_else(|| GridError::UnknownColumn(id.to_string()))?;
        Ok(&self.entries[entry_pos].descriptors()[member_pos])
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl<T, V> Clone for ColumnSet<T, V> {
    fn clone(&self) -> Self {
        ColumnSet {
            entries: self.entries.clone(),
            index: self.index.clone(),
        }
    }
}

impl<T, V> fmt::Debug for ColumnSet<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSet").field("entries", &self.entries).finish()
    }
}
