//! FILENAME: core/grid-engine/src/value.rs
//! Grid Value - A hashable, totally ordered cell value.
//!
//! Record types are caller-defined, but most grids read plain scalars out of
//! them. `GridValue` gives those scalars a single representation that can be
//! used both as a column value (sorting, filtering) and as a group key
//! (hashing for partitioning, ordering for group comparators).

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use serde::{Deserialize, Serialize};

// ============================================================================
// ORDERED FLOAT
// ============================================================================

/// Wrapper around f64 that implements Eq, Ord and Hash.
/// NaN values are treated as equal to each other and sort after every number.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderedFloat(pub f64);

impl OrderedFloat {
    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrderedFloat {}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.is_nan(), other.0.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal),
        }
    }
}

impl Hash for OrderedFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            u64::MAX.hash(state);
        } else if self.0 == 0.0 {
            // -0.0 == 0.0, so they must hash alike
            0u64.hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

// ============================================================================
// GRID VALUE
// ============================================================================

/// A scalar read out of a record.
///
/// Ordering across variants: Empty < Number < Text < Boolean.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridValue {
    Empty,
    Number(OrderedFloat),
    Text(String),
    Boolean(bool),
}

impl GridValue {
    pub fn number(n: f64) -> Self {
        GridValue::Number(OrderedFloat(n))
    }

    pub fn text(s: impl Into<String>) -> Self {
        GridValue::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, GridValue::Empty)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GridValue::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GridValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            GridValue::Empty => 0,
            GridValue::Number(_) => 1,
            GridValue::Text(_) => 2,
            GridValue::Boolean(_) => 3,
        }
    }
}

impl Default for GridValue {
    fn default() -> Self {
        GridValue::Empty
    }
}

impl PartialOrd for GridValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GridValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GridValue::Number(a), GridValue::Number(b)) => a.cmp(b),
            (GridValue::Text(a), GridValue::Text(b)) => a.cmp(b),
            (GridValue::Boolean(a), GridValue::Boolean(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Display form used by text matchers. Empty displays as the empty string.
impl fmt::Display for GridValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridValue::Empty => Ok(()),
            GridValue::Number(n) => write!(f, "{}", n.as_f64()),
            GridValue::Text(s) => f.write_str(s),
            GridValue::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

impl From<f64> for GridValue {
    fn from(value: f64) -> Self {
        GridValue::number(value)
    }
}

impl From<i64> for GridValue {
    fn from(value: i64) -> Self {
        GridValue::number(value as f64)
    }
}

impl From<&str> for GridValue {
    fn from(value: &str) -> Self {
        GridValue::Text(value.to_string())
    }
}

impl From<String> for GridValue {
    fn from(value: String) -> Self {
        GridValue::Text(value)
    }
}

impl From<bool> for GridValue {
    fn from(value: bool) -> Self {
        GridValue::Boolean(value)
    }
}

impl<V: Into<GridValue>> From<Option<V>> for GridValue {
    fn from(value: Option<V>) -> Self {
        value.map(Into::into).unwrap_or(GridValue::Empty)
    }
}
