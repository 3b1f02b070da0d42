//! FILENAME: core/grid-engine/src/matcher.rs
//! Ready-made filter predicates for the common header filter widgets.

use std::fmt::Display;
use std::sync::Arc;
use crate::definition::Matcher;

/// Case-insensitive substring match over the value's display form.
/// An empty needle matches everything.
pub fn text_contains<V: Display + 'static>(needle: &str) -> Matcher<V> {
    let needle = needle.to_uppercase();
    Arc::new(move |value: &V| value.to_string().to_uppercase().contains(&needle))
}

/// Matches values equal to `expected`.
pub fn equals<V>(expected: V) -> Matcher<V>
where
    V: PartialEq + Send + Sync + 'static,
{
    Arc::new(move |value: &V| *value == expected)
}

/// Matches values equal to any of `allowed`. An empty list matches nothing.
pub fn one_of<V>(allowed: Vec<V>) -> Matcher<V>
where
    V: PartialEq + Send + Sync + 'static,
{
    Arc::new(move |value: &V| allowed.contains(value))
}

/// Inclusive range match; a missing bound is open.
pub fn range<V>(min: Option<V>, max: Option<V>) -> Matcher<V>
where
    V: PartialOrd + Send + Sync + 'static,
{
    Arc::new(move |value: &V| {
        min.as_ref().map_or(true, |min| value >= min)
            && max.as_ref().map_or(true, |max| value <= max)
    })
}
