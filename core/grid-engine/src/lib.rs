//! FILENAME: core/grid-engine/src/lib.rs
//! Data grid transformation pipeline.
//!
//! This crate turns a flat collection of records plus caller-configured
//! rules into the ordered, flat list of rows a virtualized list renders.
//! It has no notion of time or UI state; `grid-runtime` layers those on top.
//!
//! Layers:
//! - `column`: How values are read out of records and compared
//! - `definition`: Sort rules, filters, group levels, aggregates, options
//! - `tree`: Rows and the recursive group tree
//! - `engine`: The pipeline stages and the orchestrating `Pipeline`
//! - `view`: Flattened output addressed by index (WHAT we display)

pub mod column;
pub mod definition;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod tree;
pub mod value;
pub mod view;

pub use column::{
    flat_columns, natural_order, resolve, ColumnDescriptor, ColumnEntry, ColumnGroup, ColumnSet,
};
pub use definition::{
    Aggregate, AggregateReducer, Filter, GroupDefinition, GroupKey, Matcher, PipelineOptions,
    SortDirection, SortSpec,
};
pub use engine::{enrich, filter_rows, filter_tree, flatten, group_rows, sort_rows, Pipeline};
pub use error::{GridError, GridResult};
pub use tree::{GroupNode, Row, TreeNode};
pub use value::{GridValue, OrderedFloat};
pub use view::{
    AggregateRow, ElementList, GridRow, GroupHeader, RowHeight, RowKind, DEFAULT_ROW_HEIGHT,
};
