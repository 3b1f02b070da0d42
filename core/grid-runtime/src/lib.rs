//! FILENAME: core/grid-runtime/src/lib.rs
//! Stateful grid controller on top of `grid-engine`.
//!
//! - `options`: Serializable grid configuration
//! - `state`: Sort/filter rule sets and column layout
//! - `scheduler`: Debounced deferred recomputation
//! - `grid`: `DataGrid`, which ties the pieces to a `Pipeline`

pub mod grid;
pub mod options;
pub mod scheduler;
pub mod state;

pub use grid::{ColumnListener, DataGrid};
pub use options::GridOptions;
pub use scheduler::Debouncer;
pub use state::{ColumnEvent, ColumnLayout, GridState};
