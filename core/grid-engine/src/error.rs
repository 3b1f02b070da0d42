//! FILENAME: core/grid-engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Unknown column id: {0}")]
    UnknownColumn(String),

    #[error("Duplicate column id: {0}")]
    DuplicateColumn(String),

    #[error("Aggregates requested for grouped rows but no aggregate reducer is configured")]
    AggregateConfiguration,

    #[error("Invalid column order: {0}")]
    InvalidColumnOrder(String),
}

pub type GridResult<T> = Result<T, GridError>;
