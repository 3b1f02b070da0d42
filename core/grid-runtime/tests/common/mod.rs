//! FILENAME: core/grid-runtime/tests/common/mod.rs
//! Shared fixtures for grid-runtime integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use grid_engine::{
    ColumnDescriptor, ColumnEntry, ColumnSet, GridValue, GroupDefinition, GroupKey, Pipeline,
};
use grid_runtime::{DataGrid, GridOptions};

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: u32,
    pub customer: String,
    pub total: f64,
}

pub type TestGrid = DataGrid<Order, GridValue, GridValue, f64>;

pub fn order(id: u32, customer: &str, total: f64) -> Arc<Order> {
    Arc::new(Order {
        id,
        customer: customer.to_string(),
        total,
    })
}

pub fn create_test_orders() -> Vec<Arc<Order>> {
    vec![
        order(1, "acme", 120.0),
        order(2, "globex", 80.0),
        order(3, "acme", 45.5),
        order(4, "initech", 300.0),
    ]
}

fn sum_totals(members: &[&Order], _key: &GroupKey<GridValue>) -> f64 {
    members.iter().map(|o| o.total).sum()
}

pub fn create_test_pipeline() -> Pipeline<Order, GridValue, GridValue, f64> {
    let entries: Vec<ColumnEntry<Order, GridValue>> = vec![
        ColumnDescriptor::new("id", |o: &Order| GridValue::number(o.id as f64)).into(),
        ColumnDescriptor::new("customer", |o: &Order| GridValue::text(o.customer.clone())).into(),
        ColumnDescriptor::new("total", |o: &Order| GridValue::number(o.total)).into(),
    ];
    let columns = ColumnSet::new(entries).expect("test columns are unique");
    Pipeline::new(columns).with_reducer(sum_totals)
}

pub fn create_test_grid(options: GridOptions) -> TestGrid {
    DataGrid::new(create_test_pipeline(), options, create_test_orders(), Vec::new())
        .expect("test grid configuration is valid")
}

pub fn customer_group() -> GroupDefinition<Order, GridValue, f64> {
    GroupDefinition::new("customer", |o: &Order| GridValue::text(o.customer.clone()))
        .with_title("Customer")
}

/// Ids of the element rows in display order.
pub fn element_ids(grid: &TestGrid) -> Vec<u32> {
    grid.elements()
        .iter()
        .filter_map(|r| r.as_element())
        .map(|r| r.content.id)
        .collect()
}
