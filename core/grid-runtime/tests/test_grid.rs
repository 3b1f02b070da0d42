//! FILENAME: core/grid-runtime/tests/test_grid.rs
//! Integration tests for the data grid's update and scheduling behaviour.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;
use grid_engine::{matcher, GridValue, RowKind, SortDirection, SortSpec};
use grid_runtime::{ColumnEvent, GridOptions};
use tokio::time::sleep;
use common::*;

// ============================================================================
// DEBOUNCED RECORD UPDATES
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_set_records_is_deferred() {
    let grid = create_test_grid(GridOptions::default());
    assert_eq!(grid.footer_count(), 4);

    grid.set_records(vec![order(9, "umbrella", 10.0)]);
    assert!(grid.is_refresh_pending());
    assert_eq!(grid.footer_count(), 4);

    sleep(Duration::from_millis(300)).await;
    assert!(!grid.is_refresh_pending());
    assert_eq!(element_ids(&grid), vec![9]);
}

#[tokio::test(start_paused = true)]
async fn test_record_burst_recomputes_once_with_last_records() {
    let grid = create_test_grid(GridOptions::default());
    let before = grid.elements();

    for n in 1..=5u32 {
        let records = (0..n).map(|i| order(100 + i, "acme", 1.0)).collect();
        grid.set_records(records);
        sleep(Duration::from_millis(50)).await;
    }
    // Still inside the window of the last call.
    assert!(Arc::ptr_eq(&before, &grid.elements()));

    sleep(Duration::from_millis(250)).await;
    assert_eq!(element_ids(&grid), vec![100, 101, 102, 103, 104]);
}

#[tokio::test(start_paused = true)]
async fn test_debounce_window_follows_options() {
    let grid = create_test_grid(GridOptions {
        debounce_ms: 1_000,
        ..GridOptions::default()
    });
    grid.set_records(Vec::new());

    sleep(Duration::from_millis(600)).await;
    assert_eq!(grid.footer_count(), 4);

    sleep(Duration::from_millis(500)).await;
    assert_eq!(grid.footer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_now_folds_in_pending_records() {
    let grid = create_test_grid(GridOptions::default());
    grid.set_records(vec![order(7, "acme", 1.0)]);

    grid.refresh_now().unwrap();
    assert!(!grid.is_refresh_pending());
    assert_eq!(element_ids(&grid), vec![7]);
}

#[tokio::test(start_paused = true)]
async fn test_sort_change_during_pending_records_uses_new_records() {
    let grid = create_test_grid(GridOptions::default());
    grid.set_records(vec![order(1, "a", 5.0), order(2, "b", 9.0)]);

    grid.update_sort("total", SortDirection::Desc).unwrap();
    assert_eq!(element_ids(&grid), vec![2, 1]);

    sleep(Duration::from_millis(500)).await;
    assert_eq!(element_ids(&grid), vec![2, 1]);
}

// ============================================================================
// IMMEDIATE UPDATES
// ============================================================================

#[test]
fn test_multi_column_sort_priority() {
    let grid = create_test_grid(GridOptions::default());
    grid.update_sort("customer", SortDirection::Asc).unwrap();
    grid.update_sort("total", SortDirection::Asc).unwrap();
    assert_eq!(element_ids(&grid), vec![3, 1, 2, 4]);

    // Flipping the primary keeps it primary.
    grid.update_sort("customer", SortDirection::Desc).unwrap();
    assert_eq!(grid.sort(), vec![SortSpec::desc("customer"), SortSpec::asc("total")]);
    assert_eq!(element_ids(&grid), vec![4, 2, 3, 1]);

    grid.update_sort("customer", SortDirection::None).unwrap();
    assert_eq!(element_ids(&grid), vec![3, 2, 1, 4]);
}

#[test]
fn test_filters_combine_and_clear() {
    let grid = create_test_grid(GridOptions::default());
    grid.update_filter("customer", matcher::text_contains("ACME")).unwrap();
    grid.update_filter(
        "total",
        matcher::range(Some(GridValue::number(100.0)), None),
    )
    .unwrap();
    assert_eq!(element_ids(&grid), vec![1]);

    grid.clear_filter("total").unwrap();
    assert_eq!(element_ids(&grid), vec![1, 3]);
    assert!(!grid.clear_filter("total").unwrap());
}

#[test]
fn test_grouped_output_with_aggregates() {
    let grid = create_test_grid(GridOptions {
        show_aggregates: true,
        ..GridOptions::default()
    });
    grid.set_groups(vec![customer_group()]).unwrap();

    let elements = grid.elements();
    let kinds: Vec<RowKind> = elements.iter().map(|r| r.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            RowKind::Group,
            RowKind::Element,
            RowKind::Element,
            RowKind::Aggregate,
            RowKind::Group,
            RowKind::Element,
            RowKind::Aggregate,
            RowKind::Group,
            RowKind::Element,
            RowKind::Aggregate,
        ]
    );

    let header = elements.element_at(0).and_then(|r| r.as_group_header()).unwrap();
    assert_eq!(header.title, "Customer");
    assert_eq!(header.aggregate.as_ref().map(|a| a.value), Some(165.5));
    assert_eq!(grid.footer_count(), 4);
}

#[test]
fn test_post_group_filter_keeps_full_aggregates() {
    let grid = create_test_grid(GridOptions {
        include_filtered_elements_in_aggregates: true,
        ..GridOptions::default()
    });
    grid.set_groups(vec![customer_group()]).unwrap();
    grid.update_filter("total", matcher::range(Some(GridValue::number(100.0)), None))
        .unwrap();

    let elements = grid.elements();
    let acme = elements
        .iter()
        .filter_map(|r| r.as_group_header())
        .find(|h| h.key.last() == Some(&GridValue::text("acme")))
        .unwrap();
    assert_eq!(acme.aggregate.as_ref().map(|a| a.value), Some(165.5));
    assert_eq!(element_ids(&grid), vec![1, 4]);
}

// ============================================================================
// COLUMN LAYOUT
// ============================================================================

#[test]
fn test_layout_events_in_order() {
    let mut grid = create_test_grid(GridOptions {
        default_column_width: 120.0,
        ..GridOptions::default()
    });
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    grid.on_column_event(move |e| sink.lock().unwrap().push(e.clone()));

    assert_eq!(grid.layout().width("total"), Some(120.0));
    grid.resize_column("total", 90.0).unwrap();
    grid.set_columns_order(vec!["total".into(), "id".into(), "customer".into()])
        .unwrap();
    grid.set_column_visibility("id", false).unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            ColumnEvent::Resize { id: "total".into(), width: 90.0 },
            ColumnEvent::OrderChange {
                columns_order: vec!["total".into(), "id".into(), "customer".into()],
            },
            ColumnEvent::VisibilityChange { id: "id".into(), visible: false },
        ]
    );

    let ordered: Vec<&str> = grid.ordered_columns().iter().map(|e| e.id()).collect();
    assert_eq!(ordered, vec!["total", "id", "customer"]);

    let visible: Vec<&str> = grid.visible_columns().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(visible, vec!["total", "customer"]);
}
