//! FILENAME: core/grid-runtime/src/options.rs
//! Grid Options - The serializable configuration of a grid instance.

use std::time::Duration;
use serde::{Deserialize, Serialize};
use grid_engine::{PipelineOptions, SortSpec, DEFAULT_ROW_HEIGHT};

pub const DEFAULT_COLUMN_WIDTH: f64 = 100.0;
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;
pub const DEFAULT_OVERSCAN_ROW_COUNT: usize = 10;

/// Controls how a grid computes and lays out its rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridOptions {
    /// Emit a header row before each group's children.
    pub show_group_headers: bool,

    /// Aggregates see filtered-out records; filtering prunes the grouped tree.
    pub include_filtered_elements_in_aggregates: bool,

    /// Emit an aggregate row after each group's children.
    pub show_aggregates: bool,

    /// Fixed row height, used unless a computed height is installed.
    pub row_height: f64,

    /// Width of columns that do not declare one.
    pub default_column_width: f64,

    /// Quiescence window before a record change is recomputed.
    pub debounce_ms: u64,

    /// Rows rendered beyond the visible window. Carried for the renderer.
    pub overscan_row_count: usize,

    /// Sort rules active when the grid is created.
    pub initial_sort: Vec<SortSpec>,
}

impl Default for GridOptions {
    fn default() -> Self {
        let pipeline = PipelineOptions::default();
        GridOptions {
            show_group_headers: pipeline.show_group_headers,
            include_filtered_elements_in_aggregates: pipeline
                .include_filtered_elements_in_aggregates,
            show_aggregates: pipeline.show_aggregates,
            row_height: DEFAULT_ROW_HEIGHT,
            default_column_width: DEFAULT_COLUMN_WIDTH,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            overscan_row_count: DEFAULT_OVERSCAN_ROW_COUNT,
            initial_sort: Vec::new(),
        }
    }
}

impl GridOptions {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            show_group_headers: self.show_group_headers,
            include_filtered_elements_in_aggregates: self.include_filtered_elements_in_aggregates,
            show_aggregates: self.show_aggregates,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = GridOptions::default();
        assert!(options.show_group_headers);
        assert_eq!(options.row_height, 26.0);
        assert_eq!(options.debounce(), Duration::from_millis(250));
        assert_eq!(options.pipeline_options(), PipelineOptions::default());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let options = GridOptions::from_json(
            r#"{"debounce_ms": 50, "initial_sort": [{"column_id": "age", "direction": "desc"}]}"#,
        )
        .unwrap();
        assert_eq!(options.debounce_ms, 50);
        assert_eq!(options.initial_sort, vec![SortSpec::desc("age")]);
        assert_eq!(options.default_column_width, DEFAULT_COLUMN_WIDTH);
    }

    #[test]
    fn test_from_json_rejects_unknown_fields() {
        assert!(GridOptions::from_json(r#"{"rowHeight": 30}"#).is_err());
    }
}
