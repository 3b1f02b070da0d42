//! FILENAME: core/grid-runtime/src/grid.rs
//! Data Grid - Owns the current inputs and the last computed element list.
//!
//! Sort, filter and group changes recompute synchronously and report
//! configuration errors to the caller. Record changes are debounced: a burst
//! of `set_records` calls produces one recompute after the quiescence window,
//! and errors from that deferred run are logged.
//!
//! Every input change bumps a generation counter; a result is only published
//! if it is at least as new as the one already visible, so a slow deferred
//! run can never overwrite a fresher immediate one.

use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use log::{debug, error, info};
use grid_engine::{
    ColumnDescriptor, ColumnEntry, ElementList, GridResult, GridRow, GroupDefinition, Matcher,
    Pipeline, RowHeight, SortDirection, SortSpec,
};
use crate::options::GridOptions;
use crate::scheduler::Debouncer;
use crate::state::{ColumnEvent, ColumnLayout, GridState};

const LOG_TARGET: &str = "grid::pipeline";

/// Callback receiving column layout changes.
pub type ColumnListener = Arc<dyn Fn(&ColumnEvent) + Send + Sync>;

// ============================================================================
// SHARED STATE
// ============================================================================

struct Inputs<T, V, K, A> {
    records: Arc<Vec<Arc<T>>>,
    groups: Vec<GroupDefinition<T, K, A>>,
    state: GridState<V>,
    generation: u64,
}

struct Published<K, T, A> {
    generation: u64,
    elements: Arc<ElementList<K, T, A>>,
}

struct Shared<T, V, K, A> {
    pipeline: Pipeline<T, V, K, A>,
    inputs: Mutex<Inputs<T, V, K, A>>,
    published: RwLock<Published<K, T, A>>,
}

impl<T, V, K, A> Shared<T, V, K, A>
where
    K: Eq + Hash + Clone,
{
    fn inputs(&self) -> MutexGuard<'_, Inputs<T, V, K, A>> {
        self.inputs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current(&self) -> Arc<ElementList<K, T, A>> {
        let published = self.published.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&published.elements)
    }

    /// Runs the pipeline over a snapshot of the inputs and publishes the result.
    fn recompute(&self) -> GridResult<()> {
        let (generation, records, groups, sort, filters) = {
            let inputs = self.inputs();
            (
                inputs.generation,
                Arc::clone(&inputs.records),
                inputs.groups.clone(),
                inputs.state.sort().to_vec(),
                inputs.state.filters().to_vec(),
            )
        };

        let elements = self.pipeline.compute_elements(&records, &groups, &sort, &filters)?;

        let mut published = self.published.write().unwrap_or_else(PoisonError::into_inner);
        if generation >= published.generation {
            published.generation = generation;
            published.elements = Arc::new(elements);
        } else {
            debug!(
                target: LOG_TARGET,
                "discarded stale result: generation {} < {}",
                generation,
                published.generation
            );
        }
        Ok(())
    }
}

// ============================================================================
// DATA GRID
// ============================================================================

pub struct DataGrid<T, V, K, A> {
    shared: Arc<Shared<T, V, K, A>>,
    debouncer: Debouncer,
    options: GridOptions,
    row_height: RowHeight<K, T, A>,
    listener: Option<ColumnListener>,
}

impl<T, V, K, A> DataGrid<T, V, K, A>
where
    T: Send + Sync + 'static,
    V: Send + Sync + 'static,
    K: Eq + Hash + Clone + Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    /// Creates the grid and computes its first element list synchronously.
    ///
    /// The pipeline's options are replaced by the ones carried in `options`.
    pub fn new(
        pipeline: Pipeline<T, V, K, A>,
        options: GridOptions,
        records: Vec<Arc<T>>,
        groups: Vec<GroupDefinition<T, K, A>>,
    ) -> GridResult<Self> {
        let pipeline = pipeline.with_options(options.pipeline_options());
        let mut state = GridState::new(pipeline.columns(), options.default_column_width);
        state.set_sort(options.initial_sort.clone())?;

        let elements = pipeline.compute_elements(&records, &groups, state.sort(), state.filters())?;

        info!(
            target: LOG_TARGET,
            "created grid: columns={} records={} groups={} rows={}",
            pipeline.columns().len(),
            records.len(),
            groups.len(),
            elements.total_count()
        );

        let shared = Shared {
            pipeline,
            inputs: Mutex::new(Inputs {
                records: Arc::new(records),
                groups,
                state,
                generation: 0,
            }),
            published: RwLock::new(Published {
                generation: 0,
                elements: Arc::new(elements),
            }),
        };

        Ok(DataGrid {
            shared: Arc::new(shared),
            debouncer: Debouncer::new(options.debounce()),
            row_height: RowHeight::Fixed(options.row_height),
            options,
            listener: None,
        })
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn pipeline(&self) -> &Pipeline<T, V, K, A> {
        &self.shared.pipeline
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    /// The most recently published element list.
    pub fn elements(&self) -> Arc<ElementList<K, T, A>> {
        self.shared.current()
    }

    pub fn total_count(&self) -> usize {
        self.elements().total_count()
    }

    /// Number of record rows currently displayed, as shown in the footer.
    pub fn footer_count(&self) -> usize {
        self.elements().element_count()
    }

    pub fn set_row_height(&mut self, row_height: RowHeight<K, T, A>) {
        self.row_height = row_height;
    }

    pub fn row_height(&self, index: usize) -> Option<f64> {
        self.elements().row_height(index, &self.row_height)
    }

    pub fn total_height(&self) -> f64 {
        self.elements().total_height(&self.row_height)
    }

    pub fn height_of(&self, row: &GridRow<K, T, A>) -> f64 {
        self.row_height.height_of(row)
    }

    // ------------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------------

    /// Replaces the records. The recompute happens after the debounce window.
    pub fn set_records(&self, records: Vec<Arc<T>>) {
        let count = records.len();
        {
            let mut inputs = self.shared.inputs();
            inputs.records = Arc::new(records);
            inputs.generation += 1;
        }
        debug!(target: LOG_TARGET, "records replaced: {} (recompute deferred)", count);

        let shared = Arc::clone(&self.shared);
        self.debouncer.schedule(move || {
            if let Err(e) = shared.recompute() {
                error!(target: LOG_TARGET, "deferred recompute failed: {}", e);
            }
        });
    }

    /// Recomputes now, folding in any pending record change.
    pub fn refresh_now(&self) -> GridResult<()> {
        self.debouncer.cancel();
        self.shared.recompute()
    }

    pub fn is_refresh_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn sort(&self) -> Vec<SortSpec> {
        self.shared.inputs().state.sort().to_vec()
    }

    pub fn groups(&self) -> Vec<GroupDefinition<T, K, A>> {
        self.shared.inputs().groups.clone()
    }

    pub fn update_sort(&self, column_id: &str, direction: SortDirection) -> GridResult<()> {
        self.change(|inputs| inputs.state.update_sort(column_id, direction))?;
        self.refresh_now()
    }

    pub fn update_filter(&self, column_id: &str, matcher: Matcher<V>) -> GridResult<()> {
        self.change(|inputs| inputs.state.update_filter(column_id, matcher))?;
        self.refresh_now()
    }

    /// Removes a column's filter. Returns whether one was active.
    pub fn clear_filter(&self, column_id: &str) -> GridResult<bool> {
        let removed = self.change(|inputs| Ok(inputs.state.clear_filter(column_id)))?;
        if removed {
            self.refresh_now()?;
        }
        Ok(removed)
    }

    pub fn set_groups(&self, groups: Vec<GroupDefinition<T, K, A>>) -> GridResult<()> {
        self.shared.pipeline.validate(&groups, &[], &[])?;
        let levels = groups.len();
        self.change(|inputs| {
            inputs.groups = groups;
            Ok(())
        })?;
        info!(target: LOG_TARGET, "grouping set: {} level(s)", levels);
        self.refresh_now()
    }

    fn change<R>(&self, f: impl FnOnce(&mut Inputs<T, V, K, A>) -> GridResult<R>) -> GridResult<R> {
        let mut inputs = self.shared.inputs();
        let result = f(&mut inputs)?;
        inputs.generation += 1;
        Ok(result)
    }

    // ------------------------------------------------------------------------
    // Column layout
    // ------------------------------------------------------------------------

    pub fn on_column_event<F>(&mut self, listener: F)
    where
        F: Fn(&ColumnEvent) + Send + Sync + 'static,
    {
        self.listener = Some(Arc::new(listener));
    }

    pub fn layout(&self) -> ColumnLayout {
        self.shared.inputs().state.layout().clone()
    }

    pub fn ordered_columns(&self) -> Vec<&ColumnEntry<T, V>> {
        self.layout().ordered_columns(self.shared.pipeline.columns())
    }

    pub fn visible_columns(&self) -> Vec<&ColumnDescriptor<T, V>> {
        self.layout().visible_columns(self.shared.pipeline.columns())
    }

    pub fn resize_column(&self, id: &str, width: f64) -> GridResult<()> {
        let event = self.shared.inputs().state.layout_mut().resize(id, width)?;
        self.emit(&event);
        Ok(())
    }

    pub fn set_column_visibility(&self, id: &str, visible: bool) -> GridResult<()> {
        let event = self.shared.inputs().state.layout_mut().set_visibility(id, visible)?;
        self.emit(&event);
        Ok(())
    }

    pub fn set_columns_order(&self, order: Vec<String>) -> GridResult<()> {
        let event = self.shared.inputs().state.layout_mut().set_order(order)?;
        self.emit(&event);
        Ok(())
    }

    fn emit(&self, event: &ColumnEvent) {
        if let Some(listener) = &self.listener {
            listener(event);
        }
    }
}

impl<T, V, K, A> std::fmt::Debug for DataGrid<T, V, K, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGrid")
            .field("options", &self.options)
            .field("debouncer", &self.debouncer)
            .field("row_height", &self.row_height)
            .finish()
    }
}
