use std::path::Path;
use std::sync::Arc;

use crate::data::filter::FilterSelection;
use crate::data::model::{AccidentDataset, CategoryDim, FlagDim};
use crate::data::pipeline::{compute, DashboardFrame};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// The dataset sits behind an `Arc` and is never mutated after load; each
/// control change takes a fresh selection snapshot and recomputes the frame
/// from the full dataset.
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Arc<AccidentDataset>>,

    /// Current control values.
    pub selection: FilterSelection,

    /// Metrics and chart tables for the current selection (cached).
    pub frame: DashboardFrame,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            selection: FilterSelection::default(),
            frame: DashboardFrame::default(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset and reset the controls.
    pub fn set_dataset(&mut self, dataset: AccidentDataset) {
        self.selection = FilterSelection::default();
        // The obstacle control starts at the observed bounds, which passes
        // every record.
        self.selection.set_obstacles(Some(dataset.obstacle_bounds));
        self.dataset = Some(Arc::new(dataset));
        self.status_message = None;
        self.recompute();
    }

    /// Load a dataset file, keeping the app alive on failure.
    pub fn load_path(&mut self, path: &Path) {
        match crate::data::loader::load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} accident records from {}",
                    dataset.len(),
                    path.display()
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Re-run the pipeline for the current selection.
    pub fn recompute(&mut self) {
        if let Some(ds) = &self.dataset {
            self.frame = compute(ds, &self.selection);
        } else {
            self.frame = DashboardFrame::default();
        }
    }

    /// Set a categorical control (`None` = "All") and refresh.
    pub fn set_category(&mut self, dim: CategoryDim, value: Option<String>) {
        self.selection.set_category(dim, value);
        self.recompute();
    }

    /// Set a boolean control (`None` = "All") and refresh.
    pub fn set_flag(&mut self, dim: FlagDim, value: Option<bool>) {
        self.selection.set_flag(dim, value);
        self.recompute();
    }

    /// Set the obstacle-count interval and refresh.
    pub fn set_obstacles(&mut self, lo: u32, hi: u32) {
        self.selection.set_obstacles(Some((lo, hi)));
        self.recompute();
    }

    /// Return every control to "All".
    pub fn reset_filters(&mut self) {
        self.selection.clear();
        if let Some(ds) = &self.dataset {
            self.selection.set_obstacles(Some(ds.obstacle_bounds));
        }
        self.recompute();
    }
}
