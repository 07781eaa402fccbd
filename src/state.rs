use crate::color::ColorMap;
use crate::data::derive::{derive, DeriveOptions, Topology};
use crate::data::model::{EmissionDataset, FlowGraph};
use crate::data::sanitize::sanitize;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Year shown when the loaded dataset contains it.
pub const DEFAULT_YEAR: i32 = 2020;

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<EmissionDataset>,

    /// Year the diagram is filtered to.
    pub year: i32,

    /// Flat (country → emission type) or grouped (continent → country).
    pub topology: Topology,

    /// Top-K restriction toggle and value (per continent when grouped).
    pub top_k_enabled: bool,
    pub top_k: usize,

    /// Minimum edge value kept by the sanitizer, in tonnes. 0 disables.
    pub min_flow: f64,

    /// Sanitized flow graph for the current settings (cached).
    pub graph: FlowGraph,

    /// Node colours for the cached graph.
    pub colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            year: DEFAULT_YEAR,
            topology: Topology::EntityToKind,
            top_k_enabled: false,
            top_k: 10,
            min_flow: 0.0,
            graph: FlowGraph::default(),
            colors: ColorMap::default(),
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Options for the next derivation run, as currently configured.
    pub fn derive_options(&self) -> DeriveOptions {
        DeriveOptions {
            topology: self.topology,
            top_k: self.top_k_enabled.then_some(self.top_k),
        }
    }

    /// Ingest a newly loaded dataset and pick a sensible year.
    pub fn set_dataset(&mut self, dataset: EmissionDataset) {
        self.year = if dataset.years.contains(&DEFAULT_YEAR) {
            DEFAULT_YEAR
        } else {
            dataset.years.last().copied().unwrap_or(DEFAULT_YEAR)
        };
        self.dataset = Some(dataset);
        self.status_message = None;
        self.loading = false;
        self.rebuild();
    }

    /// Recompute the cached flow graph after any setting change.
    ///
    /// Runs the whole derive → sanitize pipeline; an empty result is a
    /// valid (empty) diagram, never an error.
    pub fn rebuild(&mut self) {
        let Some(ds) = &self.dataset else {
            self.graph = FlowGraph::default();
            self.colors = ColorMap::default();
            return;
        };
        let edges = derive(&ds.rows, self.year, &self.derive_options());
        self.graph = sanitize(&edges, self.min_flow);
        self.colors = ColorMap::new(&self.graph.nodes);
    }

    /// Switch the diagram year.
    pub fn set_year(&mut self, year: i32) {
        self.year = year;
        self.rebuild();
    }

    /// Switch between the flat and grouped topologies.
    pub fn set_topology(&mut self, topology: Topology) {
        self.topology = topology;
        self.rebuild();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::EmissionRow;

    fn dataset(years: &[i32]) -> EmissionDataset {
        EmissionDataset::from_rows(
            years
                .iter()
                .map(|&year| EmissionRow {
                    entity: "France".into(),
                    year,
                    fossil: 1.0,
                    land_use: 0.0,
                })
                .collect(),
        )
    }

    #[test]
    fn set_dataset_prefers_the_default_year() {
        let mut state = AppState::default();
        state.set_dataset(dataset(&[2019, 2020, 2021]));
        assert_eq!(state.year, 2020);
    }

    #[test]
    fn set_dataset_falls_back_to_latest_year() {
        let mut state = AppState::default();
        state.set_dataset(dataset(&[1990, 1991]));
        assert_eq!(state.year, 1991);
    }

    #[test]
    fn rebuild_populates_the_cached_graph() {
        let mut state = AppState::default();
        state.set_dataset(dataset(&[2020]));
        assert_eq!(state.graph.nodes, vec!["France", "Fossil"]);
        assert_eq!(state.graph.edges.len(), 1);
    }

    #[test]
    fn year_with_no_rows_is_an_empty_diagram() {
        let mut state = AppState::default();
        state.set_dataset(dataset(&[2020]));
        state.set_year(1850);
        assert!(state.graph.is_empty());
        assert!(state.status_message.is_none());
    }

    #[test]
    fn threshold_is_applied_on_rebuild() {
        let mut state = AppState::default();
        state.set_dataset(dataset(&[2020]));
        state.min_flow = 2.0;
        state.rebuild();
        assert!(state.graph.edges.is_empty());
        // Node list still reflects the derived edges.
        assert_eq!(state.graph.nodes.len(), 2);
    }
}
