use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use eframe::egui::Color32;
use rusty_smith::color::trace_color;
use rusty_smith::data::filter::{filter_range, FrequencyRange};
use rusty_smith::data::model::{CanonicalRow, Dataset, PortPair};
use rusty_smith::data::variant::FormatVariant;
use rusty_smith::data::{self, LoadError};
use rusty_smith::plot::Metric;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until user loads a file). Never modified.
    pub dataset: Option<Dataset>,

    /// Path of the loaded file, for reloading with other read settings.
    pub path: Option<PathBuf>,

    /// Variant used when opening or reloading.
    pub variant: FormatVariant,

    /// Take the port count from the `.sNp` extension instead of `ports`.
    pub ports_from_extension: bool,
    pub ports: usize,

    pub metric: Metric,
    pub selected_pairs: BTreeSet<PortPair>,
    pub range: FrequencyRange,

    /// Rows inside `range` (a filtered copy, cached).
    pub visible_rows: Vec<CanonicalRow>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            path: None,
            variant: FormatVariant::RealImag,
            ports_from_extension: true,
            ports: 2,
            metric: Metric::Db,
            selected_pairs: BTreeSet::from([PortPair::new(1, 1)]),
            range: FrequencyRange::default(),
            visible_rows: Vec::new(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Read `path` with the current variant/port settings.
    pub fn open(&mut self, path: &Path) {
        let ports = (!self.ports_from_extension).then_some(self.ports);
        match data::load(path, Some(self.variant), ports) {
            Ok(dataset) => {
                self.path = Some(path.to_path_buf());
                self.set_dataset(dataset);
            }
            Err(e) => self.report(path, e),
        }
    }

    pub fn reload(&mut self) {
        if let Some(path) = self.path.clone() {
            self.open(&path);
        }
    }

    fn report(&mut self, path: &Path, e: LoadError) {
        log::error!("Failed to load {}: {e}", path.display());
        self.status_message = Some(format!("Error: {e}"));
    }

    /// Ingest a newly loaded dataset: keep valid pair selections, show the
    /// full frequency span.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.selected_pairs.retain(|p| p.fits(dataset.ports()));
        if self.selected_pairs.is_empty() {
            self.selected_pairs.insert(PortPair::new(1, 1));
        }
        self.ports = dataset.ports();
        if let Some((lo, hi)) = dataset.frequency_span() {
            self.range = FrequencyRange::new(lo, hi);
        }

        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_rows` after a range change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_rows = filter_range(ds, self.range);
        }
    }

    pub fn toggle_pair(&mut self, pair: PortPair) {
        if !self.selected_pairs.remove(&pair) {
            self.selected_pairs.insert(pair);
        }
    }

    pub fn select_all(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selected_pairs = ds.pairs().into_iter().collect();
        }
    }

    pub fn select_none(&mut self) {
        self.selected_pairs.clear();
    }

    /// Stable colour per pair, independent of which pairs are selected.
    pub fn pair_color(&self, pair: PortPair) -> Color32 {
        let pairs = self
            .dataset
            .as_ref()
            .map(Dataset::pairs)
            .unwrap_or_default();
        let index = pairs.iter().position(|p| *p == pair).unwrap_or(0);
        let [r, g, b] = trace_color(index, pairs.len());
        Color32::from_rgb(r, g, b)
    }
}
