use crate::color::ColorMap;
use crate::data::filter::{FilterCriteria, filtered_indices, init_criteria};
use crate::data::model::{Dataset, Schema};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// Column capabilities resolved once per load.
    pub schema: Schema,

    /// Sidebar filter criteria.
    pub criteria: FilterCriteria,

    /// Indices of rows passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Truncation for the category ranking (1..=20).
    pub top_n: usize,

    /// Numeric column driving the KPI strip and trend charts.
    pub measure_column: Option<String>,

    /// Category label → colour, shared by bar/pie/heatmap.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            schema: Schema::default(),
            criteria: FilterCriteria::default(),
            visible_indices: Vec::new(),
            top_n: 10,
            measure_column: None,
            color_map: None,
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset: resolve the schema, initialise filters
    /// to pass everything, and rebuild the category colour map.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.schema = Schema::resolve(&dataset);
        self.criteria = init_criteria(&dataset, &self.schema);
        self.visible_indices = (0..dataset.len()).collect();
        self.measure_column = self.schema.default_measure();

        self.color_map = self
            .schema
            .category
            .as_deref()
            .map(|col| ColorMap::new(col, &dataset.labels(col)));

        self.dataset = Some(dataset);
        self.status_message = None;
        self.loading = false;
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.schema, &self.criteria);
        }
    }

    /// Toggle one category in the allow-list.
    pub fn toggle_category(&mut self, label: &str) {
        if !self.criteria.categories.remove(label) {
            self.criteria.categories.insert(label.to_string());
        }
        self.refilter();
    }

    /// Select every observed category.
    pub fn select_all_categories(&mut self) {
        if let (Some(ds), Some(col)) = (&self.dataset, self.schema.category.as_deref()) {
            self.criteria.categories = ds.labels(col).into_iter().collect();
            self.refilter();
        }
    }

    /// Deselect every category (hides all rows).
    pub fn select_no_categories(&mut self) {
        self.criteria.categories.clear();
        self.refilter();
    }

    /// Reset the date window to the observed bounds.
    pub fn reset_dates(&mut self) {
        if let (Some(ds), Some(_)) = (&self.dataset, self.schema.date.as_deref()) {
            let fresh = init_criteria(ds, &self.schema);
            self.criteria.start_date = fresh.start_date;
            self.criteria.end_date = fresh.end_date;
            self.refilter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil::{date, sample_dataset};

    #[test]
    fn set_dataset_initialises_everything() {
        let mut state = AppState::default();
        state.set_dataset(sample_dataset());
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.measure_column.as_deref(), Some("challan_count"));
        assert_eq!(state.criteria.start_date, Some(date(2024, 1, 1)));
        assert!(state.color_map.is_some());
    }

    #[test]
    fn toggling_a_category_refilters() {
        let mut state = AppState::default();
        state.set_dataset(sample_dataset());
        state.toggle_category("Speeding");
        assert_eq!(state.visible_indices, vec![1]);
        state.toggle_category("Speeding");
        assert_eq!(state.visible_indices, vec![0, 1]);
    }

    #[test]
    fn select_none_hides_all_rows() {
        let mut state = AppState::default();
        state.set_dataset(sample_dataset());
        state.select_no_categories();
        assert!(state.visible_indices.is_empty());
        state.select_all_categories();
        assert_eq!(state.visible_indices.len(), 2);
    }
}
