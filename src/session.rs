use std::path::Path;
use std::sync::Arc;

use crate::data::filter::{self, FilterSelection};
use crate::data::loader::LoaderCache;
use crate::data::model::{Dataset, ShipmentRecord};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Dashboard session
// ---------------------------------------------------------------------------

/// One user's view over the data: the loader cache, the active dataset, the
/// filter selection, and the cached filtered indices.
///
/// Sessions are independent of each other; the core keeps no global state,
/// so a multi-user deployment gives each user their own instance.
#[derive(Default)]
pub struct DashboardSession {
    cache: LoaderCache,
    dataset: Option<Arc<Dataset>>,

    /// Per-dimension filter selections.
    pub filters: FilterSelection,

    /// Indices of records passing the current filters (cached).
    visible_indices: Vec<usize>,
}

impl DashboardSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a dataset (through the cache) and reset the filters to the full
    /// selection.  Re-opening a source already seen this session reuses the
    /// parsed dataset.
    pub fn open(&mut self, path: &Path) -> Result<(), LoadError> {
        let dataset = self.cache.load(path)?;
        self.filters = FilterSelection::select_all(&dataset);
        self.visible_indices = (0..dataset.len()).collect();
        self.dataset = Some(dataset);
        Ok(())
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_deref()
    }

    /// Records passing the current filters, in source order.
    pub fn visible_records(&self) -> Vec<&ShipmentRecord> {
        match &self.dataset {
            Some(dataset) => self
                .visible_indices
                .iter()
                .map(|&i| &dataset.records[i])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Recompute the visible set after a filter change.
    pub fn refilter(&mut self) {
        if let Some(dataset) = &self.dataset {
            self.visible_indices = filter::filtered_indices(dataset, &self.filters);
        }
    }

    /// Reset every dimension to the full selection.
    pub fn select_all(&mut self) {
        if let Some(dataset) = &self.dataset {
            self.filters = FilterSelection::select_all(dataset);
        }
        self.refilter();
    }

    /// Toggle a single market in or out of the selection.
    pub fn toggle_market(&mut self, value: &str) {
        if !self.filters.markets.remove(value) {
            self.filters.markets.insert(value.to_string());
        }
        self.refilter();
    }

    /// Toggle a single shipping mode in or out of the selection.
    pub fn toggle_shipping_mode(&mut self, value: &str) {
        if !self.filters.shipping_modes.remove(value) {
            self.filters.shipping_modes.insert(value.to_string());
        }
        self.refilter();
    }

    /// Toggle a single customer segment in or out of the selection.
    pub fn toggle_customer_segment(&mut self, value: &str) {
        if !self.filters.customer_segments.remove(value) {
            self.filters.customer_segments.insert(value.to_string());
        }
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_CSV: &str = "\
Market,Shipping Mode,Customer Segment,Order Country,Sales,Department Name,Days for shipping (real),Days for shipment (scheduled),Late_delivery_risk
Europe,Standard Class,Consumer,France,314.64,Apparel,6,4,1
LATAM,First Class,Corporate,Mexico,91.25,Golf,2,1,0
Europe,Same Day,Consumer,Germany,153.0,Fan Shop,0,0,0
";

    fn open_sample() -> (tempfile::TempDir, DashboardSession) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shipments.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(SAMPLE_CSV.as_bytes()).unwrap();

        let mut session = DashboardSession::new();
        session.open(&path).unwrap();
        (dir, session)
    }

    #[test]
    fn open_starts_with_everything_visible() {
        let (_dir, session) = open_sample();
        assert_eq!(session.visible_records().len(), 3);
        assert_eq!(session.filters.markets.len(), 2);
    }

    #[test]
    fn toggling_a_market_off_hides_its_records() {
        let (_dir, mut session) = open_sample();
        session.toggle_market("Europe");

        let visible = session.visible_records();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].market, "LATAM");

        // Toggling back restores the full view.
        session.toggle_market("Europe");
        assert_eq!(session.visible_records().len(), 3);
    }

    #[test]
    fn clearing_a_dimension_empties_the_view() {
        let (_dir, mut session) = open_sample();
        session.toggle_shipping_mode("Standard Class");
        session.toggle_shipping_mode("First Class");
        session.toggle_shipping_mode("Same Day");

        assert!(session.visible_records().is_empty());

        session.select_all();
        assert_eq!(session.visible_records().len(), 3);
    }
}
