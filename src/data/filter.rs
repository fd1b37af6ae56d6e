use std::collections::BTreeSet;

use super::model::{Dataset, ShipmentRecord};

// ---------------------------------------------------------------------------
// Filter selection: which values are selected per dimension
// ---------------------------------------------------------------------------

/// Per-dimension selection state for the three categorical filters.
///
/// A record passes only when every dimension's set contains the record's
/// value, so deselecting all values of a dimension means "show nothing",
/// never "show all".  The unfiltered default is [`FilterSelection::select_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub markets: BTreeSet<String>,
    pub shipping_modes: BTreeSet<String>,
    pub customer_segments: BTreeSet<String>,
}

impl FilterSelection {
    /// The default selection: every value observed in the dataset.
    pub fn select_all(dataset: &Dataset) -> Self {
        FilterSelection {
            markets: dataset.markets.clone(),
            shipping_modes: dataset.shipping_modes.clone(),
            customer_segments: dataset.customer_segments.clone(),
        }
    }

    /// Conjunction over the three dimensions.
    pub fn matches(&self, record: &ShipmentRecord) -> bool {
        self.markets.contains(&record.market)
            && self.shipping_modes.contains(&record.shipping_mode)
            && self.customer_segments.contains(&record.customer_segment)
    }
}

/// Records passing the selection, in source order.  Referentially
/// transparent: the same records and selection always produce the same view.
pub fn apply<'d>(
    records: &'d [ShipmentRecord],
    selection: &FilterSelection,
) -> Vec<&'d ShipmentRecord> {
    records.iter().filter(|r| selection.matches(r)).collect()
}

/// Indices of records passing the selection, in source order.  The session
/// caches these instead of record references so the dataset can sit behind
/// an `Arc`.
pub fn filtered_indices(dataset: &Dataset, selection: &FilterSelection) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| selection.matches(r))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{RawShipment, ShipmentRecord};

    fn record(market: &str, mode: &str, segment: &str) -> ShipmentRecord {
        ShipmentRecord::from_raw(RawShipment {
            market: market.into(),
            shipping_mode: mode.into(),
            customer_segment: segment.into(),
            order_country: "France".into(),
            sales: 100.0,
            department_name: "Apparel".into(),
            days_scheduled: 2,
            days_real: 3,
            late_delivery_risk: false,
        })
    }

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            record("Europe", "Standard Class", "Consumer"),
            record("LATAM", "First Class", "Corporate"),
            record("Europe", "Same Day", "Consumer"),
        ])
    }

    #[test]
    fn select_all_passes_every_record() {
        let ds = dataset();
        let selection = FilterSelection::select_all(&ds);
        assert_eq!(apply(&ds.records, &selection).len(), ds.len());
    }

    #[test]
    fn conjunction_requires_all_dimensions() {
        let ds = dataset();
        let mut selection = FilterSelection::select_all(&ds);
        selection.markets = ["Europe".to_string()].into();
        selection.shipping_modes = ["Standard Class".to_string()].into();

        let visible = apply(&ds.records, &selection);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].shipping_mode, "Standard Class");
    }

    #[test]
    fn empty_dimension_excludes_everything() {
        let ds = dataset();
        let mut selection = FilterSelection::select_all(&ds);
        selection.markets.clear();

        assert!(apply(&ds.records, &selection).is_empty());
        assert!(filtered_indices(&ds, &selection).is_empty());
    }

    #[test]
    fn source_order_is_preserved() {
        let ds = dataset();
        let mut selection = FilterSelection::select_all(&ds);
        selection.markets = ["Europe".to_string()].into();

        let indices = filtered_indices(&ds, &selection);
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let ds = dataset();
        let mut selection = FilterSelection::select_all(&ds);
        selection.customer_segments = ["Consumer".to_string()].into();

        let once = apply(&ds.records, &selection);
        let twice: Vec<&ShipmentRecord> = once
            .iter()
            .copied()
            .filter(|r| selection.matches(r))
            .collect();

        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_values_match_nothing() {
        let ds = dataset();
        let mut selection = FilterSelection::select_all(&ds);
        selection.markets = ["Atlantis".to_string()].into();

        assert!(apply(&ds.records, &selection).is_empty());
    }
}
