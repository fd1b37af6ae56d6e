use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Derived categorical labels
// ---------------------------------------------------------------------------

/// Whether a shipment arrived inside its scheduled window. Derived from the
/// delivery gap: a positive gap means the shipment ran late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeliveryStatus {
    Delayed,
    OnTime,
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStatus::Delayed => write!(f, "Delayed"),
            DeliveryStatus::OnTime => write!(f, "On Time"),
        }
    }
}

/// Late-delivery risk indicator carried over from the source flag.
/// Independent of the observed gap: an on-time shipment can still be
/// flagged high risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    High,
    Low,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::High => write!(f, "High Risk"),
            RiskLevel::Low => write!(f, "Low Risk"),
        }
    }
}

// ---------------------------------------------------------------------------
// ShipmentRecord – one row of the source table
// ---------------------------------------------------------------------------

/// The raw column values of one shipment line, before derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawShipment {
    pub market: String,
    pub shipping_mode: String,
    pub customer_segment: String,
    pub order_country: String,
    pub sales: f64,
    pub department_name: String,
    pub days_scheduled: i64,
    pub days_real: i64,
    pub late_delivery_risk: bool,
}

/// One shipment line with its derived columns. The derived fields are pure
/// functions of the raw columns, computed once in [`ShipmentRecord::from_raw`]
/// and never touched afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentRecord {
    pub market: String,
    pub shipping_mode: String,
    pub customer_segment: String,
    pub order_country: String,
    pub sales: f64,
    pub department_name: String,
    pub days_scheduled: i64,
    pub days_real: i64,
    pub late_delivery_risk: bool,
    /// Real minus scheduled shipping days; may be negative.
    pub delivery_gap: i64,
    pub delivery_status: DeliveryStatus,
    pub late_risk: RiskLevel,
}

impl ShipmentRecord {
    /// Compute the derived columns and freeze the record.
    pub fn from_raw(raw: RawShipment) -> Self {
        let delivery_gap = raw.days_real - raw.days_scheduled;
        let delivery_status = if delivery_gap > 0 {
            DeliveryStatus::Delayed
        } else {
            DeliveryStatus::OnTime
        };
        let late_risk = if raw.late_delivery_risk {
            RiskLevel::High
        } else {
            RiskLevel::Low
        };

        ShipmentRecord {
            market: raw.market,
            shipping_mode: raw.shipping_mode,
            customer_segment: raw.customer_segment,
            order_country: raw.order_country,
            sales: raw.sales,
            department_name: raw.department_name,
            days_scheduled: raw.days_scheduled,
            days_real: raw.days_real,
            late_delivery_risk: raw.late_delivery_risk,
            delivery_gap,
            delivery_status,
            late_risk,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded record set
// ---------------------------------------------------------------------------

/// The full loaded dataset with pre-computed per-dimension value indices.
/// Records keep their source order; nothing mutates them after load.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All records, in source order.
    pub records: Vec<ShipmentRecord>,
    /// Distinct markets observed in the data.
    pub markets: BTreeSet<String>,
    /// Distinct shipping modes observed in the data.
    pub shipping_modes: BTreeSet<String>,
    /// Distinct customer segments observed in the data.
    pub customer_segments: BTreeSet<String>,
}

impl Dataset {
    /// Build the dimension indices from the loaded records.
    pub fn from_records(records: Vec<ShipmentRecord>) -> Self {
        let mut markets = BTreeSet::new();
        let mut shipping_modes = BTreeSet::new();
        let mut customer_segments = BTreeSet::new();

        for record in &records {
            markets.insert(record.market.clone());
            shipping_modes.insert(record.shipping_mode.clone());
            customer_segments.insert(record.customer_segment.clone());
        }

        Dataset {
            records,
            markets,
            shipping_modes,
            customer_segments,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(days_scheduled: i64, days_real: i64, risk: bool) -> RawShipment {
        RawShipment {
            market: "Europe".into(),
            shipping_mode: "Standard Class".into(),
            customer_segment: "Consumer".into(),
            order_country: "France".into(),
            sales: 120.0,
            department_name: "Apparel".into(),
            days_scheduled,
            days_real,
            late_delivery_risk: risk,
        }
    }

    #[test]
    fn positive_gap_is_delayed() {
        let record = ShipmentRecord::from_raw(raw(2, 5, false));
        assert_eq!(record.delivery_gap, 3);
        assert_eq!(record.delivery_status, DeliveryStatus::Delayed);
    }

    #[test]
    fn zero_gap_is_on_time() {
        let record = ShipmentRecord::from_raw(raw(4, 4, false));
        assert_eq!(record.delivery_gap, 0);
        assert_eq!(record.delivery_status, DeliveryStatus::OnTime);
    }

    #[test]
    fn early_arrival_is_on_time() {
        let record = ShipmentRecord::from_raw(raw(4, 2, false));
        assert_eq!(record.delivery_gap, -2);
        assert_eq!(record.delivery_status, DeliveryStatus::OnTime);
    }

    #[test]
    fn risk_label_follows_flag_not_gap() {
        // On time but flagged: still high risk.
        let record = ShipmentRecord::from_raw(raw(4, 4, true));
        assert_eq!(record.late_risk, RiskLevel::High);

        // Late but not flagged: still low risk.
        let record = ShipmentRecord::from_raw(raw(2, 5, false));
        assert_eq!(record.late_risk, RiskLevel::Low);
    }

    #[test]
    fn status_labels_render_like_the_source_data() {
        assert_eq!(DeliveryStatus::Delayed.to_string(), "Delayed");
        assert_eq!(DeliveryStatus::OnTime.to_string(), "On Time");
        assert_eq!(RiskLevel::High.to_string(), "High Risk");
        assert_eq!(RiskLevel::Low.to_string(), "Low Risk");
    }

    #[test]
    fn dataset_indexes_distinct_dimension_values() {
        let mut a = raw(2, 3, false);
        a.market = "LATAM".into();
        let b = raw(2, 3, false);
        let mut c = raw(2, 3, false);
        c.shipping_mode = "Same Day".into();

        let dataset = Dataset::from_records(
            [a, b, c].into_iter().map(ShipmentRecord::from_raw).collect(),
        );

        assert_eq!(dataset.len(), 3);
        assert_eq!(
            dataset.markets.iter().collect::<Vec<_>>(),
            ["Europe", "LATAM"]
        );
        assert_eq!(
            dataset.shipping_modes.iter().collect::<Vec<_>>(),
            ["Same Day", "Standard Class"]
        );
        assert_eq!(dataset.customer_segments.len(), 1);
    }
}
