use serde::Serialize;

use crate::data::model::{DeliveryStatus, RiskLevel, ShipmentRecord};
use crate::error::EmptyDataset;

// ---------------------------------------------------------------------------
// Delivery-performance KPIs
// ---------------------------------------------------------------------------

/// Aggregate KPIs over a filtered record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub total_count: usize,
    pub delayed_count: usize,
    /// Share of records delivered on time, in percent.
    pub on_time_pct: f64,
    /// Mean positive delivery gap in days.  `None` when nothing is late:
    /// "no delays" is not the same as an average of zero days.
    pub avg_delay_days: Option<f64>,
    pub high_risk_count: usize,
}

/// Compute KPIs over a filtered view.
///
/// An empty input is an error so callers short-circuit before rendering,
/// instead of propagating a division by zero into the display.
pub fn compute(records: &[&ShipmentRecord]) -> Result<Metrics, EmptyDataset> {
    if records.is_empty() {
        return Err(EmptyDataset);
    }

    let total_count = records.len();
    let delayed_count = records
        .iter()
        .filter(|r| r.delivery_status == DeliveryStatus::Delayed)
        .count();
    let on_time_pct = (total_count - delayed_count) as f64 / total_count as f64 * 100.0;

    let positive_gaps: Vec<i64> = records
        .iter()
        .filter(|r| r.delivery_gap > 0)
        .map(|r| r.delivery_gap)
        .collect();
    let avg_delay_days = if positive_gaps.is_empty() {
        None
    } else {
        Some(positive_gaps.iter().sum::<i64>() as f64 / positive_gaps.len() as f64)
    };

    let high_risk_count = records
        .iter()
        .filter(|r| r.late_risk == RiskLevel::High)
        .count();

    Ok(Metrics {
        total_count,
        delayed_count,
        on_time_pct,
        avg_delay_days,
        high_risk_count,
    })
}
