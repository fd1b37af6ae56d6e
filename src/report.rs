use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::analytics::views::{self, DelayCell, SampleRng, SchedulePoint};
use crate::analytics::{metrics, metrics::Metrics};
use crate::data::model::ShipmentRecord;
use crate::error::EmptyDataset;

// ---------------------------------------------------------------------------
// Report – everything the shell renders for one filter pass
// ---------------------------------------------------------------------------

/// The KPIs plus the four aggregation views over one filtered record set.
#[derive(Debug, Serialize)]
pub struct Report {
    pub metrics: Metrics,
    pub sales_by_country: BTreeMap<String, f64>,
    pub delay_intensity: Vec<DelayCell>,
    pub schedule_sample: Vec<SchedulePoint>,
    pub delayed_by_segment: BTreeMap<String, u64>,
}

impl Report {
    /// Build the full report.  Fails on an empty view before any aggregation
    /// runs, so a caller never renders charts over zero rows.
    pub fn build(records: &[&ShipmentRecord], rng: &mut SampleRng) -> Result<Report, EmptyDataset> {
        let metrics = metrics::compute(records)?;
        Ok(Report {
            metrics,
            sales_by_country: views::sales_by_country(records),
            delay_intensity: views::delay_intensity(records),
            schedule_sample: views::schedule_sample(records, rng),
            delayed_by_segment: views::delayed_by_segment(records),
        })
    }

    /// Plain-text rendering for the terminal.
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        let avg_delay = match self.metrics.avg_delay_days {
            Some(days) => format!("{days:.1} days"),
            None => "n/a".to_string(),
        };

        let _ = writeln!(out, "Delivery performance");
        let _ = writeln!(out, "  total orders      {}", self.metrics.total_count);
        let _ = writeln!(out, "  delayed orders    {}", self.metrics.delayed_count);
        let _ = writeln!(out, "  on-time rate      {:.2}%", self.metrics.on_time_pct);
        let _ = writeln!(out, "  avg delay         {avg_delay}");
        let _ = writeln!(out, "  high-risk orders  {}", self.metrics.high_risk_count);

        let _ = writeln!(out, "\nSales by country");
        for (country, sales) in &self.sales_by_country {
            let _ = writeln!(out, "  {country:<24} {sales:>12.2}");
        }

        let _ = writeln!(out, "\nDelay volume by mode and department");
        if self.delay_intensity.is_empty() {
            let _ = writeln!(out, "  (no delayed shipments)");
        }
        for cell in &self.delay_intensity {
            let _ = writeln!(
                out,
                "  {:<16} {:<16} {:>6}",
                cell.shipping_mode, cell.department, cell.count
            );
        }

        let _ = writeln!(out, "\nDelayed orders by segment");
        if self.delayed_by_segment.is_empty() {
            let _ = writeln!(out, "  (no delayed shipments)");
        }
        for (segment, count) in &self.delayed_by_segment {
            let _ = writeln!(out, "  {segment:<24} {count:>6}");
        }

        let _ = writeln!(
            out,
            "\nScheduled vs. real sample: {} points",
            self.schedule_sample.len()
        );

        out
    }

    /// JSON rendering for downstream chart layers.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
