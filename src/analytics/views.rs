use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::data::model::{DeliveryStatus, ShipmentRecord};

// ---------------------------------------------------------------------------
// By-country sales
// ---------------------------------------------------------------------------

/// Total sales per order country, one entry per country present in the view.
pub fn sales_by_country(records: &[&ShipmentRecord]) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.order_country.clone()).or_default() += record.sales;
    }
    totals
}

// ---------------------------------------------------------------------------
// Delay intensity matrix
// ---------------------------------------------------------------------------

/// One cell of the delay intensity matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelayCell {
    pub shipping_mode: String,
    pub department: String,
    pub count: u64,
}

/// Count of late shipments per (shipping mode, department) cell, sorted by
/// mode then department.  Only records with a positive gap contribute.
///
/// The matrix counts frequency rather than averaging gap size: a high-volume
/// mode with small slips should outrank a rare mode with large ones.
pub fn delay_intensity(records: &[&ShipmentRecord]) -> Vec<DelayCell> {
    let mut counts: BTreeMap<(String, String), u64> = BTreeMap::new();
    for record in records.iter().filter(|r| r.delivery_gap > 0) {
        *counts
            .entry((record.shipping_mode.clone(), record.department_name.clone()))
            .or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((shipping_mode, department), count)| DelayCell {
            shipping_mode,
            department,
            count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Scheduled-vs-real sample
// ---------------------------------------------------------------------------

/// Scatter rendering gets at most this many points; larger views are
/// sampled down.
pub const SAMPLE_CAP: usize = 1000;

/// One scatter point: scheduled vs. real shipping days, colored by mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulePoint {
    pub days_scheduled: i64,
    pub days_real: i64,
    pub shipping_mode: String,
}

/// A without-replacement sample of `min(SAMPLE_CAP, n)` scatter points.
/// The chosen records keep their source order.
pub fn schedule_sample(records: &[&ShipmentRecord], rng: &mut SampleRng) -> Vec<SchedulePoint> {
    let n = records.len();
    let point = |r: &ShipmentRecord| SchedulePoint {
        days_scheduled: r.days_scheduled,
        days_real: r.days_real,
        shipping_mode: r.shipping_mode.clone(),
    };

    if n <= SAMPLE_CAP {
        return records.iter().map(|r| point(r)).collect();
    }

    // Partial Fisher-Yates: after SAMPLE_CAP swaps the prefix holds a
    // uniform without-replacement sample of the indices.
    let mut indices: Vec<usize> = (0..n).collect();
    for i in 0..SAMPLE_CAP {
        let j = i + rng.gen_range(n - i);
        indices.swap(i, j);
    }
    let mut chosen = indices[..SAMPLE_CAP].to_vec();
    chosen.sort_unstable();

    chosen.into_iter().map(|i| point(records[i])).collect()
}

// ---------------------------------------------------------------------------
// Delayed-by-segment counts
// ---------------------------------------------------------------------------

/// Delayed-record count per customer segment.  Segments with no delayed
/// records are absent, not zero-filled.
pub fn delayed_by_segment(records: &[&ShipmentRecord]) -> BTreeMap<String, u64> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|r| r.delivery_status == DeliveryStatus::Delayed)
    {
        *counts.entry(record.customer_segment.clone()).or_default() += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Sampling PRNG
// ---------------------------------------------------------------------------

/// Minimal deterministic PRNG (xoshiro256**).
///
/// Seedable so tests can pin the scatter sample; production callers seed
/// from the clock via [`SampleRng::from_entropy`].
pub struct SampleRng {
    state: [u64; 4],
}

impl SampleRng {
    pub fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SampleRng { state: s }
    }

    /// Clock-seeded instance for callers that don't need reproducibility.
    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x9E3779B97F4A7C15);
        Self::new(nanos)
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform-ish index below `bound` (`bound > 0`).
    pub fn gen_range(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }
}
