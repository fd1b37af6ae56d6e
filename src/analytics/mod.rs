/// Analytics layer: KPIs and chart-ready aggregations over a filtered view.
///
/// Everything here is a pure function of the record slice it is handed; the
/// only state anywhere is the PRNG threaded into the scatter sample.
pub mod metrics;
pub mod views;

pub use views::SampleRng;
