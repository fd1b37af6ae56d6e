//! Delivery-performance reporting over shipment records.
//!
//! Load a shipment table once, filter it by market / shipping mode /
//! customer segment, and derive KPIs plus chart-ready aggregations from the
//! filtered view.  Every operation is pure and synchronous; the only cached
//! state is the loader's per-source memoization inside
//! [`data::loader::LoaderCache`].

pub mod analytics;
pub mod data;
pub mod error;
pub mod export;
pub mod report;
pub mod session;
