/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (derived columns computed once)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<ShipmentRecord>, per-dimension value index
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  conjunction of set-membership predicates → filtered view
///   └──────────┘
/// ```
pub mod filter;
pub mod loader;
pub mod model;
