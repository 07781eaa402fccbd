/// Data layer: core types, loading, derivation, and sanitization.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → EmissionDataset
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────┐
///   │ EmissionDataset  │  Vec<EmissionRow>, year index
///   └─────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  derive   │  year filter + grouping + top-K → Vec<FlowEdge>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ sanitize  │  self-loops, dedup, threshold → FlowGraph
///   └──────────┘
/// ```

pub mod continents;
pub mod derive;
pub mod error;
pub mod loader;
pub mod model;
pub mod sanitize;
