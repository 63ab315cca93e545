/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → AccidentDataset
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ AccidentDataset │  Vec<AccidentRecord>, option indices
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply selection predicates → view indices
///   └──────────┘
///        │
///        ├──────────────────┐
///        ▼                  ▼
///   ┌──────────┐      ┌───────────┐
///   │ summary   │      │ aggregate  │  headline metrics / chart tables
///   └──────────┘      └───────────┘
/// ```
///
/// `pipeline::compute` runs the filter → summary → aggregate chain once per
/// user interaction.
pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod summary;
