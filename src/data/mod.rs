/// Data layer: dataset types, loading, and serialization.
///
/// Architecture:
/// ```text
///  .arff / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Schema (name → index), Vec<column>, header lines
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  writer   │  Dataset → .arff
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod writer;
