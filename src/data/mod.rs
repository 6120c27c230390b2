/// Data layer: telemetry tables, loading, and run layout.
///
/// Architecture:
/// ```text
///  <root>/seed=<n>/{host,powerSource,task,service,battery}.parquet
///        │
///        ▼
///   ┌──────────┐
///   │   run     │  RunLayout → one path per DatasetKind
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset, validate kind columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ RunDatasets   │  dataset name → Dataset, looked up by the renderer
///   └──────────────┘
/// ```

pub mod loader;
pub mod model;
pub mod run;

pub use loader::{load_dataset, load_dataset_as};
pub use model::{Dataset, DatasetKind, TIMESTAMP};
pub use run::{RunDatasets, RunLayout, load_run};
