/// Chart layer: description, rendering, and image export.
///
/// ```text
///   ChartSpec ──┐
///               ├─ render ──▶ RenderedChart ──┬─ export  (PNG / SVG)
///   Datasets ───┘                             └─ display (viewer window)
/// ```

pub mod export;
pub mod render;
pub mod spec;

pub use export::{DEFAULT_SIZE, export};
pub use render::{RenderedChart, RenderedLine, RenderedSubplot, render};
pub use spec::{ChartSpec, DEFAULT_X_LABEL, SeriesSpec, SubplotSpec};
