//! Load the telemetry tables of a power/carbon simulation run and plot them
//! as stacked time-series subplots, on screen or to an image file.
//!
//! ```no_run
//! use sim_plot::{ChartSpec, RunLayout, load_run, render};
//!
//! let datasets = load_run(&RunLayout::new("output/simple/raw-output/0", 0))?;
//! let chart = render(&ChartSpec::energy_and_carbon(), &datasets)?;
//! sim_plot::display(chart)?;
//! # Ok::<(), sim_plot::PlotError>(())
//! ```

pub mod app;
pub mod chart;
pub mod color;
pub mod data;
pub mod error;
pub mod state;
pub mod ui;

pub use app::display;
pub use chart::{ChartSpec, RenderedChart, SeriesSpec, SubplotSpec, export, render};
pub use data::{Dataset, DatasetKind, RunDatasets, RunLayout, load_dataset, load_dataset_as, load_run};
pub use error::PlotError;
