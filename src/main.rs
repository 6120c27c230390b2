use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sim_plot::chart::DEFAULT_SIZE;
use sim_plot::data::run::RunFiles;
use sim_plot::{ChartSpec, RunLayout, display, export, load_run, render};

/// Plot energy usage and carbon emission of a simulation run.
#[derive(Debug, Parser)]
#[command(name = "sim-plot", version, about)]
struct Cli {
    /// Simulation output directory (contains `seed=<N>/`)
    root: PathBuf,

    /// Seed index of the run to plot
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// JSON chart description; defaults to the energy/carbon chart
    #[arg(short, long)]
    chart: Option<PathBuf>,

    /// Write a PNG or SVG instead of opening the viewer
    #[arg(short = 'o', long = "export")]
    export: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_SIZE.0)]
    width: u32,

    #[arg(long, default_value_t = DEFAULT_SIZE.1)]
    height: u32,

    #[arg(long)]
    host_file: Option<String>,
    #[arg(long)]
    power_source_file: Option<String>,
    #[arg(long)]
    task_file: Option<String>,
    #[arg(long)]
    service_file: Option<String>,
    #[arg(long)]
    battery_file: Option<String>,
}

impl Cli {
    fn layout(&self) -> RunLayout {
        let defaults = RunFiles::default();
        let pick = |over: &Option<String>, default: String| over.clone().unwrap_or(default);
        RunLayout {
            root: self.root.clone(),
            seed: self.seed,
            files: RunFiles {
                host: pick(&self.host_file, defaults.host),
                power_source: pick(&self.power_source_file, defaults.power_source),
                task: pick(&self.task_file, defaults.task),
                service: pick(&self.service_file, defaults.service),
                battery: pick(&self.battery_file, defaults.battery),
            },
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let spec = match &cli.chart {
        Some(path) => ChartSpec::from_json_file(path).context("loading chart description")?,
        None => ChartSpec::energy_and_carbon(),
    };

    let layout = cli.layout();
    let datasets = load_run(&layout)
        .with_context(|| format!("loading run from {}", layout.seed_dir().display()))?;
    let chart = render(&spec, &datasets).context("rendering chart")?;

    match &cli.export {
        Some(path) => export(&chart, path, (cli.width, cli.height))?,
        None => display(chart)?,
    }
    Ok(())
}
