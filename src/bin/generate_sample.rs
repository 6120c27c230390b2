use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use sim_plot::{DatasetKind, RunLayout};

/// Write a synthetic one-day simulation run (host, powerSource, task,
/// service and battery tables) for trying out `sim-plot`.
#[derive(Debug, Parser)]
#[command(name = "generate-sample", about)]
struct Args {
    /// Output root; tables go to `<root>/seed=<seed>/`
    #[arg(default_value = "sample-output")]
    root: PathBuf,

    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Sampling interval in milliseconds
    #[arg(long, default_value_t = 300_000)]
    interval_ms: i64,

    /// Number of samples per table
    #[arg(long, default_value_t = 288)]
    samples: usize,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

// ---------------------------------------------------------------------------
// Simulated run
// ---------------------------------------------------------------------------

const BATTERY_CAPACITY_J: f64 = 3.6e7;
const BATTERY_RATE_W: f64 = 400.0;
const J_PER_KWH: f64 = 3.6e6;

/// Battery states as the simulator encodes them.
const STATE_IDLE: i32 = 0;
const STATE_CHARGING: i32 = 1;
const STATE_DISCHARGING: i32 = 2;

#[derive(Default)]
struct Run {
    timestamps: Vec<i64>,
    host_power: Vec<f64>,
    host_energy: Vec<f64>,
    cpu_utilization: Vec<f64>,
    source_power: Vec<f64>,
    source_energy: Vec<f64>,
    carbon_intensity: Vec<f64>,
    carbon_emission: Vec<f64>,
    battery_power: Vec<f64>,
    battery_energy: Vec<f64>,
    battery_charge: Vec<f64>,
    battery_state: Vec<i32>,
    tasks_active: Vec<i32>,
}

fn simulate(args: &Args) -> Run {
    let mut rng = SimpleRng::new(42 ^ args.seed);
    let dt_s = args.interval_ms as f64 / 1000.0;
    let day_ms = 86_400_000.0;
    let mut charge = BATTERY_CAPACITY_J / 2.0;
    let mut run = Run::default();

    for i in 0..args.samples {
        let t = i as i64 * args.interval_ms;
        let phase = 2.0 * std::f64::consts::PI * (t as f64 / day_ms);

        let utilization = (0.5 + 0.3 * (phase - 1.5).sin() + rng.gauss(0.0, 0.05)).clamp(0.0, 1.0);
        let host_power = 200.0 + 150.0 * utilization;
        let intensity = (200.0 + 80.0 * (phase + 0.8).cos() + rng.gauss(0.0, 5.0)).max(10.0);

        // Charge while the grid is clean, discharge while it is dirty.
        let (battery_power, state) = if intensity < 170.0 && charge < BATTERY_CAPACITY_J {
            (BATTERY_RATE_W, STATE_CHARGING)
        } else if intensity > 230.0 && charge > 0.0 {
            (BATTERY_RATE_W.min(host_power), STATE_DISCHARGING)
        } else {
            (0.0, STATE_IDLE)
        };
        let battery_energy = battery_power * dt_s;
        charge = match state {
            STATE_CHARGING => (charge + battery_energy).min(BATTERY_CAPACITY_J),
            STATE_DISCHARGING => (charge - battery_energy).max(0.0),
            _ => charge,
        };

        let source_power = match state {
            STATE_CHARGING => host_power + battery_power,
            STATE_DISCHARGING => host_power - battery_power,
            _ => host_power,
        };
        let source_energy = source_power * dt_s;

        run.timestamps.push(t);
        run.cpu_utilization.push(utilization);
        run.host_power.push(host_power);
        run.host_energy.push(host_power * dt_s);
        run.source_power.push(source_power);
        run.source_energy.push(source_energy);
        run.carbon_intensity.push(intensity);
        run.carbon_emission.push(source_energy / J_PER_KWH * intensity);
        run.battery_power.push(battery_power);
        run.battery_energy.push(battery_energy);
        run.battery_charge.push(charge);
        run.battery_state.push(state);
        run.tasks_active.push((utilization * 20.0).round() as i32);
    }
    run
}

// ---------------------------------------------------------------------------
// Parquet output
// ---------------------------------------------------------------------------

fn write_table(path: &Path, columns: Vec<(&str, ArrayRef)>) -> Result<()> {
    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, arr)| Field::new(*name, arr.data_type().clone(), false))
            .collect::<Vec<_>>(),
    ));
    let batch = RecordBatch::try_new(schema.clone(), columns.into_iter().map(|(_, a)| a).collect())
        .context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn repeat_str(value: &str, n: usize) -> ArrayRef {
    Arc::new(StringArray::from(vec![value; n]))
}

fn f64s(values: &[f64]) -> ArrayRef {
    Arc::new(Float64Array::from(values.to_vec()))
}

fn i32s(values: &[i32]) -> ArrayRef {
    Arc::new(Int32Array::from(values.to_vec()))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let layout = RunLayout::new(&args.root, args.seed);
    std::fs::create_dir_all(layout.seed_dir())
        .with_context(|| format!("creating {}", layout.seed_dir().display()))?;

    let run = simulate(&args);
    let n = run.timestamps.len();
    let ts = || -> ArrayRef { Arc::new(Int64Array::from(run.timestamps.clone())) };

    write_table(
        &layout.path_for(DatasetKind::Host),
        vec![
            ("timestamp", ts()),
            ("host_id", repeat_str("host-0", n)),
            ("cpu_utilization", f64s(&run.cpu_utilization)),
            ("power_draw", f64s(&run.host_power)),
            ("energy_usage", f64s(&run.host_energy)),
        ],
    )?;
    write_table(
        &layout.path_for(DatasetKind::PowerSource),
        vec![
            ("timestamp", ts()),
            ("power_source_id", repeat_str("grid-0", n)),
            ("hosts_connected", i32s(&vec![1; n])),
            ("power_draw", f64s(&run.source_power)),
            ("energy_usage", f64s(&run.source_energy)),
            ("carbon_intensity", f64s(&run.carbon_intensity)),
            ("carbon_emission", f64s(&run.carbon_emission)),
        ],
    )?;
    write_table(
        &layout.path_for(DatasetKind::Battery),
        vec![
            ("timestamp", ts()),
            ("battery_id", repeat_str("battery-0", n)),
            ("power_draw", f64s(&run.battery_power)),
            ("energy_usage", f64s(&run.battery_energy)),
            ("current_capacity", f64s(&run.battery_charge)),
            ("battery_state", i32s(&run.battery_state)),
        ],
    )?;
    write_table(
        &layout.path_for(DatasetKind::Task),
        vec![
            ("timestamp", ts()),
            ("task_id", repeat_str("task-0", n)),
            ("cpu_usage", f64s(&run.cpu_utilization)),
        ],
    )?;
    write_table(
        &layout.path_for(DatasetKind::Service),
        vec![
            ("timestamp", ts()),
            ("hosts_up", i32s(&vec![1; n])),
            ("tasks_active", i32s(&run.tasks_active)),
        ],
    )?;

    println!("Wrote {n} samples per table to {}", layout.seed_dir().display());
    Ok(())
}
