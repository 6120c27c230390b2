use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::loader::load_dataset_as;
use super::model::{Dataset, DatasetKind};
use crate::error::Result;

/// Loaded tables keyed by dataset name (`powerSource`, `battery`, ...).
pub type RunDatasets = BTreeMap<String, Dataset>;

// ---------------------------------------------------------------------------
// RunLayout – where one simulation run's tables live
// ---------------------------------------------------------------------------

/// Output tables of a run are written to `<root>/seed=<seed>/<file>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLayout {
    pub root: PathBuf,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub files: RunFiles,
}

/// File name per telemetry table, relative to the seed directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunFiles {
    pub host: String,
    pub power_source: String,
    pub task: String,
    pub service: String,
    pub battery: String,
}

impl Default for RunFiles {
    fn default() -> Self {
        Self {
            host: DatasetKind::Host.default_file_name(),
            power_source: DatasetKind::PowerSource.default_file_name(),
            task: DatasetKind::Task.default_file_name(),
            service: DatasetKind::Service.default_file_name(),
            battery: DatasetKind::Battery.default_file_name(),
        }
    }
}

impl RunFiles {
    pub fn file_for(&self, kind: DatasetKind) -> &str {
        match kind {
            DatasetKind::Host => &self.host,
            DatasetKind::PowerSource => &self.power_source,
            DatasetKind::Task => &self.task,
            DatasetKind::Service => &self.service,
            DatasetKind::Battery => &self.battery,
        }
    }
}

impl RunLayout {
    pub fn new(root: impl Into<PathBuf>, seed: u64) -> Self {
        Self {
            root: root.into(),
            seed,
            files: RunFiles::default(),
        }
    }

    pub fn seed_dir(&self) -> PathBuf {
        self.root.join(format!("seed={}", self.seed))
    }

    pub fn path_for(&self, kind: DatasetKind) -> PathBuf {
        self.seed_dir().join(self.files.file_for(kind))
    }
}

/// Load every table of a run, in order.  Task and service tables are
/// skipped when their files are absent; any other failure aborts.
pub fn load_run(layout: &RunLayout) -> Result<RunDatasets> {
    let mut datasets = RunDatasets::new();

    for kind in DatasetKind::ALL {
        let path = layout.path_for(kind);
        if kind.is_optional() && !path.exists() {
            log::debug!("Optional {kind} table not found at {}", path.display());
            continue;
        }
        let dataset = load_dataset_as(&path, kind)?;
        datasets.insert(kind.name().to_string(), dataset);
    }

    log::info!(
        "Loaded {} tables from {}",
        datasets.len(),
        layout.seed_dir().display()
    );
    Ok(datasets)
}
