use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PlotError, Result};

/// Name of the column every dataset must carry (integer milliseconds).
pub const TIMESTAMP: &str = "timestamp";

// ---------------------------------------------------------------------------
// DatasetKind – the telemetry tables a simulation run writes
// ---------------------------------------------------------------------------

/// One kind of telemetry table, with its canonical name and the numeric
/// columns a chart may rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DatasetKind {
    Host,
    PowerSource,
    Task,
    Service,
    Battery,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 5] = [
        DatasetKind::Host,
        DatasetKind::PowerSource,
        DatasetKind::Task,
        DatasetKind::Service,
        DatasetKind::Battery,
    ];

    /// Name under which the dataset is registered for chart lookups.
    pub fn name(self) -> &'static str {
        match self {
            DatasetKind::Host => "host",
            DatasetKind::PowerSource => "powerSource",
            DatasetKind::Task => "task",
            DatasetKind::Service => "service",
            DatasetKind::Battery => "battery",
        }
    }

    pub fn default_file_name(self) -> String {
        format!("{}.parquet", self.name())
    }

    /// Columns (besides `timestamp`) validated when the table is loaded.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            DatasetKind::PowerSource => &["energy_usage", "carbon_emission", "carbon_intensity"],
            DatasetKind::Battery => &["energy_usage"],
            DatasetKind::Host | DatasetKind::Task | DatasetKind::Service => &[],
        }
    }

    /// Task and service tables are written by every run but not plotted.
    pub fn is_optional(self) -> bool {
        matches!(self, DatasetKind::Task | DatasetKind::Service)
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Dataset – one loaded table
// ---------------------------------------------------------------------------

/// A named table: a `timestamp` column plus numeric columns aligned with it
/// by row position.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub name: String,
    timestamps: Vec<i64>,
    /// Column names in source order (excludes `timestamp`).
    column_names: Vec<String>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl Dataset {
    /// Build a dataset, checking that every column has one value per row.
    pub fn new(
        name: impl Into<String>,
        timestamps: Vec<i64>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self> {
        let name = name.into();
        Self::from_columns(name.clone(), timestamps, columns)
            .map_err(|e| PlotError::format(&name, e))
    }

    /// Alignment check without an error kind, for loaders that attach the
    /// file path themselves.
    pub(crate) fn from_columns(
        name: String,
        timestamps: Vec<i64>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> anyhow::Result<Self> {
        let mut column_names = Vec::with_capacity(columns.len());
        let mut by_name = BTreeMap::new();

        for (col, values) in columns {
            if col == TIMESTAMP {
                continue;
            }
            if values.len() != timestamps.len() {
                anyhow::bail!(
                    "column '{col}' has {} values but '{TIMESTAMP}' has {}",
                    values.len(),
                    timestamps.len()
                );
            }
            if by_name.insert(col.clone(), values).is_none() {
                column_names.push(col);
            }
        }

        Ok(Dataset {
            name,
            timestamps,
            column_names,
            columns: by_name,
        })
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn has_column(&self, name: &str) -> bool {
        name == TIMESTAMP || self.columns.contains_key(name)
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Check the columns `kind` requires, failing on the first one absent.
    pub fn validate(&self, kind: DatasetKind) -> Result<()> {
        for &col in kind.required_columns() {
            if !self.has_column(col) {
                return Err(PlotError::MissingColumn {
                    dataset: self.name.clone(),
                    column: col.to_string(),
                });
            }
        }
        Ok(())
    }

    /// `(timestamp, value)` pairs for one column.
    pub fn points(&self, column: &str) -> Option<Vec<[f64; 2]>> {
        let values = self.column(column)?;
        Some(
            self.timestamps
                .iter()
                .zip(values)
                .map(|(&t, &v)| [t as f64, v])
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn battery() -> Dataset {
        Dataset::new(
            "battery",
            vec![0, 1000],
            vec![("energy_usage".into(), vec![2.0, 3.0])],
        )
        .unwrap()
    }

    #[test]
    fn points_pair_timestamps_with_values() {
        let ds = battery();
        assert_eq!(
            ds.points("energy_usage").unwrap(),
            vec![[0.0, 2.0], [1000.0, 3.0]]
        );
        assert!(ds.points("charge").is_none());
    }

    #[test]
    fn rejects_misaligned_columns() {
        let err = Dataset::new("x", vec![0, 1], vec![("a".into(), vec![1.0])]).unwrap_err();
        assert!(matches!(err, PlotError::DatasetFormat { .. }));

        // Loaders wrap this message with the file path, so it carries no
        // prefix of its own.
        let err = Dataset::from_columns("x".into(), vec![0, 1], vec![("a".into(), vec![1.0])])
            .unwrap_err();
        assert_eq!(err.to_string(), "column 'a' has 1 values but 'timestamp' has 2");
    }

    #[test]
    fn validate_reports_first_missing_column() {
        let err = battery().validate(DatasetKind::PowerSource).unwrap_err();
        match err {
            PlotError::MissingColumn { dataset, column } => {
                assert_eq!(dataset, "battery");
                assert_eq!(column, "carbon_emission");
            }
            other => panic!("unexpected error: {other}"),
        }
        battery().validate(DatasetKind::Battery).unwrap();
    }

    #[test]
    fn timestamp_counts_as_present() {
        let ds = battery();
        assert!(ds.has_column(TIMESTAMP));
        assert_eq!(ds.column_names(), ["energy_usage".to_string()]);
    }
}
