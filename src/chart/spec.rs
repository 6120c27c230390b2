use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::DatasetKind;
use crate::error::{PlotError, Result};

pub const DEFAULT_X_LABEL: &str = "time (ms)";

fn default_x_label() -> String {
    DEFAULT_X_LABEL.to_string()
}

// ---------------------------------------------------------------------------
// Chart description
// ---------------------------------------------------------------------------

/// One column of one dataset, drawn as a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub dataset: String,
    pub column: String,
    pub label: String,
}

impl SeriesSpec {
    pub fn new(
        dataset: impl Into<String>,
        column: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            column: column.into(),
            label: label.into(),
        }
    }
}

/// Series sharing one x-axis (`timestamp`) and one y-axis label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubplotSpec {
    pub y_label: String,
    pub series: Vec<SeriesSpec>,
}

impl SubplotSpec {
    pub fn new(y_label: impl Into<String>, series: Vec<SeriesSpec>) -> Self {
        Self {
            y_label: y_label.into(),
            series,
        }
    }
}

/// A figure title plus subplots stacked top to bottom.
///
/// Chart files are JSON:
///
/// ```json
/// {
///   "title": "Battery",
///   "subplots": [
///     { "y_label": "energy usage (J)",
///       "series": [{ "dataset": "battery", "column": "energy_usage", "label": "battery" }] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    #[serde(default = "default_x_label")]
    pub x_label: String,
    pub subplots: Vec<SubplotSpec>,
}

impl ChartSpec {
    pub fn new(title: impl Into<String>, subplots: Vec<SubplotSpec>) -> Self {
        Self {
            title: title.into(),
            x_label: default_x_label(),
            subplots,
        }
    }

    /// Energy usage of the power source and battery above carbon emission
    /// and carbon intensity of the power source.
    pub fn energy_and_carbon() -> Self {
        let power = DatasetKind::PowerSource.name();
        let battery = DatasetKind::Battery.name();
        ChartSpec::new(
            "Energy Usage and Carbon Emission",
            vec![
                SubplotSpec::new(
                    "energy usage (J)",
                    vec![
                        SeriesSpec::new(power, "energy_usage", "power source energy usage"),
                        SeriesSpec::new(battery, "energy_usage", "battery energy usage"),
                    ],
                ),
                SubplotSpec::new(
                    "carbon emission (g)",
                    vec![
                        SeriesSpec::new(power, "carbon_emission", "carbon emission"),
                        SeriesSpec::new(power, "carbon_intensity", "carbon intensity"),
                    ],
                ),
            ],
        )
    }

    /// Read a chart description from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let chart_file = |reason: String| PlotError::ChartFile {
            path: path.to_path_buf(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| chart_file(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| chart_file(e.to_string()))
    }

    pub fn series(&self) -> impl Iterator<Item = &SeriesSpec> {
        self.subplots.iter().flat_map(|s| s.series.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_chart_layout() {
        let chart = ChartSpec::energy_and_carbon();
        assert_eq!(chart.x_label, "time (ms)");
        assert_eq!(chart.subplots.len(), 2);
        assert_eq!(chart.subplots[0].y_label, "energy usage (J)");
        assert_eq!(chart.subplots[1].y_label, "carbon emission (g)");
        let labels: Vec<&str> = chart.series().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            [
                "power source energy usage",
                "battery energy usage",
                "carbon emission",
                "carbon intensity"
            ]
        );
    }

    #[test]
    fn json_chart_defaults_x_label() {
        let chart: ChartSpec = serde_json::from_str(
            r#"{ "title": "t", "subplots": [{ "y_label": "y", "series": [] }] }"#,
        )
        .unwrap();
        assert_eq!(chart.x_label, DEFAULT_X_LABEL);
        assert!(chart.subplots[0].series.is_empty());
    }

    #[test]
    fn malformed_chart_file_is_chart_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ChartSpec::from_json_file(&path).unwrap_err(),
            PlotError::ChartFile { .. }
        ));
    }

    #[test]
    fn missing_chart_file_is_not_a_dataset_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = ChartSpec::from_json_file(&path).unwrap_err();
        assert!(matches!(err, PlotError::ChartFile { .. }));
        assert!(err.to_string().starts_with("cannot read chart description"));
        assert!(!err.to_string().contains("dataset"));
    }
}
