use std::collections::BTreeMap;

use super::spec::{ChartSpec, SeriesSpec, SubplotSpec};
use crate::color::{SeriesColor, generate_palette};
use crate::data::Dataset;
use crate::error::{PlotError, Result};

// ---------------------------------------------------------------------------
// Rendered chart – plotted data, independent of any drawing backend
// ---------------------------------------------------------------------------

/// One plotted line: a legend label and `(timestamp, value)` points.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLine {
    pub label: String,
    pub color: SeriesColor,
    pub points: Vec<[f64; 2]>,
}

impl RenderedLine {
    /// Runs of consecutive finite points.  A NaN cell ends the current run,
    /// so the line shows a gap instead of bridging the missing sample.
    pub fn segments(&self) -> Vec<Vec<[f64; 2]>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for &[x, y] in &self.points {
            if x.is_finite() && y.is_finite() {
                current.push([x, y]);
            } else if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSubplot {
    pub x_label: String,
    pub y_label: String,
    /// Lines in legend order.
    pub lines: Vec<RenderedLine>,
}

impl RenderedSubplot {
    /// Bounding box `(x_min, x_max, y_min, y_max)` over finite points.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut finite = self
            .lines
            .iter()
            .flat_map(|l| l.points.iter())
            .filter(|[x, y]| x.is_finite() && y.is_finite())
            .peekable();
        finite.peek()?;
        Some(finite.fold(
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            |(x0, x1, y0, y1), &[x, y]| (x0.min(x), x1.max(x), y0.min(y), y1.max(y)),
        ))
    }
}

/// The result of applying a [`ChartSpec`] to a set of datasets.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub title: String,
    /// Subplots top to bottom.
    pub subplots: Vec<RenderedSubplot>,
}

impl RenderedChart {
    pub fn line_count(&self) -> usize {
        self.subplots.iter().map(|s| s.lines.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

/// Resolve every series of `spec` against `datasets` and collect its points.
///
/// Each series is drawn against the timestamps of its own dataset; nothing
/// is joined across datasets.  Fails on the first series whose dataset or
/// column cannot be found, without returning a partial chart.
pub fn render(spec: &ChartSpec, datasets: &BTreeMap<String, Dataset>) -> Result<RenderedChart> {
    let subplots = spec
        .subplots
        .iter()
        .map(|subplot| render_subplot(subplot, &spec.x_label, datasets))
        .collect::<Result<Vec<_>>>()?;

    let chart = RenderedChart {
        title: spec.title.clone(),
        subplots,
    };
    log::debug!(
        "Rendered '{}': {} subplots, {} lines",
        chart.title,
        chart.subplots.len(),
        chart.line_count()
    );
    Ok(chart)
}

fn render_subplot(
    subplot: &SubplotSpec,
    x_label: &str,
    datasets: &BTreeMap<String, Dataset>,
) -> Result<RenderedSubplot> {
    let palette = generate_palette(subplot.series.len());
    let lines = subplot
        .series
        .iter()
        .zip(palette)
        .map(|(series, color)| {
            Ok(RenderedLine {
                label: series.label.clone(),
                color,
                points: lookup_points(series, datasets)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RenderedSubplot {
        x_label: x_label.to_string(),
        y_label: subplot.y_label.clone(),
        lines,
    })
}

fn lookup_points(
    series: &SeriesSpec,
    datasets: &BTreeMap<String, Dataset>,
) -> Result<Vec<[f64; 2]>> {
    let dataset = datasets
        .get(&series.dataset)
        .ok_or_else(|| PlotError::SeriesLookup {
            dataset: series.dataset.clone(),
            column: None,
        })?;

    dataset
        .points(&series.column)
        .ok_or_else(|| PlotError::SeriesLookup {
            dataset: series.dataset.clone(),
            column: Some(series.column.clone()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datasets() -> BTreeMap<String, Dataset> {
        let power = Dataset::new(
            "powerSource",
            vec![0, 1000],
            vec![
                ("energy_usage".into(), vec![10.0, 12.0]),
                ("carbon_emission".into(), vec![0.5, 0.7]),
                ("carbon_intensity".into(), vec![100.0, 90.0]),
            ],
        )
        .unwrap();
        let battery = Dataset::new(
            "battery",
            vec![0, 1000],
            vec![("energy_usage".into(), vec![2.0, 3.0])],
        )
        .unwrap();
        BTreeMap::from([
            ("powerSource".to_string(), power),
            ("battery".to_string(), battery),
        ])
    }

    #[test]
    fn energy_subplot_scenario() {
        let chart = render(&ChartSpec::energy_and_carbon(), &datasets()).unwrap();
        assert_eq!(chart.title, "Energy Usage and Carbon Emission");
        assert_eq!(chart.subplots.len(), 2);

        let energy = &chart.subplots[0];
        assert_eq!(energy.x_label, "time (ms)");
        assert_eq!(energy.y_label, "energy usage (J)");
        assert_eq!(energy.lines.len(), 2);
        assert_eq!(energy.lines[0].label, "power source energy usage");
        assert_eq!(energy.lines[0].points, vec![[0.0, 10.0], [1000.0, 12.0]]);
        assert_eq!(energy.lines[1].label, "battery energy usage");
        assert_eq!(energy.lines[1].points, vec![[0.0, 2.0], [1000.0, 3.0]]);
        assert_ne!(energy.lines[0].color, energy.lines[1].color);
    }

    #[test]
    fn missing_dataset_is_named() {
        let spec = ChartSpec::new(
            "t",
            vec![SubplotSpec::new(
                "y",
                vec![SeriesSpec::new("missing", "energy_usage", "x")],
            )],
        );
        match render(&spec, &datasets()).unwrap_err() {
            PlotError::SeriesLookup { dataset, column } => {
                assert_eq!(dataset, "missing");
                assert_eq!(column, None);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_column_is_lookup_error() {
        let spec = ChartSpec::new(
            "t",
            vec![SubplotSpec::new(
                "y",
                vec![SeriesSpec::new("battery", "carbon_emission", "x")],
            )],
        );
        assert!(matches!(
            render(&spec, &datasets()).unwrap_err(),
            PlotError::SeriesLookup { column: Some(ref c), .. } if c == "carbon_emission"
        ));
    }

    #[test]
    fn render_is_repeatable() {
        let spec = ChartSpec::energy_and_carbon();
        let ds = datasets();
        assert_eq!(render(&spec, &ds).unwrap(), render(&spec, &ds).unwrap());
    }

    #[test]
    fn bounds_skip_nan_points() {
        let subplot = RenderedSubplot {
            x_label: "x".into(),
            y_label: "y".into(),
            lines: vec![RenderedLine {
                label: "l".into(),
                color: SeriesColor::new(0, 0, 0),
                points: vec![[0.0, 1.0], [5.0, f64::NAN], [10.0, -2.0]],
            }],
        };
        assert_eq!(subplot.bounds(), Some((0.0, 10.0, -2.0, 1.0)));

        let empty = RenderedSubplot { lines: vec![], ..subplot };
        assert_eq!(empty.bounds(), None);
    }

    #[test]
    fn nan_cells_split_a_line_into_segments() {
        let line = RenderedLine {
            label: "l".into(),
            color: SeriesColor::new(0, 0, 0),
            points: vec![
                [0.0, 1.0],
                [1.0, 2.0],
                [2.0, f64::NAN],
                [3.0, f64::NAN],
                [4.0, 5.0],
                [5.0, f64::NAN],
            ],
        };
        assert_eq!(
            line.segments(),
            vec![vec![[0.0, 1.0], [1.0, 2.0]], vec![[4.0, 5.0]]]
        );

        let all_nan = RenderedLine {
            points: vec![[0.0, f64::NAN]],
            ..line
        };
        assert!(all_nan.segments().is_empty());
    }
}
