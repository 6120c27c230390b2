use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use super::render::{RenderedChart, RenderedSubplot};
use crate::error::{PlotError, Result};

/// Pixel size used when the caller does not pick one.
pub const DEFAULT_SIZE: (u32, u32) = (1200, 800);

type DrawResult<DB> = std::result::Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Write `chart` to an image file.  The format follows the extension:
/// `.png` (bitmap) or `.svg`.
///
/// The image is drawn into a temporary file next to `path` and moved into
/// place only once drawing succeeded, so a failed export never leaves a
/// partial image behind.
pub fn export(chart: &RenderedChart, path: &Path, size: (u32, u32)) -> Result<()> {
    if size.0 == 0 || size.1 == 0 {
        return Err(PlotError::export(path, format!("invalid image size {}x{}", size.0, size.1)));
    }
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(PlotError::export(
            path,
            format!("directory {} does not exist", dir.display()),
        ));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "png" && ext != "svg" {
        return Err(PlotError::export(
            path,
            format!("unsupported image format: .{ext}"),
        ));
    }

    // The bitmap encoder picks its format from the suffix.
    let tmp = tempfile::Builder::new()
        .prefix(".sim-plot-")
        .suffix(&format!(".{ext}"))
        .tempfile_in(dir)
        .map_err(|e| PlotError::export(path, e))?;

    if ext == "png" {
        draw_into(chart, BitMapBackend::new(tmp.path(), size)).map_err(|e| PlotError::export(path, e))?;
    } else {
        draw_into(chart, SVGBackend::new(tmp.path(), size)).map_err(|e| PlotError::export(path, e))?;
    }

    tmp.persist(path).map_err(|e| PlotError::export(path, e.error))?;
    log::info!("Exported '{}' to {}", chart.title, path.display());
    Ok(())
}

/// Draw and flush through `backend`, which is dropped before returning.
fn draw_into<DB: DrawingBackend>(chart: &RenderedChart, backend: DB) -> DrawResult<DB> {
    let root = backend.into_drawing_area();
    draw_chart(chart, &root)?;
    root.present()
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

fn draw_chart<DB: DrawingBackend>(chart: &RenderedChart, root: &DrawingArea<DB, Shift>) -> DrawResult<DB> {
    root.fill(&WHITE)?;
    let body = root.titled(&chart.title, ("sans-serif", 28.0))?;

    if chart.subplots.is_empty() {
        return Ok(());
    }
    let panels = body.split_evenly((chart.subplots.len(), 1));
    for (subplot, panel) in chart.subplots.iter().zip(panels.iter()) {
        draw_subplot(subplot, panel)?;
    }
    Ok(())
}

fn draw_subplot<DB: DrawingBackend>(subplot: &RenderedSubplot, area: &DrawingArea<DB, Shift>) -> DrawResult<DB> {
    let (x_min, x_max, y_min, y_max) = subplot.bounds().unwrap_or((0.0, 1.0, 0.0, 1.0));
    let (x_min, x_max) = padded(x_min, x_max, 0.0);
    let (y_min, y_max) = padded(y_min, y_max, 0.05);

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(subplot.x_label.as_str())
        .y_desc(subplot.y_label.as_str())
        .draw()?;

    for line in &subplot.lines {
        let color: RGBColor = line.color.into();
        let mut segments = line.segments().into_iter();

        // The first segment (possibly empty) carries the legend entry.
        let first = segments.next().unwrap_or_default();
        chart
            .draw_series(LineSeries::new(first.into_iter().map(|[x, y]| (x, y)), color.stroke_width(2)))?
            .label(line.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

        for segment in segments {
            chart.draw_series(LineSeries::new(segment.into_iter().map(|[x, y]| (x, y)), color.stroke_width(2)))?;
        }
    }

    if !subplot.lines.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

/// Widen `[lo, hi]` by `frac` of its span; a zero span gets a unit margin.
fn padded(lo: f64, hi: f64, frac: f64) -> (f64, f64) {
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    (lo - span * frac, hi + span * frac)
}
