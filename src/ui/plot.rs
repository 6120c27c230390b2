use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::chart::RenderedSubplot;
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Stacked subplots (central panel)
// ---------------------------------------------------------------------------

/// Render the figure title and every subplot, stacked top to bottom.
pub fn chart_plots(ui: &mut Ui, state: &ViewerState) {
    let chart = &state.chart;
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(&chart.title);
    });
    ui.separator();

    if chart.subplots.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("The chart has no subplots.");
        });
        return;
    }

    let n = chart.subplots.len() as f32;
    let spacing = ui.spacing().item_spacing.y;
    let height = ((ui.available_height() - spacing * (n - 1.0)) / n).max(80.0);

    for (idx, subplot) in chart.subplots.iter().enumerate() {
        subplot_plot(ui, state, idx, subplot, height);
    }
}

fn subplot_plot(ui: &mut Ui, state: &ViewerState, idx: usize, subplot: &RenderedSubplot, height: f32) {
    Plot::new(format!("subplot_{idx}"))
        .height(height)
        .legend(Legend::default().follow_insertion_order(true))
        .x_axis_label(subplot.x_label.clone())
        .y_axis_label(subplot.y_label.clone())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (line_idx, line) in subplot.lines.iter().enumerate() {
                if !state.is_visible(idx, line_idx) {
                    continue;
                }

                // Segments sharing a name collapse into one legend entry.
                let color: Color32 = line.color.into();
                let mut segments = line.segments();
                if segments.is_empty() {
                    segments.push(Vec::new());
                }
                for segment in segments {
                    let points = PlotPoints::from(segment);
                    plot_ui.line(Line::new(points).name(&line.label).color(color).width(1.5));
                }
            }
        });
}
