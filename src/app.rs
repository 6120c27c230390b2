use eframe::egui;

use crate::chart::RenderedChart;
use crate::error::{PlotError, Result};
use crate::state::ViewerState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ChartViewerApp {
    pub state: ViewerState,
}

impl ChartViewerApp {
    pub fn new(chart: RenderedChart) -> Self {
        Self {
            state: ViewerState::new(chart),
        }
    }
}

impl eframe::App for ChartViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: series toggles ----
        egui::SidePanel::left("series_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: stacked subplots ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::chart_plots(ui, &self.state);
        });
    }
}

// ---------------------------------------------------------------------------
// display
// ---------------------------------------------------------------------------

/// Show `chart` in a native window and block until the window is closed.
pub fn display(chart: RenderedChart) -> Result<()> {
    let title = chart.title.clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(&title)
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    log::info!("Opening viewer for '{title}'");
    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(ChartViewerApp::new(chart)))),
    )
    .map_err(|e| PlotError::Display(e.to_string()))
}
