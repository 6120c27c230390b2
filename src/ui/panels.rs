use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Left side panel – series visibility
// ---------------------------------------------------------------------------

/// Render the left panel with one checkbox per plotted line.
pub fn side_panel(ui: &mut Ui, state: &mut ViewerState) {
    ui.heading("Series");
    ui.separator();

    // Labels and colours are copied out so `state` can be mutated below.
    let subplots: Vec<(String, Vec<(String, Color32)>)> = state
        .chart
        .subplots
        .iter()
        .map(|sp| {
            let lines = sp
                .lines
                .iter()
                .map(|l| (l.label.clone(), Color32::from(l.color)))
                .collect();
            (sp.y_label.clone(), lines)
        })
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (s, (y_label, lines)) in subplots.iter().enumerate() {
                let n_visible = (0..lines.len()).filter(|&l| state.is_visible(s, l)).count();
                let header_text = format!("{y_label}  ({n_visible}/{})", lines.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(("subplot", s))
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.show_all(s);
                            }
                            if ui.small_button("None").clicked() {
                                state.hide_all(s);
                            }
                        });

                        for (l, (label, color)) in lines.iter().enumerate() {
                            let mut checked = state.is_visible(s, l);
                            let text = RichText::new(label).color(*color);
                            if ui.checkbox(&mut checked, text).changed() {
                                state.set_visible(s, l, checked);
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export…").clicked() {
                export_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Close").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} subplots, {} lines",
            state.chart.subplots.len(),
            state.chart.line_count()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn export_file_dialog(state: &mut ViewerState) {
    let file = rfd::FileDialog::new()
        .set_title("Export chart")
        .set_file_name("chart.png")
        .add_filter("PNG image", &["png"])
        .add_filter("SVG image", &["svg"])
        .save_file();

    if let Some(path) = file {
        match state.export_visible(&path) {
            Ok(()) => log::info!("Exported chart to {}", path.display()),
            Err(e) => log::error!("Failed to export chart: {e}"),
        }
    }
}
