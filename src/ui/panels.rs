use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::{CategoryDim, FlagDim};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter controls
// ---------------------------------------------------------------------------

/// Render the left filter panel: one control per filter dimension.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds.clone(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Categorical dropdowns ----
            for dim in CategoryDim::ALL {
                let Some(values) = dataset.options.get(&dim) else {
                    continue;
                };
                let current = state.selection.category(dim).map(str::to_string);

                ui.label(dim.label());
                egui::ComboBox::from_id_salt(dim.label())
                    .width(ui.available_width() * 0.9)
                    .selected_text(current.clone().unwrap_or_else(|| "All".to_string()))
                    .show_ui(ui, |ui: &mut Ui| {
                        if ui.selectable_label(current.is_none(), "All").clicked() {
                            state.set_category(dim, None);
                        }
                        for value in values {
                            let selected = current.as_deref() == Some(value.as_str());
                            if ui.selectable_label(selected, value).clicked() {
                                state.set_category(dim, Some(value.clone()));
                            }
                        }
                    });
                ui.add_space(6.0);
            }

            ui.separator();

            // ---- Yes/No selectors ----
            for dim in FlagDim::ALL {
                let current = state.selection.flag(dim);
                ui.label(dim.label());
                ui.horizontal(|ui: &mut Ui| {
                    if ui.selectable_label(current.is_none(), "All").clicked() {
                        state.set_flag(dim, None);
                    }
                    if ui.selectable_label(current == Some(true), "Yes").clicked() {
                        state.set_flag(dim, Some(true));
                    }
                    if ui.selectable_label(current == Some(false), "No").clicked() {
                        state.set_flag(dim, Some(false));
                    }
                });
                ui.add_space(6.0);
            }

            ui.separator();

            // ---- Obstacle-count range ----
            let (min, max) = dataset.obstacle_bounds;
            let (mut lo, mut hi) = state.selection.obstacles().unwrap_or((min, max));
            ui.label("Number of Traffic Obstacles");
            ui.horizontal(|ui: &mut Ui| {
                let lo_changed = ui
                    .add(egui::DragValue::new(&mut lo).range(min..=hi))
                    .changed();
                ui.label("to");
                let hi_changed = ui
                    .add(egui::DragValue::new(&mut hi).range(lo..=max))
                    .changed();
                if lo_changed || hi_changed {
                    state.set_obstacles(lo, hi);
                }
            });
            ui.add_space(10.0);

            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} accidents loaded, {} matching",
                ds.len(),
                state.frame.metrics.total
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open accident data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
