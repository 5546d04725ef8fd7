use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::{export, loader};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Clone what we need so we can mutate state inside the widgets.
    let date_col = state.schema.date.clone();
    let cat_col = state.schema.category.clone();
    let numeric_cols = state.schema.numeric.clone();
    let cat_labels = cat_col
        .as_deref()
        .map(|col| dataset.labels(col))
        .unwrap_or_default();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Date window ----
            if date_col.is_some() {
                ui.strong("Date range");
                if let (Some(mut start), Some(mut end)) =
                    (state.criteria.start_date, state.criteria.end_date)
                {
                    ui.horizontal(|ui: &mut Ui| {
                        ui.label("From");
                        if ui
                            .add(DatePickerButton::new(&mut start).id_salt("start_date"))
                            .changed()
                        {
                            state.criteria.start_date = Some(start);
                        }
                    });
                    ui.horizontal(|ui: &mut Ui| {
                        ui.label("To");
                        if ui
                            .add(DatePickerButton::new(&mut end).id_salt("end_date"))
                            .changed()
                        {
                            state.criteria.end_date = Some(end);
                        }
                    });
                    if ui.small_button("Reset to full range").clicked() {
                        state.reset_dates();
                    }
                } else {
                    ui.label("No parseable dates in this file.");
                }
                ui.separator();
            }

            // ---- Category allow-list ----
            if let Some(col) = &cat_col {
                let n_selected = state.criteria.categories.len();
                let n_total = cat_labels.len();
                let header_text = format!("{col}  ({n_selected}/{n_total})");

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col)
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all_categories();
                            }
                            if ui.small_button("None").clicked() {
                                state.select_no_categories();
                            }
                        });

                        for label in &cat_labels {
                            let mut checked = state.criteria.categories.contains(label);
                            let mut text = RichText::new(label);
                            if let Some(cm) = &state.color_map {
                                text = text.color(cm.color_for(label));
                            }
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_category(label);
                            }
                        }
                    });
                ui.separator();
            }

            // ---- Top-N ----
            ui.strong("Top N categories");
            ui.add(egui::Slider::new(&mut state.top_n, 1..=20));
            ui.separator();

            // ---- KPI measure ----
            if !numeric_cols.is_empty() {
                ui.strong("Measure");
                for col in &numeric_cols {
                    ui.radio_value(&mut state.measure_column, Some(col.clone()), col);
                }
            }
        });

    // Recompute visible indices after any widget changes.
    state.refilter();
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
            let can_export = state.dataset.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows loaded, {} after filters",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open challan data")
        .add_filter("Supported files", &["csv", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        match loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows with columns {:?}",
                    dataset.len(),
                    dataset.column_names
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
                state.loading = false;
            }
        }
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };

    let file = rfd::FileDialog::new()
        .set_title("Export filtered data")
        .set_file_name("echallan_filtered.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match export::write_csv_file(dataset, &state.visible_indices, &path) {
            Ok(()) => {
                log::info!(
                    "Exported {} rows to {}",
                    state.visible_indices.len(),
                    path.display()
                );
                state.status_message = Some(format!(
                    "Exported {} rows to {}",
                    state.visible_indices.len(),
                    path.display()
                ));
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Export error: {e:#}"));
            }
        }
    }
}
