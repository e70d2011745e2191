// src/ui/inspections.rs
use chrono::Local;
use eframe::egui;

use crate::api::ApiRequest;
use crate::state::{AppState, DialogState, Screen};

use super::widgets::{empty_hint, status_badge};

pub fn show_inspections_view(ui: &mut egui::Ui, state: &mut AppState) {
    let Some(transformer_no) = state.inspections.transformer_no.clone() else {
        empty_hint(ui, "Pick a transformer to see its inspections");
        return;
    };

    ui.horizontal(|ui| {
        ui.heading(format!("Inspections — {transformer_no}"));
        if ui.button("➕ Add Inspection").clicked() {
            state.current_dialog = DialogState::NewInspection {
                transformer_no: transformer_no.clone(),
                branch: String::new(),
                date: Local::now().format("%Y-%m-%d").to_string(),
                time: Local::now().format("%H:%M:%S").to_string(),
                error: None,
            };
        }
        if state.inspections.loading {
            ui.spinner();
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("⬅ Transformers").clicked() {
                state.current_screen = Screen::Transformers;
            }
        });
    });

    show_baseline_banner(ui, state, &transformer_no);
    ui.add_space(8.0);
    ui.separator();
    ui.add_space(4.0);

    let rows = state.inspections.rows.clone();
    egui::Grid::new("inspections_grid")
        .num_columns(5)
        .striped(true)
        .spacing([16.0, 6.0])
        .show(ui, |ui| {
            ui.strong("Inspection No");
            ui.strong("Inspected Date");
            ui.strong("Maintenance Date");
            ui.strong("Status");
            ui.strong("Action");
            ui.end_row();

            for inspection in &rows {
                ui.horizontal(|ui| {
                    let star = if inspection.favorite { "★" } else { "☆" };
                    if ui.small_button(star).clicked() {
                        state
                            .inspections
                            .toggle_favorite(&inspection.inspection_no);
                    }
                    ui.label(&inspection.inspection_no);
                });
                ui.label(inspection.inspected_at());
                ui.label(inspection.maintenance_date.as_deref().unwrap_or("-"));
                status_badge(ui, inspection.status);
                if ui.button("View").clicked() {
                    state.comparison.open(
                        inspection.inspection_no.clone(),
                        inspection.transformer_no.clone(),
                    );
                    state.api.send(ApiRequest::FetchComparison {
                        inspection_no: inspection.inspection_no.clone(),
                    });
                    state.current_screen = Screen::Comparison;
                }
                ui.end_row();
            }
        });

    if rows.is_empty() && !state.inspections.loading {
        ui.add_space(24.0);
        empty_hint(ui, "No inspections found.");
    }
}

/// One line about the transformer's baseline set, with upload/delete actions.
fn show_baseline_banner(ui: &mut egui::Ui, state: &mut AppState, transformer_no: &str) {
    ui.add_space(4.0);
    ui.horizontal(|ui| {
        match &state.inspections.baseline {
            Some(set) => {
                ui.label(format!("Baseline images: {}", set.attribution.caption()));
                if ui.small_button("🗑 Delete baseline").clicked() {
                    state.api.send(ApiRequest::DeleteBaseline {
                        transformer_no: transformer_no.to_string(),
                    });
                }
            }
            None => {
                ui.label(egui::RichText::new("No baseline images uploaded yet").weak());
            }
        }
        if ui.small_button("📷 Upload baseline").clicked() {
            state.current_dialog = DialogState::BaselineUpload {
                transformer_no: transformer_no.to_string(),
                slots: Box::default(),
                error: None,
            };
        }
    });
}
