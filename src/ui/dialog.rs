// src/ui/dialog.rs
use eframe::egui;

use crate::api::{ApiRequest, NewInspection, NewTransformer};
use crate::model::TransformerType;
use crate::state::{AppState, DialogState};

use super::baseline;

/// Render whichever dialog is open. The dialog value is taken out of the
/// state for the duration of the frame so confirm handlers can mutate the
/// rest of the state freely.
pub fn show_dialogs(ctx: &egui::Context, state: &mut AppState) {
    let dialog = std::mem::replace(&mut state.current_dialog, DialogState::None);
    let keep = match dialog {
        DialogState::None => DialogState::None,
        DialogState::NewTransformer {
            region,
            number,
            pole,
            transformer_type,
            location,
            error,
        } => show_new_transformer(
            ctx,
            state,
            region,
            number,
            pole,
            transformer_type,
            location,
            error,
        ),
        DialogState::NewInspection {
            transformer_no,
            branch,
            date,
            time,
            error,
        } => show_new_inspection(ctx, state, transformer_no, branch, date, time, error),
        DialogState::BaselineUpload {
            transformer_no,
            slots,
            error,
        } => baseline::show_baseline_dialog(ctx, state, transformer_no, slots, error),
        DialogState::Settings {
            base_url,
            operator,
            page_size,
        } => show_settings(ctx, state, base_url, operator, page_size),
    };
    // A confirm handler may already have opened a different dialog.
    if matches!(state.current_dialog, DialogState::None) {
        state.current_dialog = keep;
    }
}

#[allow(clippy::too_many_arguments)]
fn show_new_transformer(
    ctx: &egui::Context,
    state: &mut AppState,
    mut region: String,
    mut number: String,
    mut pole: String,
    mut transformer_type: Option<TransformerType>,
    mut location: String,
    mut error: Option<String>,
) -> DialogState {
    let mut open = true;
    let mut submitted = false;

    egui::Window::new("Add Transformer")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            egui::Grid::new("new_transformer_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Region:");
                    ui.add(egui::TextEdit::singleline(&mut region).hint_text("e.g. Nugegoda"));
                    ui.end_row();

                    ui.label("Transformer No:");
                    ui.text_edit_singleline(&mut number);
                    ui.end_row();

                    ui.label("Pole No:");
                    ui.text_edit_singleline(&mut pole);
                    ui.end_row();

                    ui.label("Type:");
                    egui::ComboBox::from_id_source("new_transformer_type")
                        .selected_text(
                            transformer_type.map(|t| t.as_str()).unwrap_or("Select Type"),
                        )
                        .show_ui(ui, |ui| {
                            for variant in TransformerType::ALL {
                                ui.selectable_value(
                                    &mut transformer_type,
                                    Some(variant),
                                    variant.as_str(),
                                );
                            }
                        });
                    ui.end_row();

                    ui.label("Location Details:");
                    ui.text_edit_singleline(&mut location);
                    ui.end_row();
                });

            if let Some(message) = &error {
                ui.colored_label(egui::Color32::RED, message);
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    open = false;
                }
                if ui.button("Confirm").clicked() {
                    let all_filled = !region.trim().is_empty()
                        && !number.trim().is_empty()
                        && !pole.trim().is_empty()
                        && !location.trim().is_empty()
                        && transformer_type.is_some();
                    if all_filled {
                        submitted = true;
                    } else {
                        error = Some("All fields are required.".to_string());
                    }
                }
            });
        });

    if submitted {
        state.api.send(ApiRequest::CreateTransformer(NewTransformer {
            transformer_no: number.trim().to_string(),
            transformer_pole_no: pole.trim().to_string(),
            transformer_region: region.trim().to_string(),
            transformer_type: transformer_type
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
            transformer_location: location.trim().to_string(),
        }));
        return DialogState::None;
    }
    if !open {
        return DialogState::None;
    }
    DialogState::NewTransformer {
        region,
        number,
        pole,
        transformer_type,
        location,
        error,
    }
}

fn show_new_inspection(
    ctx: &egui::Context,
    state: &mut AppState,
    transformer_no: String,
    mut branch: String,
    mut date: String,
    mut time: String,
    mut error: Option<String>,
) -> DialogState {
    let mut open = true;
    let mut submitted = false;

    egui::Window::new("Add New Inspection")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new("Enter the details for the new transformer inspection.")
                    .weak(),
            );
            ui.add_space(8.0);
            egui::Grid::new("new_inspection_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Transformer No:");
                    ui.label(&transformer_no);
                    ui.end_row();

                    ui.label("Branch:");
                    ui.text_edit_singleline(&mut branch);
                    ui.end_row();

                    ui.label("Date of Inspection:");
                    ui.add(egui::TextEdit::singleline(&mut date).hint_text("YYYY-MM-DD"));
                    ui.end_row();

                    ui.label("Time:");
                    ui.add(egui::TextEdit::singleline(&mut time).hint_text("HH:MM:SS"));
                    ui.end_row();
                });

            if let Some(message) = &error {
                ui.colored_label(egui::Color32::RED, message);
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    open = false;
                }
                if ui.button("Add Inspection").clicked() {
                    if branch.trim().is_empty() || date.trim().is_empty() {
                        error = Some("Branch and date are required.".to_string());
                    } else {
                        submitted = true;
                    }
                }
            });
        });

    if submitted {
        state.api.send(ApiRequest::CreateInspection(NewInspection {
            transformer_no,
            inspection_branch: branch.trim().to_string(),
            inspection_date: date.trim().to_string(),
            inspection_time: time.trim().to_string(),
            inspected_by: state.settings.operator.clone(),
        }));
        return DialogState::None;
    }
    if !open {
        return DialogState::None;
    }
    DialogState::NewInspection {
        transformer_no,
        branch,
        date,
        time,
        error,
    }
}

fn show_settings(
    ctx: &egui::Context,
    state: &mut AppState,
    mut base_url: String,
    mut operator: String,
    mut page_size: String,
) -> DialogState {
    let mut open = true;
    let mut saved = false;

    egui::Window::new("Settings")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            egui::Grid::new("settings_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Backend URL:");
                    ui.add(egui::TextEdit::singleline(&mut base_url).desired_width(260.0));
                    ui.end_row();

                    ui.label("Operator:");
                    ui.text_edit_singleline(&mut operator);
                    ui.end_row();

                    ui.label("Rows per page:");
                    ui.add(egui::TextEdit::singleline(&mut page_size).desired_width(60.0));
                    ui.end_row();
                });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    open = false;
                }
                if ui.button("Save").clicked() {
                    saved = true;
                }
            });
        });

    if saved {
        let now = ctx.input(|i| i.time);
        state.settings.base_url = base_url.trim().trim_end_matches('/').to_string();
        if !operator.trim().is_empty() {
            state.settings.operator = operator.trim().to_string();
        }
        if let Ok(size) = page_size.trim().parse::<usize>() {
            if size > 0 {
                state.settings.page_size = size;
            }
        }
        state
            .api
            .send(ApiRequest::SetBaseUrl(state.settings.base_url.clone()));
        state
            .comparison
            .editor
            .set_operator(state.settings.operator.clone());
        match state.settings.save() {
            Ok(()) => state.toast("Settings saved.", true, now),
            Err(err) => state.toast(format!("Settings not saved: {err}"), false, now),
        }
        return DialogState::None;
    }
    if !open {
        return DialogState::None;
    }
    DialogState::Settings {
        base_url,
        operator,
        page_size,
    }
}
