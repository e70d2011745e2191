// src/ui/comparison.rs
use std::fs;

use eframe::egui;
use rfd::FileDialog;
use tracing::warn;

use crate::annotation::export::confirm_records;
use crate::annotation::{Gesture, Handle, Target, Tool};
use crate::api::{ApiRequest, UploadFile};
use crate::model::WeatherCondition;
use crate::state::{AppState, Screen};

use super::widgets::{annotation_color, annotation_status_label, empty_hint};

const CANVAS_MAX_HEIGHT: f32 = 460.0;

fn uv_full() -> egui::Rect {
    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0))
}

pub fn show_comparison_view(ui: &mut egui::Ui, state: &mut AppState) {
    let Some(inspection_no) = state.comparison.inspection_no.clone() else {
        empty_hint(ui, "Open an inspection to compare its thermal image");
        return;
    };

    ui.horizontal(|ui| {
        ui.heading(format!("Thermal Comparison — {inspection_no}"));
        if state.comparison.loading {
            ui.spinner();
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("⬅ Inspections").clicked() {
                state.current_screen = Screen::Inspections;
            }
        });
    });
    ui.add_space(6.0);

    show_toolbar(ui, state, &inspection_no);
    ui.add_space(6.0);

    ui.columns(2, |cols| {
        show_baseline_card(&mut cols[0], state);
        show_thermal_card(&mut cols[1], state, &inspection_no);
    });

    ui.add_space(10.0);
    ui.separator();
    show_fault_list(ui, state);
    show_notes_window(ui.ctx(), state);
}

fn show_toolbar(ui: &mut egui::Ui, state: &mut AppState, inspection_no: &str) {
    let has_thermal = state.comparison.has_thermal();
    ui.horizontal(|ui| {
        let tool = state.comparison.editor.tool;
        for (value, label, hint) in [
            (Tool::Select, "⬉ Select", "Select, move and resize boxes"),
            (Tool::Draw, "▭ Draw", "Drag on the image to add a box"),
            (Tool::Pan, "✋ Pan", "Drag to pan while zoomed in"),
        ] {
            if ui
                .selectable_label(tool == value, label)
                .on_hover_text(hint)
                .clicked()
            {
                state.comparison.editor.tool = value;
            }
        }

        ui.separator();
        if ui.button("➕ Zoom in").clicked() {
            state.comparison.editor.view.zoom_step(1.25);
        }
        if ui.button("➖ Zoom out").clicked() {
            state.comparison.editor.view.zoom_step(0.8);
        }
        ui.label(format!(
            "{:.0}%",
            state.comparison.editor.view.scale * 100.0
        ));
        if ui.button("Reset view").clicked() {
            state.comparison.editor.view.reset_view();
        }

        ui.separator();
        let can_undo = state.comparison.editor.can_undo();
        if ui
            .add_enabled(can_undo, egui::Button::new("⟲ Undo"))
            .clicked()
        {
            state.comparison.editor.undo();
        }

        ui.separator();
        let confirm_enabled = has_thermal && !state.comparison.confirm_in_flight;
        if ui
            .add_enabled(confirm_enabled, egui::Button::new("✔ Confirm"))
            .on_hover_text("Save the current annotation set to the backend")
            .clicked()
        {
            let records = confirm_records(
                &state.comparison.editor,
                inspection_no,
                &state.comparison.transformer_no,
            );
            state.comparison.confirm_in_flight = true;
            state.api.send(ApiRequest::ConfirmEval { records });
        }

        let export_enabled = !state.comparison.export_in_flight;
        if ui
            .add_enabled(export_enabled, egui::Button::new("⬇ Export"))
            .on_hover_text("Download the inspection report")
            .clicked()
        {
            state.comparison.export_in_flight = true;
            state.api.send(ApiRequest::FetchReport {
                inspection_no: inspection_no.to_string(),
            });
        }
    });
}

fn show_baseline_card(ui: &mut egui::Ui, state: &mut AppState) {
    ui.strong("Baseline");
    match state.comparison.baseline_tex.clone() {
        Some(texture) => {
            let rect = fitted_rect(ui, texture.size_vec2());
            let painter = ui.painter_at(rect);
            painter.image(texture.id(), rect, uv_full(), egui::Color32::WHITE);
            caption(ui, &state.comparison.baseline_attribution.caption());
        }
        None => {
            ui.add_space(24.0);
            ui.label(
                egui::RichText::new("No baseline image for this weather condition").weak(),
            );
        }
    }
}

fn show_thermal_card(ui: &mut egui::Ui, state: &mut AppState, inspection_no: &str) {
    ui.strong("Thermal");
    if state.comparison.has_thermal() {
        show_canvas(ui, state);
        caption(ui, &state.comparison.thermal_attribution.caption());
    } else if !state.comparison.loading {
        show_upload_form(ui, state, inspection_no);
    }
}

/// The annotation canvas: the thermal texture under zoom/pan with detection
/// and annotation overlays, wired to the editor's gesture machine.
fn show_canvas(ui: &mut egui::Ui, state: &mut AppState) {
    let Some(texture) = state.comparison.thermal_tex.clone() else {
        return;
    };
    let natural = texture.size_vec2();
    let size = fit_size(ui.available_width(), natural);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::click_and_drag());
    let rect = response.rect;

    let editor = &mut state.comparison.editor;
    editor.view.set_natural(natural);
    editor.view.set_viewport(rect);

    // Input first, then paint the resulting state.
    if let Some(pos) = response.interact_pointer_pos() {
        if response.drag_started() {
            // The drag is recognized a few pixels after the press; anchor the
            // gesture at the original press position.
            let origin = ui.input(|i| i.pointer.press_origin()).unwrap_or(pos);
            editor.on_pointer_down(origin);
            editor.on_pointer_move(pos);
        } else if response.dragged() {
            editor.on_pointer_move(pos);
        }
    }
    if response.drag_released() {
        editor.on_pointer_up();
    }
    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            editor.on_pointer_down(pos);
            editor.on_pointer_up();
        }
    }
    if response.hovered() {
        let scroll = ui.input(|i| i.scroll_delta.y);
        if scroll != 0.0 {
            if let Some(pos) = response.hover_pos() {
                let target = editor.view.scale * (scroll * 0.003).exp();
                editor.view.zoom_about(pos, target);
            }
        }
    }

    let painter = painter.with_clip_rect(rect);
    painter.rect_filled(rect, 0.0, egui::Color32::BLACK);
    let image_rect = egui::Rect::from_min_max(
        editor.view.to_display(egui::Pos2::ZERO),
        editor.view.to_display(natural.to_pos2()),
    );
    painter.image(texture.id(), image_rect, uv_full(), egui::Color32::WHITE);

    // Detection overlays that no annotation has superseded.
    for i in editor.rendered_detections() {
        let det = &editor.detections[i];
        let bbox = crate::annotation::BBox::from(det.bbox);
        let display = editor.view.rect_to_display(&bbox);
        let color = annotation_color(crate::annotation::AnnotationStatus::Ai);
        painter.rect_stroke(display, 0.0, egui::Stroke::new(2.0, color));
        let label = match det.confidence_pct {
            Some(c) => format!("{} {c:.0}%", det.fault_type),
            None => det.fault_type.clone(),
        };
        painter.text(
            display.left_top() - egui::vec2(0.0, 2.0),
            egui::Align2::LEFT_BOTTOM,
            label,
            egui::FontId::proportional(12.0),
            color,
        );
        if editor.selection == Some(Target::Detection(i)) {
            paint_handles(&painter, editor, &bbox);
        }
    }

    // Operator annotations (tombstones never paint).
    let selected = editor.selection;
    let annotations: Vec<(usize, crate::annotation::BBox, crate::annotation::AnnotationStatus)> =
        editor
            .visible_annotations()
            .map(|(i, a)| (i, a.bbox, a.status))
            .collect();
    for (i, bbox, status) in annotations {
        let display = editor.view.rect_to_display(&bbox);
        let is_selected = selected == Some(Target::Annotation(i));
        let width = if is_selected { 3.0 } else { 2.0 };
        painter.rect_stroke(display, 0.0, egui::Stroke::new(width, annotation_color(status)));
        if is_selected {
            paint_handles(&painter, editor, &bbox);
        }
    }

    // Rubber band for an in-flight draw.
    if let Gesture::Drawing { start, current } = editor.gesture {
        let display = egui::Rect::from_two_pos(
            editor.view.to_display(start),
            editor.view.to_display(current),
        );
        painter.rect_stroke(
            display,
            0.0,
            egui::Stroke::new(1.5, egui::Color32::LIGHT_GREEN),
        );
    }
}

fn paint_handles(
    painter: &egui::Painter,
    editor: &crate::annotation::AnnotationEditor,
    bbox: &crate::annotation::BBox,
) {
    for handle in Handle::ALL {
        let center = editor.view.to_display(bbox.corner(handle));
        painter.circle_filled(center, 4.0, egui::Color32::WHITE);
        painter.circle_stroke(center, 4.0, egui::Stroke::new(1.0, egui::Color32::BLACK));
    }
}

fn show_upload_form(ui: &mut egui::Ui, state: &mut AppState, inspection_no: &str) {
    ui.add_space(12.0);
    ui.label("No thermal image yet — upload one to run the comparison.");
    ui.add_space(6.0);

    ui.horizontal(|ui| {
        ui.label("Weather:");
        let weather = &mut state.comparison.upload_weather;
        egui::ComboBox::from_id_source("thermal_weather")
            .selected_text(weather.as_str())
            .show_ui(ui, |ui| {
                for condition in WeatherCondition::ALL {
                    ui.selectable_value(weather, condition, condition.as_str());
                }
            });
    });

    ui.horizontal(|ui| {
        if ui.button("🖼 Pick thermal image…").clicked() {
            if let Some(path) = FileDialog::new()
                .add_filter("Images", &["png", "jpg", "jpeg"])
                .set_title("Select Thermal Image")
                .pick_file()
            {
                match fs::read(&path) {
                    Ok(bytes) => {
                        let file_name = path
                            .file_name()
                            .and_then(|f| f.to_str())
                            .unwrap_or("thermal.png")
                            .to_string();
                        state.comparison.upload_file = Some(UploadFile { file_name, bytes });
                    }
                    Err(err) => {
                        warn!(%err, path = %path.display(), "could not read thermal image")
                    }
                }
            }
        }
        if let Some(file) = &state.comparison.upload_file {
            ui.label(&file.file_name);
        }
    });

    let ready = state.comparison.upload_file.is_some();
    if ui
        .add_enabled(ready, egui::Button::new("⬆ Upload"))
        .clicked()
    {
        if let Some(file) = state.comparison.upload_file.take() {
            let stamp = state.stamp();
            state.api.send(ApiRequest::UploadThermal {
                inspection_no: inspection_no.to_string(),
                transformer_no: state.comparison.transformer_no.clone(),
                weather: state.comparison.upload_weather,
                file,
                stamp,
            });
            state.comparison.loading = true;
        }
    }
}

/// Merged detection/annotation rows under the images.
fn show_fault_list(ui: &mut egui::Ui, state: &mut AppState) {
    let entries = state.comparison.editor.fault_entries();
    ui.strong(format!("Detected faults ({})", entries.len()));
    if entries.is_empty() {
        ui.label(egui::RichText::new("Nothing flagged on this image.").weak());
        return;
    }

    egui::ScrollArea::vertical()
        .id_source("fault_list_scroll")
        .max_height(180.0)
        .show(ui, |ui| {
            egui::Grid::new("fault_list_grid")
                .num_columns(6)
                .striped(true)
                .spacing([16.0, 4.0])
                .show(ui, |ui| {
                    ui.strong("Fault");
                    ui.strong("Confidence");
                    ui.strong("Severity");
                    ui.strong("Status");
                    ui.strong("Notes");
                    ui.strong("Actions");
                    ui.end_row();

                    for entry in &entries {
                        let selected = state.comparison.editor.selection == Some(entry.target);
                        if ui.selectable_label(selected, &entry.label).clicked() {
                            state.comparison.editor.selection = Some(entry.target);
                        }
                        ui.label(
                            entry
                                .confidence_pct
                                .map(|c| format!("{c:.1}%"))
                                .unwrap_or_else(|| "-".to_string()),
                        );
                        ui.label(entry.severity.as_deref().unwrap_or("-"));
                        ui.colored_label(
                            annotation_color(entry.status),
                            annotation_status_label(entry.status),
                        );
                        ui.label(truncated(&entry.notes, 40));
                        ui.horizontal(|ui| {
                            if ui.small_button("🗒 Notes").clicked() {
                                state.comparison.notes_target = Some(entry.target);
                                state.comparison.notes_draft =
                                    state.comparison.editor.notes_of(entry.target);
                            }
                            let deletable =
                                entry.status != crate::annotation::AnnotationStatus::Deleted;
                            if ui
                                .add_enabled(deletable, egui::Button::new("🗑").small())
                                .clicked()
                            {
                                state.comparison.editor.delete(entry.target);
                            }
                        });
                        ui.end_row();
                    }
                });
        });
}

fn show_notes_window(ctx: &egui::Context, state: &mut AppState) {
    let Some(target) = state.comparison.notes_target else {
        return;
    };
    let mut open = true;
    let mut done = false;
    egui::Window::new("Annotation Notes")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.add(
                egui::TextEdit::multiline(&mut state.comparison.notes_draft)
                    .desired_rows(4)
                    .desired_width(320.0)
                    .hint_text("Observations for this box"),
            );
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    open = false;
                }
                if ui.button("Save").clicked() {
                    let draft = state.comparison.notes_draft.clone();
                    state.comparison.editor.set_notes(target, &draft);
                    done = true;
                }
            });
        });
    if done || !open {
        state.comparison.notes_target = None;
        state.comparison.notes_draft.clear();
    }
}

fn caption(ui: &mut egui::Ui, text: &str) {
    ui.label(egui::RichText::new(text).italics().small().weak());
}

fn truncated(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}…")
    }
}

fn fit_size(max_width: f32, natural: egui::Vec2) -> egui::Vec2 {
    let scale = (max_width / natural.x)
        .min(CANVAS_MAX_HEIGHT / natural.y)
        .min(1.0)
        .max(0.01);
    natural * scale
}

fn fitted_rect(ui: &mut egui::Ui, natural: egui::Vec2) -> egui::Rect {
    let size = fit_size(ui.available_width(), natural);
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    rect
}
