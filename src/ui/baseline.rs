// src/ui/baseline.rs
use std::fs;

use eframe::egui;
use rfd::FileDialog;
use tracing::warn;

use crate::api::{ApiRequest, UploadFile};
use crate::model::WeatherCondition;
use crate::state::{AppState, BaselineSlot, DialogState};
use crate::utils::texture_from_bytes;

const SLOT_WIDTH: f32 = 140.0;
const SLOT_HEIGHT: f32 = 180.0;

/// Three-slot baseline capture dialog (Sunny / Cloudy / Rainy). All slots
/// must be filled before Confirm posts the single multipart request.
pub fn show_baseline_dialog(
    ctx: &egui::Context,
    state: &mut AppState,
    transformer_no: String,
    mut slots: Box<[BaselineSlot; 3]>,
    mut error: Option<String>,
) -> DialogState {
    let mut open = true;
    let mut submitted = false;

    egui::Window::new("Upload Baseline Images")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(format!(
                    "Reference set for {transformer_no}. Click a slot to pick an image."
                ))
                .weak(),
            );
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                for (i, weather) in WeatherCondition::ALL.into_iter().enumerate() {
                    show_slot(ui, ctx, &mut slots[i], i, weather);
                }
            });

            if let Some(message) = &error {
                ui.add_space(4.0);
                ui.colored_label(egui::Color32::RED, message);
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    open = false;
                }
                let any_filled = slots.iter().any(|s| s.file.is_some());
                if ui
                    .add_enabled(any_filled, egui::Button::new("Confirm"))
                    .clicked()
                {
                    if slots.iter().all(|s| s.file.is_some()) {
                        submitted = true;
                    } else {
                        error =
                            Some("Please upload all three images before confirming.".to_string());
                    }
                }
            });
        });

    if submitted {
        let stamp = state.stamp();
        let files = (*slots).map(|slot| slot.file.expect("validated above"));
        state.api.send(ApiRequest::UploadBaseline {
            transformer_no,
            slots: Box::new(files),
            stamp,
        });
        return DialogState::None;
    }
    if !open {
        return DialogState::None;
    }
    DialogState::BaselineUpload {
        transformer_no,
        slots,
        error,
    }
}

fn show_slot(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    slot: &mut BaselineSlot,
    index: usize,
    weather: WeatherCondition,
) {
    ui.vertical(|ui| {
        ui.strong(weather.as_str());
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(SLOT_WIDTH, SLOT_HEIGHT), egui::Sense::click());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 4.0, egui::Color32::from_rgb(6, 27, 102));

        if let Some(texture) = &slot.preview {
            painter.image(
                texture.id(),
                rect.shrink(2.0),
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        } else {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "🖼 click to select",
                egui::FontId::proportional(13.0),
                egui::Color32::WHITE,
            );
        }

        if response.clicked() {
            pick_into_slot(ctx, slot, index);
        }
        let has_file = slot.file.is_some();
        if ui
            .add_enabled(has_file, egui::Button::new("Clear").small())
            .clicked()
        {
            // Dropping the preview handle frees the texture immediately.
            slot.file = None;
            slot.preview = None;
        }
    });
}

fn pick_into_slot(ctx: &egui::Context, slot: &mut BaselineSlot, index: usize) {
    let Some(path) = FileDialog::new()
        .add_filter("Images", &["png", "jpg", "jpeg"])
        .set_title("Select Baseline Image")
        .pick_file()
    else {
        return;
    };
    match fs::read(&path) {
        Ok(bytes) => {
            let file_name = path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or("baseline.png")
                .to_string();
            // Replacing the option drops the previous preview texture.
            slot.preview = texture_from_bytes(ctx, &format!("baseline-slot-{index}"), &bytes);
            slot.file = Some(UploadFile { file_name, bytes });
        }
        Err(err) => {
            warn!(%err, path = %path.display(), "could not read baseline image");
        }
    }
}
