// src/ui/widgets.rs
use eframe::egui;

use crate::annotation::AnnotationStatus;
use crate::model::InspectionStatus;
use crate::state::{AppState, Toast};

pub fn status_color(status: InspectionStatus) -> egui::Color32 {
    match status {
        InspectionStatus::Completed => egui::Color32::from_rgb(46, 125, 50),
        InspectionStatus::InProgress => egui::Color32::from_rgb(21, 101, 192),
        InspectionStatus::Pending => egui::Color32::from_rgb(239, 108, 0),
    }
}

/// Small rounded badge matching the inspection status.
pub fn status_badge(ui: &mut egui::Ui, status: InspectionStatus) {
    let color = status_color(status);
    egui::Frame::none()
        .fill(color.linear_multiply(0.15))
        .rounding(8.0)
        .inner_margin(egui::Margin::symmetric(8.0, 2.0))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(status.as_str()).color(color).small());
        });
}

pub fn annotation_color(status: AnnotationStatus) -> egui::Color32 {
    match status {
        AnnotationStatus::Ai => egui::Color32::from_rgb(229, 57, 53),
        AnnotationStatus::Added => egui::Color32::from_rgb(67, 160, 71),
        AnnotationStatus::Edited => egui::Color32::from_rgb(255, 179, 0),
        AnnotationStatus::Deleted => egui::Color32::GRAY,
    }
}

pub fn annotation_status_label(status: AnnotationStatus) -> &'static str {
    match status {
        AnnotationStatus::Ai => "AI",
        AnnotationStatus::Added => "Added",
        AnnotationStatus::Edited => "Edited",
        AnnotationStatus::Deleted => "Deleted",
    }
}

/// Transient top-center notice; expires after a few seconds.
pub fn show_toast(ctx: &egui::Context, state: &mut AppState) {
    state.expire_toast(ctx.input(|i| i.time));
    let Some(Toast {
        message, success, ..
    }) = state.toast.clone()
    else {
        return;
    };
    let color = if success {
        egui::Color32::from_rgb(46, 125, 50)
    } else {
        egui::Color32::from_rgb(198, 40, 40)
    };
    egui::Area::new(egui::Id::new("toast"))
        .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 12.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::none()
                .fill(color)
                .rounding(6.0)
                .inner_margin(egui::Margin::symmetric(14.0, 8.0))
                .show(ui, |ui| {
                    ui.label(egui::RichText::new(message).color(egui::Color32::WHITE));
                });
        });
}

/// Centered hint for empty/loading screens.
pub fn empty_hint(ui: &mut egui::Ui, text: &str) {
    ui.centered_and_justified(|ui| {
        ui.label(egui::RichText::new(text).weak());
    });
}
