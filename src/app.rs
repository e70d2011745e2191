// src/app.rs
use std::fs;

use eframe::egui;
use rfd::FileDialog;
use tracing::error;

use crate::annotation::export::prepare_report;
use crate::api::{ApiEvent, ApiHandle, ApiRequest};
use crate::settings::AppSettings;
use crate::state::{AppState, DialogState, Screen};
use crate::ui;

pub struct GridLensApp {
    state: AppState,
}

impl GridLensApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: AppSettings) -> Self {
        let api = ApiHandle::spawn(settings.base_url.clone(), cc.egui_ctx.clone());
        api.send(ApiRequest::FetchTransformers);
        let mut state = AppState::new(settings, api);
        state.transformers.loading = true;
        Self { state }
    }

    fn show_menu(&mut self, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Settings…").clicked() {
                    self.state.current_dialog = DialogState::Settings {
                        base_url: self.state.settings.base_url.clone(),
                        operator: self.state.settings.operator.clone(),
                        page_size: self.state.settings.page_size.to_string(),
                    };
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.separator();

            let tabs = [
                (Screen::Transformers, "Transformers"),
                (Screen::Inspections, "Inspections"),
                (Screen::Comparison, "Comparison"),
            ];
            for (screen, label) in tabs {
                if ui
                    .selectable_label(self.state.current_screen == screen, label)
                    .clicked()
                {
                    self.state.current_screen = screen;
                }
            }
        });
    }

    /// Drain whatever the API worker produced since the last frame and fold
    /// it into the state. The newest answer wins; there is no retry logic.
    fn pump_api(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);
        for event in self.state.api.drain() {
            self.apply_event(ctx, event, now);
        }
    }

    fn apply_event(&mut self, ctx: &egui::Context, event: ApiEvent, now: f64) {
        let state = &mut self.state;
        match event {
            ApiEvent::Transformers(Ok(rows)) => state.transformers.set_rows(rows),
            ApiEvent::Transformers(Err(err)) => {
                state.transformers.loading = false;
                state.toast(format!("Failed to load transformers: {err}"), false, now);
            }

            ApiEvent::TransformerCreated(Ok(message)) => {
                state.toast(message, true, now);
                state.transformers.loading = true;
                state.api.send(ApiRequest::FetchTransformers);
            }
            ApiEvent::TransformerCreated(Err(err)) => state.toast(err.to_string(), false, now),

            ApiEvent::Inspections {
                transformer_no,
                result,
            } => match result {
                Ok(rows) => state.inspections.set_rows(&transformer_no, rows),
                Err(err) => {
                    state.inspections.loading = false;
                    state.toast(format!("Failed to load inspections: {err}"), false, now);
                }
            },

            ApiEvent::InspectionCreated(Ok(message)) => {
                state.toast(message, true, now);
                if let Some(no) = state.inspections.transformer_no.clone() {
                    state.inspections.loading = true;
                    state
                        .api
                        .send(ApiRequest::FetchInspections { transformer_no: no });
                }
            }
            ApiEvent::InspectionCreated(Err(err)) => state.toast(err.to_string(), false, now),

            ApiEvent::Baseline {
                transformer_no,
                result,
            } => match result {
                Ok(set) => state.inspections.set_baseline(&transformer_no, set),
                Err(err) => state.toast(format!("Failed to load baseline: {err}"), false, now),
            },

            ApiEvent::BaselineUploaded(result) | ApiEvent::BaselineDeleted(result) => {
                match result {
                    Ok(message) => state.toast(message, true, now),
                    Err(err) => state.toast(err.to_string(), false, now),
                }
                if let Some(no) = state.inspections.transformer_no.clone() {
                    state
                        .api
                        .send(ApiRequest::FetchBaseline { transformer_no: no });
                }
            }

            ApiEvent::Comparison {
                inspection_no,
                result,
            } => {
                // Ignore late answers for an inspection we already left.
                if state.comparison.inspection_no.as_deref() != Some(&inspection_no) {
                    return;
                }
                match result {
                    Ok(payload) => state.comparison.apply_payload(ctx, payload),
                    Err(err) => {
                        state.comparison.loading = false;
                        state.toast(format!("Failed to load comparison: {err}"), false, now);
                    }
                }
            }

            ApiEvent::ThermalUploaded(result) => match result {
                Ok(message) => {
                    state.toast(message, true, now);
                    if let Some(no) = state.comparison.inspection_no.clone() {
                        state
                            .api
                            .send(ApiRequest::FetchComparison { inspection_no: no });
                    }
                }
                Err(err) => {
                    state.comparison.loading = false;
                    state.toast(err.to_string(), false, now);
                }
            },

            ApiEvent::EvalConfirmed(result) => {
                state.comparison.confirm_in_flight = false;
                match result {
                    Ok(message) => state.toast(message, true, now),
                    Err(err) => state.toast(format!("Confirm failed: {err}"), false, now),
                }
            }

            ApiEvent::Report {
                inspection_no,
                result,
            } => {
                state.comparison.export_in_flight = false;
                match result {
                    Ok(blob) => save_report(state, &inspection_no, &blob, now),
                    // Export failures block, matching the original alert.
                    Err(err) => state.error_message = Some(format!("Export failed: {err}")),
                }
            }
        }
    }
}

/// Pretty-print (when JSON) and write the report wherever the operator
/// chooses. Cancelling the dialog discards the blob silently.
fn save_report(state: &mut AppState, inspection_no: &str, blob: &[u8], now: f64) {
    let Some(path) = FileDialog::new()
        .set_title("Save Inspection Report")
        .set_file_name(format!("{inspection_no}-report.json"))
        .save_file()
    else {
        return;
    };
    let contents = prepare_report(blob);
    match fs::write(&path, contents) {
        Ok(()) => state.toast(format!("Report saved to {}", path.display()), true, now),
        Err(err) => {
            error!(%err, path = %path.display(), "report write failed");
            state.error_message = Some(format!("Could not write report: {err}"));
        }
    }
}

impl eframe::App for GridLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump_api(ctx);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            self.show_menu(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.state.current_screen {
            Screen::Transformers => ui::transformers::show_transformers_view(ui, &mut self.state),
            Screen::Inspections => ui::inspections::show_inspections_view(ui, &mut self.state),
            Screen::Comparison => ui::comparison::show_comparison_view(ui, &mut self.state),
        });

        // Blocking error modal
        let error_msg = self.state.error_message.clone();
        if let Some(error) = error_msg {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&error);
                    if ui.button("OK").clicked() {
                        self.state.error_message = None;
                    }
                });
        }

        ui::dialog::show_dialogs(ctx, &mut self.state);
        ui::widgets::show_toast(ctx, &mut self.state);
    }
}
