// src/ui/transformers.rs
use eframe::egui;

use crate::api::ApiRequest;
use crate::model::TransformerType;
use crate::state::{AppState, BaselineSlot, DialogState, Screen, SearchBy};

use super::widgets::empty_hint;

pub fn show_transformers_view(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        ui.heading("Transformers");
        if ui.button("➕ Add Transformer").clicked() {
            state.current_dialog = DialogState::NewTransformer {
                region: String::new(),
                number: String::new(),
                pole: String::new(),
                transformer_type: None,
                location: String::new(),
                error: None,
            };
        }
        if state.transformers.loading {
            ui.spinner();
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("⟳ Refresh").clicked() {
                state.transformers.loading = true;
                state.api.send(ApiRequest::FetchTransformers);
            }
        });
    });

    ui.add_space(8.0);
    show_filter_bar(ui, state);
    ui.add_space(8.0);
    ui.separator();
    ui.add_space(4.0);

    show_table(ui, state);
    ui.add_space(8.0);
    show_pagination(ui, state);
}

fn show_filter_bar(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        let t = &mut state.transformers;

        let mut search_by = t.search_by;
        egui::ComboBox::from_id_source("search_by")
            .selected_text(search_by.label())
            .show_ui(ui, |ui| {
                for by in SearchBy::ALL {
                    ui.selectable_value(&mut search_by, by, by.label());
                }
            });
        if search_by != t.search_by {
            t.set_search_by(search_by);
        }

        let mut search = t.search.clone();
        let response = ui.add(
            egui::TextEdit::singleline(&mut search)
                .desired_width(220.0)
                .hint_text(format!("Search {}", t.search_by.label())),
        );
        if response.changed() {
            t.set_search(search);
        }

        let mut region = t.region_filter.clone();
        egui::ComboBox::from_id_source("region_filter")
            .selected_text(region.as_deref().unwrap_or("All Regions"))
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut region, None, "All Regions");
                for r in t.regions() {
                    ui.selectable_value(&mut region, Some(r.clone()), r);
                }
            });
        if region != t.region_filter {
            t.set_region_filter(region);
        }

        let mut ty = t.type_filter;
        egui::ComboBox::from_id_source("type_filter")
            .selected_text(ty.map(|t| t.as_str()).unwrap_or("All Types"))
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut ty, None, "All Types");
                for variant in TransformerType::ALL {
                    ui.selectable_value(&mut ty, Some(variant), variant.as_str());
                }
            });
        if ty != t.type_filter {
            t.set_type_filter(ty);
        }

        if ui.button("Reset Filters").clicked() {
            t.reset_filters();
        }
    });
}

fn show_table(ui: &mut egui::Ui, state: &mut AppState) {
    let page_size = state.settings.page_size;
    // Clone the visible slice so row actions can mutate state freely.
    let rows: Vec<crate::model::Transformer> = state
        .transformers
        .current_rows(page_size)
        .into_iter()
        .cloned()
        .collect();

    egui::Grid::new("transformers_grid")
        .num_columns(6)
        .striped(true)
        .spacing([16.0, 6.0])
        .show(ui, |ui| {
            ui.strong("Transformer No.");
            ui.strong("Pole No.");
            ui.strong("Region");
            ui.strong("Type");
            ui.strong("Location");
            ui.strong("Actions");
            ui.end_row();

            for t in &rows {
                ui.label(&t.transformer_no);
                ui.label(&t.pole_no);
                ui.label(&t.region);
                ui.label(t.type_label());
                ui.label(&t.location);
                ui.horizontal(|ui| {
                    if ui.button("View").clicked() {
                        open_inspections(state, t.transformer_no.clone());
                    }
                    if ui.button("Baseline").clicked() {
                        state.current_dialog = DialogState::BaselineUpload {
                            transformer_no: t.transformer_no.clone(),
                            slots: Box::new([
                                BaselineSlot::default(),
                                BaselineSlot::default(),
                                BaselineSlot::default(),
                            ]),
                            error: None,
                        };
                    }
                });
                ui.end_row();
            }
        });

    if rows.is_empty() && !state.transformers.loading {
        ui.add_space(24.0);
        empty_hint(ui, "No transformers found");
    }
}

fn show_pagination(ui: &mut egui::Ui, state: &mut AppState) {
    let page_size = state.settings.page_size;
    let total = state.transformers.total_pages(page_size);
    if total <= 1 {
        return;
    }
    let current = state.transformers.page();
    ui.horizontal(|ui| {
        if ui.add_enabled(current > 1, egui::Button::new("<")).clicked() {
            state.transformers.prev_page();
        }
        for page in 1..=total {
            if ui
                .selectable_label(page == current, page.to_string())
                .clicked()
            {
                state.transformers.set_page(page, page_size);
            }
        }
        if ui
            .add_enabled(current < total, egui::Button::new(">"))
            .clicked()
        {
            state.transformers.next_page(page_size);
        }
    });
}

/// Shared by the View action and anything else that jumps to a
/// transformer's inspections.
pub fn open_inspections(state: &mut AppState, transformer_no: String) {
    state.inspections.open(transformer_no.clone());
    state.api.send(ApiRequest::FetchInspections {
        transformer_no: transformer_no.clone(),
    });
    state.api.send(ApiRequest::FetchBaseline { transformer_no });
    state.current_screen = Screen::Inspections;
}
