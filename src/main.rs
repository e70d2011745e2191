// src/main.rs
use anyhow::Result;
use eframe::egui;
use tracing::{info, warn};

mod annotation;
mod api;
mod app;
mod model;
mod settings;
mod state;
mod ui;
mod utils;

use app::GridLensApp;
use settings::AppSettings;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let settings = AppSettings::load().unwrap_or_else(|err| {
        warn!(%err, "settings unreadable, using defaults");
        AppSettings::default()
    });
    info!(base_url = %settings.base_url, operator = %settings.operator, "starting GridLens");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 840.0])
            .with_title("GridLens"),
        ..Default::default()
    };

    eframe::run_native(
        "GridLens",
        options,
        Box::new(|cc| Box::new(GridLensApp::new(cc, settings))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run application: {}", e))
}
