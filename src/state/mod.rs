// src/state/mod.rs
use chrono::Local;
use eframe::egui;

use crate::api::{ApiHandle, UploadFile, UploadStamp};
use crate::model::TransformerType;
use crate::settings::AppSettings;

pub mod comparison_state;
pub mod inspection_state;
pub mod transformer_state;

pub use comparison_state::ComparisonState;
pub use inspection_state::InspectionState;
pub use transformer_state::{SearchBy, TransformerState};

// Screen/tab tracking
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Transformers,
    Inspections,
    Comparison,
}

/// One baseline slot in the upload dialog: the picked file plus its preview
/// texture. Replacing or clearing the slot drops the old texture with it.
#[derive(Default)]
pub struct BaselineSlot {
    pub file: Option<UploadFile>,
    pub preview: Option<egui::TextureHandle>,
}

// Core dialog tracking; each variant carries its own form fields.
pub enum DialogState {
    None,
    NewTransformer {
        region: String,
        number: String,
        pole: String,
        transformer_type: Option<TransformerType>,
        location: String,
        error: Option<String>,
    },
    NewInspection {
        transformer_no: String,
        branch: String,
        date: String,
        time: String,
        error: Option<String>,
    },
    BaselineUpload {
        transformer_no: String,
        slots: Box<[BaselineSlot; 3]>,
        error: Option<String>,
    },
    Settings {
        base_url: String,
        operator: String,
        page_size: String,
    },
}

/// Transient snackbar-style notice, auto-dismissed by the app loop.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub success: bool,
    pub shown_at: f64,
}

pub const TOAST_SECONDS: f64 = 4.0;

// Core application state
pub struct AppState {
    pub settings: AppSettings,
    pub current_screen: Screen,
    pub current_dialog: DialogState,
    pub toast: Option<Toast>,
    /// Blocking failures (export, fatal decode) that need an OK click.
    pub error_message: Option<String>,

    pub transformers: TransformerState,
    pub inspections: InspectionState,
    pub comparison: ComparisonState,

    pub api: ApiHandle,
}

impl AppState {
    pub fn new(settings: AppSettings, api: ApiHandle) -> Self {
        let comparison = ComparisonState::new(settings.operator.clone());
        Self {
            settings,
            current_screen: Screen::Transformers,
            current_dialog: DialogState::None,
            toast: None,
            error_message: None,
            transformers: TransformerState::default(),
            inspections: InspectionState::default(),
            comparison,
            api,
        }
    }

    pub fn toast(&mut self, message: impl Into<String>, success: bool, now: f64) {
        self.toast = Some(Toast {
            message: message.into(),
            success,
            shown_at: now,
        });
    }

    pub fn expire_toast(&mut self, now: f64) {
        if self
            .toast
            .as_ref()
            .is_some_and(|t| now - t.shown_at > TOAST_SECONDS)
        {
            self.toast = None;
        }
    }

    /// Session attribution for uploads: the configured operator plus the
    /// moment of submission.
    pub fn stamp(&self) -> UploadStamp {
        let now = Local::now();
        UploadStamp {
            uploaded_by: self.settings.operator.clone(),
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M:%S").to_string(),
        }
    }
}
