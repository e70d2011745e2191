// src/state/comparison_state.rs
use eframe::egui;

use crate::annotation::{AnnotationEditor, Target};
use crate::api::UploadFile;
use crate::model::{ComparisonPayload, ImageAttribution, WeatherCondition};
use crate::utils::texture_from_bytes;

/// Everything the thermal comparison screen needs: the annotation editor,
/// the two image textures, and the small upload/notes forms around them.
pub struct ComparisonState {
    pub inspection_no: Option<String>,
    pub transformer_no: String,
    pub editor: AnnotationEditor,
    pub loading: bool,
    /// Dropping a handle frees the GPU texture, so replacement and screen
    /// changes release the previous image.
    pub baseline_tex: Option<egui::TextureHandle>,
    pub thermal_tex: Option<egui::TextureHandle>,
    pub baseline_attribution: ImageAttribution,
    pub thermal_attribution: ImageAttribution,
    pub notes_target: Option<Target>,
    pub notes_draft: String,
    pub upload_weather: WeatherCondition,
    pub upload_file: Option<UploadFile>,
    pub confirm_in_flight: bool,
    pub export_in_flight: bool,
}

impl ComparisonState {
    pub fn new(operator: impl Into<String>) -> Self {
        Self {
            inspection_no: None,
            transformer_no: String::new(),
            editor: AnnotationEditor::new(operator),
            loading: false,
            baseline_tex: None,
            thermal_tex: None,
            baseline_attribution: ImageAttribution::default(),
            thermal_attribution: ImageAttribution::default(),
            notes_target: None,
            notes_draft: String::new(),
            upload_weather: WeatherCondition::Sunny,
            upload_file: None,
            confirm_in_flight: false,
            export_in_flight: false,
        }
    }

    /// Switch to an inspection and forget the previous one, textures
    /// included.
    pub fn open(&mut self, inspection_no: String, transformer_no: String) {
        self.inspection_no = Some(inspection_no);
        self.transformer_no = transformer_no;
        self.loading = true;
        self.baseline_tex = None;
        self.thermal_tex = None;
        self.baseline_attribution = ImageAttribution::default();
        self.thermal_attribution = ImageAttribution::default();
        self.notes_target = None;
        self.notes_draft.clear();
        self.upload_file = None;
        self.confirm_in_flight = false;
        self.export_in_flight = false;
        self.editor.load(Vec::new());
    }

    pub fn has_thermal(&self) -> bool {
        self.thermal_tex.is_some()
    }

    /// Install a freshly fetched payload: decode images into textures
    /// (replacing, and thereby freeing, the previous ones) and reseed the
    /// editor. Any unconfirmed edits are discarded by design.
    pub fn apply_payload(&mut self, ctx: &egui::Context, payload: ComparisonPayload) {
        self.loading = false;
        self.baseline_attribution = payload.baseline_attribution;
        self.thermal_attribution = payload.thermal_attribution;

        self.baseline_tex = payload
            .baseline_png
            .as_deref()
            .and_then(|bytes| texture_from_bytes(ctx, "comparison-baseline", bytes));
        self.thermal_tex = payload
            .thermal_png
            .as_deref()
            .and_then(|bytes| texture_from_bytes(ctx, "comparison-thermal", bytes));

        self.editor.load(payload.detections);
        if let Some(tex) = &self.thermal_tex {
            let size = tex.size_vec2();
            self.editor.view.set_natural(size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_forgets_the_previous_inspection() {
        let mut s = ComparisonState::new("tester");
        s.notes_draft = "leftover".into();
        s.confirm_in_flight = true;
        s.open("I-2".into(), "T-1".into());
        assert_eq!(s.inspection_no.as_deref(), Some("I-2"));
        assert!(s.loading);
        assert!(s.notes_draft.is_empty());
        assert!(!s.confirm_in_flight);
        assert!(s.baseline_tex.is_none() && s.thermal_tex.is_none());
        assert!(s.editor.annotations.is_empty());
        assert!(!s.editor.can_undo());
    }
}
