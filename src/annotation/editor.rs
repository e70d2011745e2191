// src/annotation/editor.rs
use chrono::{DateTime, Utc};
use eframe::egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::AiDetection;

use super::geometry::{BBox, Handle, ViewTransform};

/// Screen-space pick radius for corner handles.
const HANDLE_RADIUS: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationStatus {
    /// Materialized from a detection but not altered yet.
    Ai,
    /// Drawn by the operator.
    Added,
    /// A detection the operator moved, resized, or annotated.
    Edited,
    /// Logical tombstone; never physically removed so the delete itself
    /// stays undoable and exportable.
    Deleted,
}

impl AnnotationStatus {
    pub fn wire_value(&self) -> &'static str {
        match self {
            AnnotationStatus::Ai => "ai",
            AnnotationStatus::Added => "added",
            AnnotationStatus::Edited => "edited",
            AnnotationStatus::Deleted => "deleted",
        }
    }
}

/// An operator-authored (or operator-edited) box layered on top of the
/// detection results. Geometry lives in original-image pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: Uuid,
    pub bbox: BBox,
    pub status: AnnotationStatus,
    pub notes: String,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    /// Index into the detection list this annotation replaces, if any.
    pub original_index: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Select,
    Draw,
    Pan,
}

/// What a gesture or selection points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Annotation(usize),
    Detection(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    /// Corner-to-corner rubber band, in image space.
    Drawing { start: Pos2, current: Pos2 },
    /// `grab` is the offset from the pointer to the box origin, so the box
    /// does not jump to the cursor on pickup. `origin` is what was actually
    /// clicked, kept so a no-op click can restore a sensible selection.
    Moving {
        index: usize,
        grab: Vec2,
        moved: bool,
        origin: Target,
    },
    Resizing {
        index: usize,
        handle: Handle,
        moved: bool,
        origin: Target,
    },
    /// Last pointer position, in screen space.
    Panning { last: Pos2 },
}

/// One row of the fault list under the comparison image, after merging
/// detections with operator annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultEntry {
    pub target: Target,
    pub label: String,
    pub confidence_pct: Option<f32>,
    pub severity: Option<String>,
    pub status: AnnotationStatus,
    pub notes: String,
}

/// The thermal-image annotation editor: detections, operator annotations,
/// view transform, the active gesture, and a linear undo history of full
/// annotation-set snapshots.
#[derive(Debug)]
pub struct AnnotationEditor {
    pub detections: Vec<AiDetection>,
    pub annotations: Vec<Annotation>,
    pub view: ViewTransform,
    pub tool: Tool,
    pub gesture: Gesture,
    pub selection: Option<Target>,
    operator: String,
    history: Vec<Vec<Annotation>>,
}

impl AnnotationEditor {
    pub fn new(operator: impl Into<String>) -> Self {
        Self {
            detections: Vec::new(),
            annotations: Vec::new(),
            view: ViewTransform::default(),
            tool: Tool::Select,
            gesture: Gesture::Idle,
            selection: None,
            operator: operator.into(),
            history: Vec::new(),
        }
    }

    /// Reinitialize from a freshly loaded payload. Edits made since the last
    /// confirm are intentionally discarded; there is no autosave.
    pub fn load(&mut self, detections: Vec<AiDetection>) {
        self.detections = detections;
        self.annotations.clear();
        self.history.clear();
        self.gesture = Gesture::Idle;
        self.selection = None;
        self.view.reset_view();
    }

    pub fn set_operator(&mut self, operator: impl Into<String>) {
        self.operator = operator.into();
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn undo(&mut self) {
        if let Some(prev) = self.history.pop() {
            self.annotations = prev;
            self.selection = None;
            self.gesture = Gesture::Idle;
        }
    }

    /// Snapshot once at gesture start, never on intermediate moves.
    fn push_history(&mut self) {
        self.history.push(self.annotations.clone());
    }

    /// A gesture that turned out to be a no-op unwinds its snapshot so undo
    /// still maps one step to one real change.
    fn discard_gesture(&mut self) {
        if let Some(prev) = self.history.pop() {
            self.annotations = prev;
        }
    }

    // ------------------------------------------------------------------
    // Suppression & merging
    // ------------------------------------------------------------------

    /// A detection stops rendering once an annotation supersedes it: strict
    /// `original_index` reference with a non-Ai status, or the legacy path,
    /// a tombstone with no index but bit-identical coordinates.
    pub fn detection_suppressed(&self, index: usize) -> bool {
        let Some(det) = self.detections.get(index) else {
            return true;
        };
        let det_bbox = BBox::from(det.bbox);
        self.annotations.iter().any(|a| {
            (a.original_index == Some(index) && a.status != AnnotationStatus::Ai)
                || (a.status == AnnotationStatus::Deleted
                    && a.original_index.is_none()
                    && a.bbox.bits_eq(&det_bbox))
        })
    }

    /// Detection indices that should draw an overlay box.
    pub fn rendered_detections(&self) -> Vec<usize> {
        (0..self.detections.len())
            .filter(|&i| !self.detections[i].no_anomaly && !self.detection_suppressed(i))
            .collect()
    }

    /// Non-deleted annotations, with their indices.
    pub fn visible_annotations(&self) -> impl Iterator<Item = (usize, &Annotation)> {
        self.annotations
            .iter()
            .enumerate()
            .filter(|(_, a)| a.status != AnnotationStatus::Deleted)
    }

    /// Fault list rows: every annotation (tombstones marked) plus every
    /// rendered detection, de-duplicated by bbox key with the operator entry
    /// winning over the raw detection.
    pub fn fault_entries(&self) -> Vec<FaultEntry> {
        let mut entries: Vec<FaultEntry> = Vec::new();
        let mut seen_keys: Vec<String> = Vec::new();

        for (i, a) in self.annotations.iter().enumerate() {
            let det = a.original_index.and_then(|d| self.detections.get(d));
            entries.push(FaultEntry {
                target: Target::Annotation(i),
                label: det
                    .map(|d| d.fault_type.clone())
                    .unwrap_or_else(|| "Manual".to_string()),
                confidence_pct: det.and_then(|d| d.confidence_pct),
                severity: det.and_then(|d| d.severity.clone()),
                status: a.status,
                notes: a.notes.clone(),
            });
            seen_keys.push(a.bbox.key());
        }

        for i in self.rendered_detections() {
            let det = &self.detections[i];
            let key = BBox::from(det.bbox).key();
            if seen_keys.contains(&key) {
                continue;
            }
            entries.push(FaultEntry {
                target: Target::Detection(i),
                label: det.fault_type.clone(),
                confidence_pct: det.confidence_pct,
                severity: det.severity.clone(),
                status: AnnotationStatus::Ai,
                notes: det.notes.clone().unwrap_or_default(),
            });
        }

        entries
    }

    // ------------------------------------------------------------------
    // Pointer gestures
    // ------------------------------------------------------------------

    pub fn on_pointer_down(&mut self, screen: Pos2) {
        if !matches!(self.gesture, Gesture::Idle) {
            return;
        }
        let image_pos = self.view.to_image(screen);

        // Resize handles take priority over bodies so a corner grab near an
        // overlapping box does not start a move instead.
        if let Some((target, handle)) = self.hit_handle(screen) {
            self.push_history();
            let index = self.materialize(target);
            self.selection = Some(Target::Annotation(index));
            self.gesture = Gesture::Resizing {
                index,
                handle,
                moved: false,
                origin: target,
            };
            return;
        }

        if let Some(target) = self.hit_body(image_pos) {
            if self.tool == Tool::Pan && self.view.zoomed_in() {
                self.gesture = Gesture::Panning { last: screen };
                return;
            }
            self.push_history();
            let index = self.materialize(target);
            let top_left = Pos2::new(self.annotations[index].bbox.x, self.annotations[index].bbox.y);
            self.selection = Some(Target::Annotation(index));
            self.gesture = Gesture::Moving {
                index,
                grab: image_pos - top_left,
                moved: false,
                origin: target,
            };
            return;
        }

        match self.tool {
            Tool::Draw => {
                self.push_history();
                self.selection = None;
                self.gesture = Gesture::Drawing {
                    start: image_pos,
                    current: image_pos,
                };
            }
            Tool::Pan if self.view.zoomed_in() => {
                self.gesture = Gesture::Panning { last: screen };
            }
            _ => {
                self.selection = None;
            }
        }
    }

    pub fn on_pointer_move(&mut self, screen: Pos2) {
        let image_pos = self.view.to_image(screen);
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Drawing { current, .. } => {
                *current = image_pos;
            }
            Gesture::Moving {
                index, grab, moved, ..
            } => {
                let bbox = &mut self.annotations[*index].bbox;
                let next = BBox::new(image_pos.x - grab.x, image_pos.y - grab.y, bbox.w, bbox.h);
                if !next.bits_eq(bbox) {
                    *moved = true;
                }
                *bbox = next;
            }
            Gesture::Resizing {
                index,
                handle,
                moved,
                ..
            } => {
                let bbox = &mut self.annotations[*index].bbox;
                let next = bbox.with_corner_at(*handle, image_pos);
                if !next.bits_eq(bbox) {
                    *moved = true;
                }
                *bbox = next;
            }
            Gesture::Panning { last } => {
                let delta = screen - *last;
                *last = screen;
                self.view.pan_by(delta);
            }
        }
    }

    pub fn on_pointer_up(&mut self) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Drawing { start, current } => {
                let bbox = BBox::from_corners(start, current)
                    .clamped_to(self.view.natural.x, self.view.natural.y);
                // A click without a drag draws nothing.
                if bbox.area() <= 0.0 {
                    self.discard_gesture();
                } else {
                    self.annotations.push(Annotation {
                        id: Uuid::new_v4(),
                        bbox,
                        status: AnnotationStatus::Added,
                        notes: String::new(),
                        timestamp: Utc::now(),
                        user: self.operator.clone(),
                        original_index: None,
                    });
                    self.selection = Some(Target::Annotation(self.annotations.len() - 1));
                }
            }
            Gesture::Moving {
                index,
                moved,
                origin,
                ..
            }
            | Gesture::Resizing {
                index,
                moved,
                origin,
                ..
            } => {
                if moved {
                    let size = self.view.natural;
                    let ann = &mut self.annotations[index];
                    ann.bbox = ann.bbox.clamped_to(size.x, size.y);
                    if ann.status == AnnotationStatus::Ai {
                        ann.status = AnnotationStatus::Edited;
                    }
                    ann.timestamp = Utc::now();
                    ann.user = self.operator.clone();
                } else {
                    // Pure click: unwind the snapshot (and any annotation
                    // materialized for the gesture), keep what was clicked
                    // selected.
                    self.discard_gesture();
                    self.selection = Some(origin);
                }
            }
            Gesture::Panning { .. } => {}
        }
        self.gesture = Gesture::Idle;
    }

    // ------------------------------------------------------------------
    // Explicit edits
    // ------------------------------------------------------------------

    /// Tombstone the target. Detections get a tombstone annotation carrying
    /// their index, which also suppresses their overlay.
    pub fn delete(&mut self, target: Target) {
        self.push_history();
        let index = self.materialize(target);
        let ann = &mut self.annotations[index];
        ann.status = AnnotationStatus::Deleted;
        ann.timestamp = Utc::now();
        ann.user = self.operator.clone();
        self.selection = None;
    }

    /// Attach or replace the note on the target. Writing a note on a raw
    /// detection promotes it to an Edited annotation.
    pub fn set_notes(&mut self, target: Target, notes: &str) {
        self.push_history();
        let index = self.materialize(target);
        let ann = &mut self.annotations[index];
        if ann.notes == notes {
            self.discard_gesture();
            return;
        }
        ann.notes = notes.to_string();
        if ann.status == AnnotationStatus::Ai {
            ann.status = AnnotationStatus::Edited;
        }
        ann.timestamp = Utc::now();
        ann.user = self.operator.clone();
        self.selection = Some(Target::Annotation(index));
    }

    pub fn notes_of(&self, target: Target) -> String {
        match target {
            Target::Annotation(i) => self
                .annotations
                .get(i)
                .map(|a| a.notes.clone())
                .unwrap_or_default(),
            Target::Detection(i) => self
                .detections
                .get(i)
                .and_then(|d| d.notes.clone())
                .unwrap_or_default(),
        }
    }

    // ------------------------------------------------------------------
    // Hit testing (display space, per the stored-in-original contract)
    // ------------------------------------------------------------------

    fn hit_handle(&self, screen: Pos2) -> Option<(Target, Handle)> {
        let check = |bbox: &BBox| {
            Handle::ALL.into_iter().find(|&h| {
                self.view.to_display(bbox.corner(h)).distance(screen) <= HANDLE_RADIUS
            })
        };
        // Operator annotations sit above detections.
        for (i, a) in self.visible_annotations() {
            if let Some(h) = check(&a.bbox) {
                return Some((Target::Annotation(i), h));
            }
        }
        for i in self.rendered_detections() {
            if let Some(h) = check(&BBox::from(self.detections[i].bbox)) {
                return Some((Target::Detection(i), h));
            }
        }
        None
    }

    fn hit_body(&self, image_pos: Pos2) -> Option<Target> {
        // Topmost (most recent) annotation first.
        if let Some((i, _)) = self
            .visible_annotations()
            .filter(|(_, a)| a.bbox.contains(image_pos))
            .last()
        {
            return Some(Target::Annotation(i));
        }
        self.rendered_detections()
            .into_iter()
            .find(|&i| BBox::from(self.detections[i].bbox).contains(image_pos))
            .map(Target::Detection)
    }

    /// Ensure the target exists as an annotation, returning its index. For a
    /// detection this creates the Ai-status twin that later transitions to
    /// Edited or Deleted; at most one annotation per detection index.
    fn materialize(&mut self, target: Target) -> usize {
        match target {
            Target::Annotation(i) => i,
            Target::Detection(d) => {
                if let Some(i) = self
                    .annotations
                    .iter()
                    .position(|a| a.original_index == Some(d))
                {
                    return i;
                }
                let det = &self.detections[d];
                self.annotations.push(Annotation {
                    id: Uuid::new_v4(),
                    bbox: BBox::from(det.bbox),
                    status: AnnotationStatus::Ai,
                    notes: det.notes.clone().unwrap_or_default(),
                    timestamp: Utc::now(),
                    user: self.operator.clone(),
                    original_index: Some(d),
                });
                self.annotations.len() - 1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(bbox: [f32; 4]) -> AiDetection {
        AiDetection {
            bbox,
            fault_type: "Loose Joint".into(),
            confidence_pct: Some(75.0),
            severity: Some("high".into()),
            no_anomaly: false,
            notes: None,
            evaluated_by: None,
        }
    }

    fn editor_with(detections: Vec<AiDetection>) -> AnnotationEditor {
        let mut ed = AnnotationEditor::new("tester");
        ed.load(detections);
        ed.view.set_natural(Vec2::new(640.0, 480.0));
        ed.view.set_viewport(eframe::egui::Rect::from_min_size(
            Pos2::ZERO,
            Vec2::new(640.0, 480.0),
        ));
        ed
    }

    #[test]
    fn drawing_commits_an_added_annotation() {
        let mut ed = editor_with(vec![]);
        ed.tool = Tool::Draw;
        ed.on_pointer_down(Pos2::new(10.0, 10.0));
        ed.on_pointer_move(Pos2::new(110.0, 60.0));
        ed.on_pointer_up();
        assert_eq!(ed.annotations.len(), 1);
        let ann = &ed.annotations[0];
        assert_eq!(ann.status, AnnotationStatus::Added);
        assert_eq!(ann.bbox, BBox::new(10.0, 10.0, 100.0, 50.0));
        assert_eq!(ann.user, "tester");
        assert!(ann.original_index.is_none());
    }

    #[test]
    fn zero_area_draw_produces_nothing() {
        let mut ed = editor_with(vec![]);
        ed.tool = Tool::Draw;
        ed.on_pointer_down(Pos2::new(42.0, 42.0));
        ed.on_pointer_up();
        assert!(ed.annotations.is_empty());
        // And leaves no dangling undo step behind.
        assert!(!ed.can_undo());
    }

    #[test]
    fn undo_restores_exact_prior_array_after_one_gesture() {
        let mut ed = editor_with(vec![detection([50.0, 50.0, 40.0, 40.0])]);
        ed.tool = Tool::Draw;
        ed.on_pointer_down(Pos2::new(200.0, 200.0));
        ed.on_pointer_move(Pos2::new(260.0, 240.0));
        ed.on_pointer_up();
        let before = ed.annotations.clone();

        // Drag the drawn box around: one gesture, many pointer moves.
        ed.tool = Tool::Select;
        ed.on_pointer_down(Pos2::new(230.0, 220.0));
        ed.on_pointer_move(Pos2::new(250.0, 220.0));
        ed.on_pointer_move(Pos2::new(300.0, 260.0));
        ed.on_pointer_up();
        assert_ne!(ed.annotations, before);

        ed.undo();
        assert_eq!(ed.annotations, before);
    }

    #[test]
    fn moving_a_detection_flips_it_to_edited() {
        let mut ed = editor_with(vec![detection([50.0, 50.0, 40.0, 40.0])]);
        ed.on_pointer_down(Pos2::new(70.0, 70.0));
        ed.on_pointer_move(Pos2::new(90.0, 70.0));
        ed.on_pointer_up();
        assert_eq!(ed.annotations.len(), 1);
        let ann = &ed.annotations[0];
        assert_eq!(ann.status, AnnotationStatus::Edited);
        assert_eq!(ann.original_index, Some(0));
        assert_eq!(ann.bbox, BBox::new(70.0, 50.0, 40.0, 40.0));
        // The replaced detection no longer renders.
        assert!(ed.detection_suppressed(0));
        assert!(ed.rendered_detections().is_empty());
    }

    #[test]
    fn click_without_drag_leaves_no_annotation_and_no_history() {
        let mut ed = editor_with(vec![detection([50.0, 50.0, 40.0, 40.0])]);
        ed.on_pointer_down(Pos2::new(70.0, 70.0));
        ed.on_pointer_up();
        assert!(ed.annotations.is_empty());
        assert!(!ed.can_undo());
        assert!(!ed.detection_suppressed(0));
        // The raw detection stays selected for note editing or deletion.
        assert_eq!(ed.selection, Some(Target::Detection(0)));
    }

    #[test]
    fn resize_by_corner_keeps_opposite_corner_anchored() {
        let mut ed = editor_with(vec![detection([100.0, 100.0, 50.0, 50.0])]);
        // Grab the bottom-right handle and stretch.
        ed.on_pointer_down(Pos2::new(150.0, 150.0));
        ed.on_pointer_move(Pos2::new(200.0, 180.0));
        ed.on_pointer_up();
        let ann = &ed.annotations[0];
        assert_eq!(ann.bbox, BBox::new(100.0, 100.0, 100.0, 80.0));
        assert_eq!(ann.status, AnnotationStatus::Edited);
    }

    #[test]
    fn deleted_annotation_never_renders_but_survives_in_the_set() {
        let mut ed = editor_with(vec![detection([50.0, 50.0, 40.0, 40.0])]);
        ed.delete(Target::Detection(0));
        assert_eq!(ed.annotations.len(), 1);
        assert_eq!(ed.annotations[0].status, AnnotationStatus::Deleted);
        assert_eq!(ed.visible_annotations().count(), 0);
        assert!(ed.rendered_detections().is_empty());
        // Still listed, marked deleted.
        let entries = ed.fault_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, AnnotationStatus::Deleted);
    }

    #[test]
    fn legacy_tombstone_without_index_suppresses_by_exact_bbox() {
        let mut ed = editor_with(vec![detection([50.0, 50.0, 40.0, 40.0])]);
        ed.annotations.push(Annotation {
            id: Uuid::new_v4(),
            bbox: BBox::new(50.0, 50.0, 40.0, 40.0),
            status: AnnotationStatus::Deleted,
            notes: String::new(),
            timestamp: Utc::now(),
            user: "tester".into(),
            original_index: None,
        });
        assert!(ed.detection_suppressed(0));
        // A near-miss bbox does not match: the legacy path is bit-exact.
        ed.annotations[0].bbox.x += 1e-4;
        assert!(!ed.detection_suppressed(0));
    }

    #[test]
    fn fault_list_dedups_by_bbox_preferring_the_operator_entry() {
        let mut ed = editor_with(vec![
            detection([50.0, 50.0, 40.0, 40.0]),
            detection([300.0, 200.0, 30.0, 30.0]),
        ]);
        // Note on detection 0 materializes an Edited twin at the same bbox.
        ed.set_notes(Target::Detection(0), "check clamp torque");
        let entries = ed.fault_entries();
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0].target, Target::Annotation(0)));
        assert_eq!(entries[0].notes, "check clamp torque");
        assert!(matches!(entries[1].target, Target::Detection(1)));
    }

    #[test]
    fn no_anomaly_detections_are_ignored() {
        let mut det = detection([10.0, 10.0, 5.0, 5.0]);
        det.no_anomaly = true;
        let ed = editor_with(vec![det]);
        assert!(ed.rendered_detections().is_empty());
        assert!(ed.fault_entries().is_empty());
    }

    #[test]
    fn at_most_one_annotation_per_detection_index() {
        let mut ed = editor_with(vec![detection([50.0, 50.0, 40.0, 40.0])]);
        ed.on_pointer_down(Pos2::new(70.0, 70.0));
        ed.on_pointer_move(Pos2::new(80.0, 70.0));
        ed.on_pointer_up();
        // Second edit of the same detection reuses the existing annotation.
        ed.on_pointer_down(Pos2::new(80.0, 70.0));
        ed.on_pointer_move(Pos2::new(90.0, 80.0));
        ed.on_pointer_up();
        assert_eq!(ed.annotations.len(), 1);
        assert_eq!(
            ed.annotations
                .iter()
                .filter(|a| a.original_index == Some(0))
                .count(),
            1
        );
    }

    #[test]
    fn pan_tool_moves_the_view_not_the_boxes() {
        let mut ed = editor_with(vec![detection([50.0, 50.0, 40.0, 40.0])]);
        ed.tool = Tool::Pan;
        ed.view.zoom_step(2.0);
        let before = ed.annotations.clone();
        let pan_before = ed.view.pan;
        ed.on_pointer_down(Pos2::new(300.0, 300.0));
        ed.on_pointer_move(Pos2::new(250.0, 260.0));
        ed.on_pointer_up();
        assert_eq!(ed.annotations, before);
        assert_ne!(ed.view.pan, pan_before);
        assert!(!ed.can_undo());
    }
}
