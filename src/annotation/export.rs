// src/annotation/export.rs
use chrono::Local;
use serde::Serialize;

use super::editor::AnnotationEditor;

/// One confirmed evaluation row, field names normalized to what the backend
/// `createEvalResults` endpoint stores.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvalRecord {
    pub inspection_no: String,
    pub transformer_no: String,
    pub anomaly_status: String,
    pub fault_type: String,
    pub fault_severity: String,
    pub fault_confidence: String,
    pub bbox: String,
    pub notes: String,
    pub evaluated_by: String,
    pub evaluated_date: String,
}

/// Serialize the whole in-memory annotation set, tombstones included, so the
/// backend can record deletions. One record per annotation, no filtering.
pub fn confirm_records(
    editor: &AnnotationEditor,
    inspection_no: &str,
    transformer_no: &str,
) -> Vec<EvalRecord> {
    let evaluated_date = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    editor
        .annotations
        .iter()
        .map(|ann| {
            let det = ann.original_index.and_then(|i| editor.detections.get(i));
            EvalRecord {
                inspection_no: inspection_no.to_string(),
                transformer_no: transformer_no.to_string(),
                anomaly_status: ann.status.wire_value().to_string(),
                fault_type: det
                    .map(|d| d.fault_type.clone())
                    .unwrap_or_else(|| "Manual".to_string()),
                fault_severity: det
                    .and_then(|d| d.severity.clone())
                    .unwrap_or_default(),
                fault_confidence: det
                    .and_then(|d| d.confidence_pct)
                    .map(|c| format!("{c:.1}"))
                    .unwrap_or_default(),
                bbox: format_bbox(ann.bbox.as_array()),
                notes: ann.notes.clone(),
                evaluated_by: ann.user.clone(),
                evaluated_date: evaluated_date.clone(),
            }
        })
        .collect()
}

/// The backend persists bbox columns as stringified lists.
fn format_bbox(b: [f32; 4]) -> String {
    format!("[{}, {}, {}, {}]", b[0], b[1], b[2], b[3])
}

/// Report blobs are written as received, except that JSON gets pretty-printed
/// before it lands on disk.
pub fn prepare_report(blob: &[u8]) -> Vec<u8> {
    match serde_json::from_slice::<serde_json::Value>(blob) {
        Ok(value) => serde_json::to_vec_pretty(&value).unwrap_or_else(|_| blob.to_vec()),
        Err(_) => blob.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{Pos2, Rect, Vec2};

    use super::*;
    use crate::annotation::editor::{Target, Tool};
    use crate::model::AiDetection;

    fn editor() -> AnnotationEditor {
        let mut ed = AnnotationEditor::new("tester");
        ed.load(vec![AiDetection {
            bbox: [50.0, 50.0, 40.0, 40.0],
            fault_type: "Point Overload".into(),
            confidence_pct: Some(62.5),
            severity: Some("medium".into()),
            no_anomaly: false,
            notes: None,
            evaluated_by: None,
        }]);
        ed.view.set_natural(Vec2::new(640.0, 480.0));
        ed.view
            .set_viewport(Rect::from_min_size(Pos2::ZERO, Vec2::new(640.0, 480.0)));
        ed
    }

    #[test]
    fn payload_length_matches_annotation_count_for_any_status_mix() {
        let mut ed = editor();
        // One edited detection, one drawn box, one deletion of the drawn box.
        ed.on_pointer_down(Pos2::new(70.0, 70.0));
        ed.on_pointer_move(Pos2::new(95.0, 70.0));
        ed.on_pointer_up();
        ed.tool = Tool::Draw;
        ed.on_pointer_down(Pos2::new(200.0, 200.0));
        ed.on_pointer_move(Pos2::new(260.0, 250.0));
        ed.on_pointer_up();
        ed.delete(Target::Annotation(1));

        let records = confirm_records(&ed, "I-7", "T-3");
        assert_eq!(records.len(), ed.annotations.len());
        assert_eq!(records.len(), 2);
        let statuses: Vec<&str> = records.iter().map(|r| r.anomaly_status.as_str()).collect();
        assert_eq!(statuses, vec!["edited", "deleted"]);
    }

    #[test]
    fn deleted_records_are_exported_with_their_tombstone_status() {
        let mut ed = editor();
        ed.delete(Target::Detection(0));
        let records = confirm_records(&ed, "I-7", "T-3");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].anomaly_status, "deleted");
        assert_eq!(records[0].fault_type, "Point Overload");
        assert_eq!(records[0].fault_confidence, "62.5");
        assert_eq!(records[0].bbox, "[50, 50, 40, 40]");
        assert_eq!(records[0].evaluated_by, "tester");
    }

    #[test]
    fn manual_boxes_export_without_detection_metadata() {
        let mut ed = editor();
        ed.tool = Tool::Draw;
        ed.on_pointer_down(Pos2::new(10.0, 10.0));
        ed.on_pointer_move(Pos2::new(30.5, 20.0));
        ed.on_pointer_up();
        let records = confirm_records(&ed, "I-7", "T-3");
        assert_eq!(records[0].fault_type, "Manual");
        assert_eq!(records[0].fault_severity, "");
        assert_eq!(records[0].bbox, "[10, 10, 20.5, 10]");
    }

    #[test]
    fn serialized_field_names_are_normalized() {
        let mut ed = editor();
        ed.delete(Target::Detection(0));
        let json =
            serde_json::to_value(&confirm_records(&ed, "I-7", "T-3")).expect("serializable");
        let first = &json[0];
        for key in [
            "inspectionNo",
            "transformerNo",
            "anomalyStatus",
            "faultType",
            "faultSeverity",
            "faultConfidence",
            "bbox",
            "notes",
            "evaluatedBy",
            "evaluatedDate",
        ] {
            assert!(first.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn json_reports_are_pretty_printed_and_binary_passes_through() {
        let pretty = prepare_report(br#"{"a":1,"b":[2,3]}"#);
        let text = String::from_utf8(pretty).expect("utf8");
        assert!(text.contains("\n"));
        assert!(text.contains("\"a\": 1"));

        let binary = vec![0x89u8, 0x50, 0x4e, 0x47];
        assert_eq!(prepare_report(&binary), binary);
    }
}
