// src/api/types.rs
//
// Wire DTOs and the typed boundary parser. The backend stringifies almost
// every column, and `String.valueOf(null)` leaks literal "null" values into
// payloads, so each field decodes into `Field<T>` here and nothing downstream
// ever sniffs strings again.
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::model::{
    AiDetection, BaselineImageSet, ComparisonPayload, ImageAttribution, Inspection,
    InspectionStatus, Transformer, TransformerType,
};

// ----------------------------------------------------------------------
// Field<T>: Present | Missing
// ----------------------------------------------------------------------

/// A backend field after normalization. Absent keys, JSON null, empty
/// strings, the literal "null", and unparseable values all collapse to
/// `Missing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<T> {
    Present(T),
    Missing,
}

impl<T> Field<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Present(v) => Some(v),
            Field::Missing => None,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        self.into_option().unwrap_or(default)
    }
}

impl<T: Default> Field<T> {
    pub fn unwrap_or_default(self) -> T {
        self.into_option().unwrap_or_default()
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Missing
    }
}

/// Decoding one wire value into a concrete type. Implementations are
/// lenient: the backend's stringified numbers and lists must parse too.
pub trait FromWire: Sized {
    fn from_wire(value: &Value) -> Option<Self>;
}

fn effective_str(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() || t.eq_ignore_ascii_case("null") {
                None
            } else {
                Some(t)
            }
        }
        _ => None,
    }
}

impl FromWire for String {
    fn from_wire(value: &Value) -> Option<Self> {
        match value {
            Value::String(_) => effective_str(value).map(str::to_string),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl FromWire for f32 {
    fn from_wire(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(|f| f as f32),
            Value::String(_) => effective_str(value)?.parse().ok(),
            _ => None,
        }
    }
}

/// Bboxes arrive either as a JSON array or, after a round trip through the
/// backend's string columns, as "[x, y, w, h]".
impl FromWire for [f32; 4] {
    fn from_wire(value: &Value) -> Option<Self> {
        let values: Vec<f32> = match value {
            Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_f64().map(|f| f as f32))
                .collect(),
            Value::String(_) => effective_str(value)?
                .trim_start_matches('[')
                .trim_end_matches(']')
                .split(',')
                .filter_map(|part| part.trim().parse().ok())
                .collect(),
            _ => return None,
        };
        if values.len() == 4 {
            Some([values[0], values[1], values[2], values[3]])
        } else {
            None
        }
    }
}

impl<'de, T: FromWire> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(Value::Null) => Field::Missing,
            Some(v) => match T::from_wire(&v) {
                Some(t) => Field::Present(t),
                None => Field::Missing,
            },
        })
    }
}

// ----------------------------------------------------------------------
// Response DTOs
// ----------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformerDto {
    pub transformer_no: Field<String>,
    pub transformer_pole_no: Field<String>,
    pub transformer_region: Field<String>,
    pub transformer_type: Field<String>,
    pub transformer_location: Field<String>,
    pub transformer_capacity: Field<String>,
}

impl TransformerDto {
    /// Rows without a transformer number are unaddressable and dropped.
    pub fn into_transformer(self) -> Option<Transformer> {
        Some(Transformer {
            transformer_no: self.transformer_no.into_option()?,
            pole_no: self.transformer_pole_no.unwrap_or_default(),
            region: self.transformer_region.unwrap_or_default(),
            transformer_type: self
                .transformer_type
                .into_option()
                .and_then(|s| TransformerType::parse(&s)),
            location: self.transformer_location.unwrap_or_default(),
            capacity: self.transformer_capacity.into_option(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InspectionDto {
    pub inspection_no: Field<String>,
    pub transformer_no: Field<String>,
    pub inspection_branch: Field<String>,
    pub inspection_date: Field<String>,
    pub inspection_time: Field<String>,
    pub inspection_status: Field<String>,
    #[serde(rename = "inspectedby")]
    pub inspected_by: Field<String>,
    pub maintenance_date: Field<String>,
}

impl InspectionDto {
    pub fn into_inspection(self) -> Option<Inspection> {
        Some(Inspection {
            inspection_no: self.inspection_no.into_option()?,
            transformer_no: self.transformer_no.unwrap_or_default(),
            branch: self.inspection_branch.unwrap_or_default(),
            date: self.inspection_date.unwrap_or_default(),
            time: self.inspection_time.unwrap_or_default(),
            status: InspectionStatus::parse(self.inspection_status.into_option().as_deref()),
            inspected_by: self.inspected_by.into_option(),
            maintenance_date: self.maintenance_date.into_option(),
            favorite: false,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BaselineDto {
    pub transformer_no: Field<String>,
    pub sunny_image_url: Field<String>,
    pub cloudy_image_url: Field<String>,
    pub rainy_image_url: Field<String>,
    pub uploaded_by: Field<String>,
    pub uploaded_date: Field<String>,
    pub uploaded_time: Field<String>,
}

impl BaselineDto {
    pub fn into_set(self, transformer_no: &str) -> BaselineImageSet {
        BaselineImageSet {
            transformer_no: self.transformer_no.unwrap_or(transformer_no.to_string()),
            sunny_url: self.sunny_image_url.into_option(),
            cloudy_url: self.cloudy_image_url.into_option(),
            rainy_url: self.rainy_image_url.into_option(),
            attribution: ImageAttribution {
                uploaded_by: self.uploaded_by.into_option(),
                uploaded_date: self.uploaded_date.into_option(),
                uploaded_time: self.uploaded_time.into_option(),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AiResultDto {
    pub fault_status: Field<String>,
    pub fault_type: Field<String>,
    pub fault_severity: Field<String>,
    pub fault_confidence: Field<String>,
    pub bbox: Field<[f32; 4]>,
    pub notes: Field<String>,
    pub evaluated_by: Field<String>,
}

impl AiResultDto {
    /// Records without a usable bbox cannot be drawn and are dropped.
    pub fn into_detection(self) -> Option<AiDetection> {
        let Field::Present(bbox) = self.bbox else {
            warn!("dropping fault record without a parseable bbox");
            return None;
        };
        Some(AiDetection {
            bbox,
            fault_type: self.fault_type.unwrap_or_else_default(),
            confidence_pct: self
                .fault_confidence
                .into_option()
                .and_then(|s| s.parse::<f32>().ok())
                .map(AiDetection::normalize_confidence),
            severity: self.fault_severity.into_option(),
            no_anomaly: self
                .fault_status
                .into_option()
                .is_some_and(|s| s.eq_ignore_ascii_case("no_anomaly")),
            notes: self.notes.into_option(),
            evaluated_by: self.evaluated_by.into_option(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComparisonDto {
    pub base_image_url: Field<String>,
    pub base_image_uploaded_by: Field<String>,
    pub base_image_uploaded_date: Field<String>,
    pub base_image_uploaded_time: Field<String>,
    pub thermal: Field<String>,
    pub thermal_uploaded_by: Field<String>,
    pub thermal_uploaded_date: Field<String>,
    pub thermal_uploaded_time: Field<String>,
    pub ai_results: Vec<AiResultDto>,
}

impl ComparisonDto {
    pub fn into_payload(self) -> ComparisonPayload {
        ComparisonPayload {
            baseline_png: self.base_image_url.into_option().and_then(decode_image),
            baseline_attribution: ImageAttribution {
                uploaded_by: self.base_image_uploaded_by.into_option(),
                uploaded_date: self.base_image_uploaded_date.into_option(),
                uploaded_time: self.base_image_uploaded_time.into_option(),
            },
            thermal_png: self.thermal.into_option().and_then(decode_image),
            thermal_attribution: ImageAttribution {
                uploaded_by: self.thermal_uploaded_by.into_option(),
                uploaded_date: self.thermal_uploaded_date.into_option(),
                uploaded_time: self.thermal_uploaded_time.into_option(),
            },
            detections: self
                .ai_results
                .into_iter()
                .filter_map(AiResultDto::into_detection)
                .collect(),
        }
    }
}

/// Images travel as base64, optionally behind a data-URI prefix. The
/// placeholder "exist" (baseline present but no slot for this weather)
/// yields no image.
fn decode_image(encoded: String) -> Option<Vec<u8>> {
    let data = encoded
        .split_once("base64,")
        .map(|(_, rest)| rest)
        .unwrap_or(&encoded);
    base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .ok()
}

// ----------------------------------------------------------------------
// Request DTOs
// ----------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransformer {
    pub transformer_no: String,
    pub transformer_pole_no: String,
    pub transformer_region: String,
    pub transformer_type: String,
    pub transformer_location: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInspection {
    pub transformer_no: String,
    pub inspection_branch: String,
    pub inspection_date: String,
    pub inspection_time: String,
    #[serde(rename = "inspectedby")]
    pub inspected_by: String,
}

trait FieldStringExt {
    fn unwrap_or_else_default(self) -> String;
}

impl FieldStringExt for Field<String> {
    fn unwrap_or_else_default(self) -> String {
        self.into_option().unwrap_or_else(|| "Unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_null_variants_collapse() {
        #[derive(Debug, Default, Deserialize)]
        #[serde(default)]
        struct Probe {
            a: Field<String>,
            b: Field<String>,
            c: Field<String>,
            d: Field<String>,
            e: Field<f32>,
        }
        let probe: Probe =
            serde_json::from_str(r#"{"a": null, "b": "null", "c": "  ", "e": "oops"}"#)
                .expect("parses");
        assert_eq!(probe.a, Field::Missing);
        assert_eq!(probe.b, Field::Missing);
        assert_eq!(probe.c, Field::Missing);
        assert_eq!(probe.d, Field::Missing);
        assert_eq!(probe.e, Field::Missing);
    }

    #[test]
    fn stringified_numbers_and_lists_parse() {
        let dto: AiResultDto = serde_json::from_str(
            r#"{
                "faultStatus": "anomaly",
                "faultType": "Loose Joint",
                "faultSeverity": "high",
                "faultConfidence": "0.85",
                "bbox": "[120, 44, 60, 32]"
            }"#,
        )
        .expect("parses");
        let det = dto.into_detection().expect("usable");
        assert_eq!(det.bbox, [120.0, 44.0, 60.0, 32.0]);
        assert_eq!(det.confidence_pct, Some(85.0));
        assert!(!det.no_anomaly);
    }

    #[test]
    fn array_bbox_and_percent_confidence_parse_too() {
        let dto: AiResultDto = serde_json::from_str(
            r#"{"faultType": "Wire Overload", "faultConfidence": "62", "bbox": [1, 2, 3, 4]}"#,
        )
        .expect("parses");
        let det = dto.into_detection().expect("usable");
        assert_eq!(det.bbox, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(det.confidence_pct, Some(62.0));
    }

    #[test]
    fn records_without_bbox_are_dropped() {
        let dto: AiResultDto =
            serde_json::from_str(r#"{"faultType": "X", "bbox": "null"}"#).expect("parses");
        assert!(dto.into_detection().is_none());
    }

    #[test]
    fn no_anomaly_flag_is_recognized() {
        let dto: AiResultDto = serde_json::from_str(
            r#"{"faultStatus": "no_anomaly", "bbox": "[0, 0, 1, 1]"}"#,
        )
        .expect("parses");
        assert!(dto.into_detection().expect("usable").no_anomaly);
    }

    #[test]
    fn transformer_rows_without_a_number_are_dropped() {
        let dto: TransformerDto = serde_json::from_str(
            r#"{"transformerRegion": "Nugegoda", "transformerType": "Bulk"}"#,
        )
        .expect("parses");
        assert!(dto.into_transformer().is_none());

        let dto: TransformerDto = serde_json::from_str(
            r#"{"transformerNo": "AZ-1001", "transformerType": "bulk"}"#,
        )
        .expect("parses");
        let t = dto.into_transformer().expect("kept");
        assert_eq!(t.transformer_no, "AZ-1001");
        assert_eq!(t.transformer_type, Some(TransformerType::Bulk));
    }

    #[test]
    fn inspection_status_defaults_to_pending_when_null() {
        let dto: InspectionDto = serde_json::from_str(
            r#"{"inspectionNo": "I-9", "inspectionStatus": null, "inspectedby": "Fernando"}"#,
        )
        .expect("parses");
        let insp = dto.into_inspection().expect("kept");
        assert_eq!(insp.status, InspectionStatus::Pending);
        assert_eq!(insp.inspected_by.as_deref(), Some("Fernando"));
    }

    #[test]
    fn comparison_payload_decodes_images_and_skips_placeholders() {
        let png = base64::engine::general_purpose::STANDARD.encode([1u8, 2, 3]);
        let json = format!(
            r#"{{
                "baseImageUrl": "exist",
                "thermal": "data:image/png;base64,{png}",
                "thermalUploadedBy": "Fernando",
                "aiResults": [{{"faultType": "Hot Spot", "bbox": "[5, 5, 10, 10]"}}]
            }}"#
        );
        let dto: ComparisonDto = serde_json::from_str(&json).expect("parses");
        let payload = dto.into_payload();
        assert!(payload.baseline_png.is_none());
        assert_eq!(payload.thermal_png.as_deref(), Some(&[1u8, 2, 3][..]));
        assert_eq!(payload.detections.len(), 1);
        assert_eq!(
            payload.thermal_attribution.uploaded_by.as_deref(),
            Some("Fernando")
        );
    }
}
