// src/model/imagery.rs
use std::fmt;

use serde::{Deserialize, Serialize};

use super::fault::AiDetection;

/// Weather under which a baseline slot (or a thermal capture) was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    Rainy,
}

impl WeatherCondition {
    pub const ALL: [WeatherCondition; 3] = [
        WeatherCondition::Sunny,
        WeatherCondition::Cloudy,
        WeatherCondition::Rainy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Sunny => "Sunny",
            WeatherCondition::Cloudy => "Cloudy",
            WeatherCondition::Rainy => "Rainy",
        }
    }

    /// Multipart field name of the matching baseline slot.
    pub fn slot_field(&self) -> &'static str {
        match self {
            WeatherCondition::Sunny => "baseImageSunny",
            WeatherCondition::Cloudy => "baseImageCloudy",
            WeatherCondition::Rainy => "baseImageRainy",
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who uploaded an image and when, as the backend records it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageAttribution {
    pub uploaded_by: Option<String>,
    pub uploaded_date: Option<String>,
    pub uploaded_time: Option<String>,
}

impl ImageAttribution {
    pub fn caption(&self) -> String {
        let when = match (&self.uploaded_date, &self.uploaded_time) {
            (Some(d), Some(t)) => format!("{d} {t}"),
            (Some(d), None) => d.clone(),
            _ => "unknown time".to_string(),
        };
        let who = self.uploaded_by.as_deref().unwrap_or("unknown");
        format!("Uploaded {when} by {who}")
    }
}

/// The reference photo set of a transformer, one URL per weather slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaselineImageSet {
    pub transformer_no: String,
    pub sunny_url: Option<String>,
    pub cloudy_url: Option<String>,
    pub rainy_url: Option<String>,
    pub attribution: ImageAttribution,
}

/// Decoded inspection-image payload: the thermal capture, the matching
/// baseline (when one exists for the capture's weather), and the fault
/// records to seed the annotation editor with.
#[derive(Debug, Clone, Default)]
pub struct ComparisonPayload {
    pub baseline_png: Option<Vec<u8>>,
    pub baseline_attribution: ImageAttribution,
    pub thermal_png: Option<Vec<u8>>,
    pub thermal_attribution: ImageAttribution,
    pub detections: Vec<AiDetection>,
}
