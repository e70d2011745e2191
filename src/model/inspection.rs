// src/model/inspection.rs
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InspectionStatus {
    Pending,
    InProgress,
    Completed,
}

impl InspectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InspectionStatus::Pending => "Pending",
            InspectionStatus::InProgress => "In Progress",
            InspectionStatus::Completed => "Completed",
        }
    }

    /// Wire values are `completed | progress | pending`; anything missing or
    /// unrecognized counts as pending.
    pub fn parse(s: Option<&str>) -> InspectionStatus {
        match s.map(str::trim) {
            Some("completed") => InspectionStatus::Completed,
            Some("progress") => InspectionStatus::InProgress,
            _ => InspectionStatus::Pending,
        }
    }
}

impl fmt::Display for InspectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inspection {
    pub inspection_no: String,
    pub transformer_no: String,
    pub branch: String,
    pub date: String,
    pub time: String,
    pub status: InspectionStatus,
    pub inspected_by: Option<String>,
    pub maintenance_date: Option<String>,
    /// Client-side only, never persisted.
    #[serde(skip)]
    pub favorite: bool,
}

impl Inspection {
    /// "date time" the way the tables print it, time omitted when absent.
    pub fn inspected_at(&self) -> String {
        if self.time.is_empty() {
            self.date.clone()
        } else {
            format!("{} {}", self.date, self.time)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_defaults_to_pending() {
        assert_eq!(InspectionStatus::parse(None), InspectionStatus::Pending);
        assert_eq!(
            InspectionStatus::parse(Some("completed")),
            InspectionStatus::Completed
        );
        assert_eq!(
            InspectionStatus::parse(Some("progress")),
            InspectionStatus::InProgress
        );
        assert_eq!(
            InspectionStatus::parse(Some("garbage")),
            InspectionStatus::Pending
        );
    }

    #[test]
    fn inspected_at_handles_missing_time() {
        let mut insp = Inspection {
            inspection_no: "I-1".into(),
            transformer_no: "T-1".into(),
            branch: "Nugegoda".into(),
            date: "2026-08-01".into(),
            time: "10:30:00".into(),
            status: InspectionStatus::Pending,
            inspected_by: None,
            maintenance_date: None,
            favorite: false,
        };
        assert_eq!(insp.inspected_at(), "2026-08-01 10:30:00");
        insp.time.clear();
        assert_eq!(insp.inspected_at(), "2026-08-01");
    }
}
