// src/state/inspection_state.rs
use crate::model::{BaselineImageSet, Inspection};

/// Inspection list for the currently viewed transformer, plus that
/// transformer's baseline set.
#[derive(Debug, Default)]
pub struct InspectionState {
    /// Which transformer the rows belong to; answers for other transformers
    /// arriving late are ignored.
    pub transformer_no: Option<String>,
    pub rows: Vec<Inspection>,
    pub baseline: Option<BaselineImageSet>,
    pub loading: bool,
}

impl InspectionState {
    pub fn open(&mut self, transformer_no: String) {
        if self.transformer_no.as_deref() != Some(&transformer_no) {
            self.rows.clear();
            self.baseline = None;
        }
        self.transformer_no = Some(transformer_no);
        self.loading = true;
    }

    pub fn set_rows(&mut self, transformer_no: &str, rows: Vec<Inspection>) {
        if self.transformer_no.as_deref() == Some(transformer_no) {
            self.rows = rows;
            self.loading = false;
        }
    }

    pub fn set_baseline(&mut self, transformer_no: &str, baseline: Option<BaselineImageSet>) {
        if self.transformer_no.as_deref() == Some(transformer_no) {
            self.baseline = baseline;
        }
    }

    /// Client-side only; the backend has no favorite flag.
    pub fn toggle_favorite(&mut self, inspection_no: &str) {
        if let Some(row) = self.rows.iter_mut().find(|r| r.inspection_no == inspection_no) {
            row.favorite = !row.favorite;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InspectionStatus;

    fn inspection(no: &str) -> Inspection {
        Inspection {
            inspection_no: no.into(),
            transformer_no: "T-1".into(),
            branch: "Nugegoda".into(),
            date: "2026-08-01".into(),
            time: "09:00:00".into(),
            status: InspectionStatus::Pending,
            inspected_by: None,
            maintenance_date: None,
            favorite: false,
        }
    }

    #[test]
    fn stale_answers_for_other_transformers_are_ignored() {
        let mut s = InspectionState::default();
        s.open("T-1".into());
        s.set_rows("T-9", vec![inspection("I-1")]);
        assert!(s.rows.is_empty());
        assert!(s.loading);
        s.set_rows("T-1", vec![inspection("I-1")]);
        assert_eq!(s.rows.len(), 1);
        assert!(!s.loading);
    }

    #[test]
    fn favorite_toggle_touches_only_the_named_row() {
        let mut s = InspectionState::default();
        s.open("T-1".into());
        s.set_rows("T-1", vec![inspection("I-1"), inspection("I-2")]);
        s.toggle_favorite("I-2");
        assert!(!s.rows[0].favorite);
        assert!(s.rows[1].favorite);
        s.toggle_favorite("I-2");
        assert!(!s.rows[1].favorite);
    }
}
