// src/state/transformer_state.rs
use crate::model::{Transformer, TransformerType};

/// Which column the free-text search applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBy {
    Number,
    Pole,
    Region,
    Type,
}

impl SearchBy {
    pub const ALL: [SearchBy; 4] = [
        SearchBy::Number,
        SearchBy::Pole,
        SearchBy::Region,
        SearchBy::Type,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SearchBy::Number => "Transformer No.",
            SearchBy::Pole => "Pole No.",
            SearchBy::Region => "Region",
            SearchBy::Type => "Type",
        }
    }
}

/// Transformer list plus its filter and pagination state. Every mutator
/// touches exactly the state it names (plus the page reset the filters
/// share); the view layer never reaches in directly.
#[derive(Debug)]
pub struct TransformerState {
    pub all: Vec<Transformer>,
    pub loading: bool,
    pub search: String,
    pub search_by: SearchBy,
    pub region_filter: Option<String>,
    pub type_filter: Option<TransformerType>,
    page: usize,
}

impl Default for TransformerState {
    fn default() -> Self {
        Self {
            all: Vec::new(),
            loading: false,
            search: String::new(),
            search_by: SearchBy::Number,
            region_filter: None,
            type_filter: None,
            page: 1,
        }
    }
}

impl TransformerState {
    pub fn set_rows(&mut self, rows: Vec<Transformer>) {
        self.all = rows;
        self.loading = false;
        self.page = 1;
    }

    pub fn set_search(&mut self, text: String) {
        self.search = text;
        self.page = 1;
    }

    /// Switching the search column clears the query, like the original
    /// filter bar.
    pub fn set_search_by(&mut self, by: SearchBy) {
        if self.search_by != by {
            self.search_by = by;
            self.search.clear();
            self.page = 1;
        }
    }

    pub fn set_region_filter(&mut self, region: Option<String>) {
        self.region_filter = region;
        self.page = 1;
    }

    pub fn set_type_filter(&mut self, ty: Option<TransformerType>) {
        self.type_filter = ty;
        self.page = 1;
    }

    pub fn reset_filters(&mut self) {
        self.search.clear();
        self.search_by = SearchBy::Number;
        self.region_filter = None;
        self.type_filter = None;
        self.page = 1;
    }

    /// Distinct regions present in the data, for the filter dropdown.
    pub fn regions(&self) -> Vec<String> {
        let mut regions: Vec<String> = self
            .all
            .iter()
            .map(|t| t.region.clone())
            .filter(|r| !r.is_empty())
            .collect();
        regions.sort();
        regions.dedup();
        regions
    }

    /// All filters compose (AND); the search is a case-insensitive substring
    /// match on the selected column.
    pub fn filtered(&self) -> Vec<&Transformer> {
        let needle = self.search.trim().to_lowercase();
        self.all
            .iter()
            .filter(|t| {
                let matches_search = needle.is_empty() || {
                    let haystack = match self.search_by {
                        SearchBy::Number => t.transformer_no.as_str(),
                        SearchBy::Pole => t.pole_no.as_str(),
                        SearchBy::Region => t.region.as_str(),
                        SearchBy::Type => t.type_label(),
                    };
                    haystack.to_lowercase().contains(&needle)
                };
                let matches_region = self
                    .region_filter
                    .as_ref()
                    .is_none_or(|r| &t.region == r);
                let matches_type = self
                    .type_filter
                    .is_none_or(|ty| t.transformer_type == Some(ty));
                matches_search && matches_region && matches_type
            })
            .collect()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self, page_size: usize) -> usize {
        let len = self.filtered().len();
        len.div_ceil(page_size.max(1)).max(1)
    }

    pub fn set_page(&mut self, page: usize, page_size: usize) {
        self.page = page.clamp(1, self.total_pages(page_size));
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    pub fn next_page(&mut self, page_size: usize) {
        self.set_page(self.page + 1, page_size);
    }

    /// The visible slice of the filtered rows.
    pub fn current_rows(&self, page_size: usize) -> Vec<&Transformer> {
        let page_size = page_size.max(1);
        let start = (self.page.saturating_sub(1)) * page_size;
        self.filtered()
            .into_iter()
            .skip(start)
            .take(page_size)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transformer(no: &str, pole: &str, region: &str, ty: TransformerType) -> Transformer {
        Transformer {
            transformer_no: no.into(),
            pole_no: pole.into(),
            region: region.into(),
            transformer_type: Some(ty),
            location: String::new(),
            capacity: None,
        }
    }

    fn state() -> TransformerState {
        let mut s = TransformerState::default();
        s.set_rows(vec![
            transformer("AZ-1001", "P-11", "Nugegoda", TransformerType::Bulk),
            transformer("AZ-1002", "P-12", "Maharagama", TransformerType::Distribution),
            transformer("AZ-2001", "P-21", "Nugegoda", TransformerType::Distribution),
            transformer("BX-3001", "P-31", "Maharagama", TransformerType::Bulk),
        ]);
        s
    }

    #[test]
    fn search_is_case_insensitive_substring_on_selected_column() {
        let mut s = state();
        s.set_search("az-1".into());
        let nos: Vec<&str> = s.filtered().iter().map(|t| t.transformer_no.as_str()).collect();
        assert_eq!(nos, vec!["AZ-1001", "AZ-1002"]);

        s.set_search_by(SearchBy::Pole);
        assert!(s.search.is_empty(), "switching the column clears the query");
        s.set_search("p-2".into());
        let nos: Vec<&str> = s.filtered().iter().map(|t| t.transformer_no.as_str()).collect();
        assert_eq!(nos, vec!["AZ-2001"]);
    }

    #[test]
    fn filters_compose_with_and_semantics() {
        let mut s = state();
        s.set_region_filter(Some("Maharagama".into()));
        s.set_type_filter(Some(TransformerType::Bulk));
        let nos: Vec<&str> = s.filtered().iter().map(|t| t.transformer_no.as_str()).collect();
        assert_eq!(nos, vec!["BX-3001"]);
    }

    #[test]
    fn each_reducer_touches_only_its_own_state() {
        let mut s = state();
        s.set_page(2, 2);

        s.set_search("az".into());
        assert_eq!(s.region_filter, None);
        assert_eq!(s.type_filter, None);
        assert_eq!(s.search_by, SearchBy::Number);
        assert_eq!(s.page(), 1, "filter changes reset pagination");

        s.set_page(2, 2);
        s.set_region_filter(Some("Nugegoda".into()));
        assert_eq!(s.search, "az", "region filter leaves the search alone");
        assert_eq!(s.type_filter, None);
        assert_eq!(s.page(), 1);

        s.set_type_filter(Some(TransformerType::Bulk));
        assert_eq!(s.region_filter.as_deref(), Some("Nugegoda"));
        assert_eq!(s.search, "az");
    }

    #[test]
    fn reset_filters_restores_defaults_without_touching_rows() {
        let mut s = state();
        s.set_search("az".into());
        s.set_region_filter(Some("Nugegoda".into()));
        s.set_type_filter(Some(TransformerType::Bulk));
        s.reset_filters();
        assert!(s.search.is_empty());
        assert_eq!(s.region_filter, None);
        assert_eq!(s.type_filter, None);
        assert_eq!(s.page(), 1);
        assert_eq!(s.all.len(), 4);
    }

    #[test]
    fn pagination_clamps_and_slices() {
        let mut s = state();
        assert_eq!(s.total_pages(2), 2);
        assert_eq!(s.current_rows(2).len(), 2);
        s.next_page(2);
        assert_eq!(s.page(), 2);
        let nos: Vec<&str> = s
            .current_rows(2)
            .iter()
            .map(|t| t.transformer_no.as_str())
            .collect();
        assert_eq!(nos, vec!["AZ-2001", "BX-3001"]);
        s.next_page(2);
        assert_eq!(s.page(), 2, "cannot page past the end");
        s.prev_page();
        s.prev_page();
        assert_eq!(s.page(), 1, "cannot page before the start");
    }

    #[test]
    fn empty_filter_result_still_reports_one_page() {
        let mut s = state();
        s.set_search("does-not-exist".into());
        assert_eq!(s.total_pages(10), 1);
        assert!(s.current_rows(10).is_empty());
    }

    #[test]
    fn regions_are_sorted_and_deduplicated() {
        let s = state();
        assert_eq!(s.regions(), vec!["Maharagama".to_string(), "Nugegoda".to_string()]);
    }
}
