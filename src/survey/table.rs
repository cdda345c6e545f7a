use serde::Serialize;
use serde_json::Value;

use crate::survey::filter::{SurveyFilterField, SurveyFilters};
use crate::survey::model::SurveyResponse;
use crate::survey::pages::PageWindow;
use crate::survey::sort::{SurveySort, SurveySortField};

/// View over one loaded survey form: the full response set arrives in a
/// single load and every later interaction (filter, search, sort, paging)
/// reworks that in-memory list.
#[derive(Debug)]
pub struct SurveyTable {
    form_id: Option<String>,
    responses: Vec<SurveyResponse>,
    filters: SurveyFilters,
    sort: SurveySort,
    pages: PageWindow,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySnapshot {
    pub form_id: Option<String>,
    pub rows: Vec<SurveyResponse>,
    pub total_responses: usize,
    pub total_filtered: usize,
    pub current_page: usize,
    pub per_page: usize,
    pub has_more: bool,
    pub filters: Value,
    pub sort: Value,
    pub has_active_filters: bool,
    pub is_sorting: bool,
}

impl Default for SurveyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SurveyTable {
    pub fn new() -> Self {
        SurveyTable {
            form_id: None,
            responses: Vec::new(),
            filters: SurveyFilters::new(),
            sort: SurveySort::new(),
            pages: PageWindow::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.form_id.is_some()
    }

    pub fn form_id(&self) -> Option<&str> {
        self.form_id.as_deref()
    }

    /// Replaces the whole table with a freshly loaded form. Filters, sort
    /// and paging all start over.
    pub fn load(&mut self, form_id: &str, responses: Vec<SurveyResponse>) {
        self.form_id = Some(form_id.to_string());
        self.responses = responses;
        self.filters = SurveyFilters::new();
        self.sort = SurveySort::new();
        self.pages.reset();
    }

    pub fn set_filter(&mut self, field: &str, value: &str) -> bool {
        let Some(field) = SurveyFilterField::parse(field) else {
            return false;
        };
        self.filters.set(field, value);
        self.pages.reset();
        true
    }

    pub fn set_search(&mut self, text: &str) {
        self.filters.set_search(text);
        self.pages.reset();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.pages.reset();
    }

    pub fn request_sort(&mut self, field: &str) -> bool {
        let Some(field) = SurveySortField::parse(field) else {
            return false;
        };
        self.sort.request_sort(field);
        true
    }

    pub fn sort_icon(&self, field: &str) -> Option<&'static str> {
        SurveySortField::parse(field).map(|f| self.sort.icon_for(f))
    }

    pub fn load_more(&mut self) -> bool {
        let total = self.filters.apply(&self.responses).len();
        self.pages.load_more(total)
    }

    pub fn snapshot(&self) -> SurveySnapshot {
        let filtered = self.filters.apply(&self.responses);
        let total_filtered = filtered.len();
        let sorted = self.sort.apply(filtered);
        let rows = self.pages.visible(&sorted).to_vec();
        SurveySnapshot {
            form_id: self.form_id.clone(),
            rows,
            total_responses: self.responses.len(),
            total_filtered,
            current_page: self.pages.current_page(),
            per_page: self.pages.per_page(),
            has_more: self.pages.has_more(total_filtered),
            filters: serde_json::to_value(&self.filters).unwrap_or(Value::Null),
            sort: serde_json::to_value(self.sort).unwrap_or(Value::Null),
            has_active_filters: self.filters.has_active(),
            is_sorting: self.sort.is_sorting(),
        }
    }
}
