mod filter;
mod model;
mod pages;
mod sort;
mod table;

pub use filter::{SurveyFilterField, SurveyFilters};
pub use model::SurveyResponse;
pub use pages::{PageWindow, SURVEY_PAGE_SIZE};
pub use sort::{SurveySort, SurveySortField};
pub use table::{SurveySnapshot, SurveyTable};
