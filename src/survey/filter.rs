use serde::Serialize;

use crate::survey::model::SurveyResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyFilterField {
    AgeGroup,
    SchoolType,
    Religion,
    CasteCommunity,
    ParentalEducation,
    ParentalOccupation,
    SportsParticipationStatus,
    SportsFrequency,
    MenarcheStatus,
    MenstrualProductUse,
}

impl SurveyFilterField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ageGroup" => Some(SurveyFilterField::AgeGroup),
            "schoolType" => Some(SurveyFilterField::SchoolType),
            "religion" => Some(SurveyFilterField::Religion),
            "casteCommunity" => Some(SurveyFilterField::CasteCommunity),
            "parentalEducation" => Some(SurveyFilterField::ParentalEducation),
            "parentalOccupation" => Some(SurveyFilterField::ParentalOccupation),
            "sportsParticipationStatus" => Some(SurveyFilterField::SportsParticipationStatus),
            "sportsFrequency" => Some(SurveyFilterField::SportsFrequency),
            "menarcheStatus" => Some(SurveyFilterField::MenarcheStatus),
            "menstrualProductUse" => Some(SurveyFilterField::MenstrualProductUse),
            _ => None,
        }
    }
}

/// Survey-table predicates. Each demographic field holds one selection
/// string; a comma-separated selection acts as an OR over its values (the
/// sidebar sends multi-select picks that way). `search` matches name, email
/// and respondent id, case-insensitively. Empty string = no filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyFilters {
    pub age_group: String,
    pub school_type: String,
    pub religion: String,
    pub caste_community: String,
    pub parental_education: String,
    pub parental_occupation: String,
    pub sports_participation_status: String,
    pub sports_frequency: String,
    pub menarche_status: String,
    pub menstrual_product_use: String,
    pub search: String,
}

/// A response with no value for an actively filtered field is excluded.
fn matches_selection(value: Option<&str>, selection: &str) -> bool {
    let mut selected = selection
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .peekable();
    // Empty or separator-only selections select nothing, i.e. match all.
    if selected.peek().is_none() {
        return true;
    }
    match value {
        Some(value) => selected.any(|c| c == value),
        None => false,
    }
}

impl SurveyFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: SurveyFilterField, value: &str) {
        let slot = match field {
            SurveyFilterField::AgeGroup => &mut self.age_group,
            SurveyFilterField::SchoolType => &mut self.school_type,
            SurveyFilterField::Religion => &mut self.religion,
            SurveyFilterField::CasteCommunity => &mut self.caste_community,
            SurveyFilterField::ParentalEducation => &mut self.parental_education,
            SurveyFilterField::ParentalOccupation => &mut self.parental_occupation,
            SurveyFilterField::SportsParticipationStatus => {
                &mut self.sports_participation_status
            }
            SurveyFilterField::SportsFrequency => &mut self.sports_frequency,
            SurveyFilterField::MenarcheStatus => &mut self.menarche_status,
            SurveyFilterField::MenstrualProductUse => &mut self.menstrual_product_use,
        };
        *slot = value.to_string();
    }

    pub fn set_search(&mut self, text: &str) {
        self.search = text.to_string();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn has_active(&self) -> bool {
        !self.age_group.is_empty()
            || !self.school_type.is_empty()
            || !self.religion.is_empty()
            || !self.caste_community.is_empty()
            || !self.parental_education.is_empty()
            || !self.parental_occupation.is_empty()
            || !self.sports_participation_status.is_empty()
            || !self.sports_frequency.is_empty()
            || !self.menarche_status.is_empty()
            || !self.menstrual_product_use.is_empty()
            || !self.search.is_empty()
    }

    pub fn matches(&self, r: &SurveyResponse) -> bool {
        if !self.search.is_empty() {
            let term = self.search.to_lowercase();
            let hit = r.name.to_lowercase().contains(&term)
                || r.email
                    .as_deref()
                    .map(|e| e.to_lowercase().contains(&term))
                    .unwrap_or(false)
                || r.respondent_id.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }

        matches_selection(Some(&r.age_group), &self.age_group)
            && matches_selection(Some(&r.school_type), &self.school_type)
            && matches_selection(r.religion.as_deref(), &self.religion)
            && matches_selection(r.caste_community.as_deref(), &self.caste_community)
            && matches_selection(r.parental_education.as_deref(), &self.parental_education)
            && matches_selection(r.parental_occupation.as_deref(), &self.parental_occupation)
            && matches_selection(
                r.sports_participation_status.as_deref(),
                &self.sports_participation_status,
            )
            && matches_selection(r.sports_frequency.as_deref(), &self.sports_frequency)
            && matches_selection(r.menarche_status.as_deref(), &self.menarche_status)
            && matches_selection(
                r.menstrual_product_use.as_deref(),
                &self.menstrual_product_use,
            )
    }

    pub fn apply(&self, responses: &[SurveyResponse]) -> Vec<SurveyResponse> {
        responses
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}
