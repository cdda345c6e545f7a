use serde::Serialize;
use std::cmp::Ordering;

use crate::survey::model::SurveyResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SurveySortField {
    Name,
    AgeGroup,
    SchoolType,
    ClassGradeLevel,
    Religion,
    SportsParticipationStatus,
    SportsFrequency,
    SurveyCompletedAt,
}

impl SurveySortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(SurveySortField::Name),
            "ageGroup" => Some(SurveySortField::AgeGroup),
            "schoolType" => Some(SurveySortField::SchoolType),
            "classGradeLevel" => Some(SurveySortField::ClassGradeLevel),
            "religion" => Some(SurveySortField::Religion),
            "sportsParticipationStatus" => Some(SurveySortField::SportsParticipationStatus),
            "sportsFrequency" => Some(SurveySortField::SportsFrequency),
            "surveyCompletedAt" => Some(SurveySortField::SurveyCompletedAt),
            _ => None,
        }
    }
}

fn sort_value(r: &SurveyResponse, field: SurveySortField) -> Option<String> {
    match field {
        SurveySortField::Name => Some(r.name.to_lowercase()),
        SurveySortField::AgeGroup => Some(r.age_group.clone()),
        SurveySortField::SchoolType => Some(r.school_type.clone()),
        SurveySortField::ClassGradeLevel => r.class_grade_level.clone(),
        SurveySortField::Religion => r.religion.clone(),
        SurveySortField::SportsParticipationStatus => r.sports_participation_status.clone(),
        SurveySortField::SportsFrequency => r.sports_frequency.clone(),
        // ISO timestamps order lexicographically.
        SurveySortField::SurveyCompletedAt => Some(r.survey_completed_at.clone()),
    }
}

/// The survey table toggles between ascending and descending on the active
/// column; picking a new column starts ascending. Unlike the roster there is
/// no third "unsorted" leg in the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySort {
    pub field: Option<SurveySortField>,
    pub ascending: bool,
}

impl Default for SurveySort {
    fn default() -> Self {
        SurveySort {
            field: None,
            ascending: true,
        }
    }
}

impl SurveySort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_sort(&mut self, field: SurveySortField) {
        if self.field == Some(field) {
            self.ascending = !self.ascending;
        } else {
            self.field = Some(field);
            self.ascending = true;
        }
    }

    pub fn is_sorting(&self) -> bool {
        self.field.is_some()
    }

    pub fn apply(&self, mut responses: Vec<SurveyResponse>) -> Vec<SurveyResponse> {
        let Some(field) = self.field else {
            return responses;
        };
        let ascending = self.ascending;
        responses.sort_by(|a, b| {
            let av = sort_value(a, field);
            let bv = sort_value(b, field);
            match (&av, &bv) {
                (None, None) => Ordering::Equal,
                (None, _) => Ordering::Greater,
                (_, None) => Ordering::Less,
                (Some(a), Some(b)) => {
                    let ord = a.cmp(b);
                    if ascending {
                        ord
                    } else {
                        ord.reverse()
                    }
                }
            }
        });
        responses
    }

    pub fn icon_for(&self, field: SurveySortField) -> &'static str {
        if self.field != Some(field) {
            return "∣";
        }
        if self.ascending {
            "▲"
        } else {
            "▼"
        }
    }
}
