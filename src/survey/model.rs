use serde::{Deserialize, Serialize};

/// One sports-survey submission. Demographic answers are stored as the raw
/// survey strings (the form emits free-form values, not closed enums), with
/// the fields a respondent may skip kept optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    pub respondent_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub age_group: String,
    pub school_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_grade_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub religion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caste_community: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parental_education: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parental_occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sports_participation_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sports_frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menarche_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menstrual_product_use: Option<String>,
    pub survey_completed_at: String,
}
