use serde::{Deserialize, Serialize};

use crate::model::{Gender, PaymentStatus, Section, Std, Student};

/// WHO-style BMI bands as the dashboard filters on them. Values falling in
/// the tenth-of-a-point gaps between bands (e.g. 24.95) categorize as none
/// and never match a BMI filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    #[serde(rename = "underweight")]
    Underweight,
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "overweight")]
    Overweight,
    #[serde(rename = "obese_class_1")]
    ObeseClass1,
    #[serde(rename = "obese_class_2")]
    ObeseClass2,
    #[serde(rename = "obese_class_3")]
    ObeseClass3,
}

impl BmiCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "underweight" => Some(BmiCategory::Underweight),
            "normal" => Some(BmiCategory::Normal),
            "overweight" => Some(BmiCategory::Overweight),
            "obese_class_1" => Some(BmiCategory::ObeseClass1),
            "obese_class_2" => Some(BmiCategory::ObeseClass2),
            "obese_class_3" => Some(BmiCategory::ObeseClass3),
            _ => None,
        }
    }
}

pub fn bmi_category(bmi: f64) -> Option<BmiCategory> {
    if bmi < 18.5 {
        Some(BmiCategory::Underweight)
    } else if bmi <= 24.9 {
        Some(BmiCategory::Normal)
    } else if (25.0..=29.9).contains(&bmi) {
        Some(BmiCategory::Overweight)
    } else if (30.0..=34.9).contains(&bmi) {
        Some(BmiCategory::ObeseClass1)
    } else if (35.0..=39.9).contains(&bmi) {
        Some(BmiCategory::ObeseClass2)
    } else if bmi >= 40.0 {
        Some(BmiCategory::ObeseClass3)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Std,
    Section,
    PaymentStatus,
    Gender,
    Bmi,
}

impl FilterField {
    /// Wire names plus the legacy overview keys older dashboard builds send.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "std" | "standard" | "overview1" => Some(FilterField::Std),
            "section" | "overview2" => Some(FilterField::Section),
            "paymentStatus" | "overview3" => Some(FilterField::PaymentStatus),
            "gender" => Some(FilterField::Gender),
            "bmi" => Some(FilterField::Bmi),
            _ => None,
        }
    }
}

/// The roster's predicate set: two single-value selections and three
/// multi-selects. An empty selection always means "match everything" for
/// that field; fields AND together, values within a multi-select OR.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub std: Option<Std>,
    pub section: Option<Section>,
    pub payment_status: Vec<PaymentStatus>,
    pub gender: Vec<Gender>,
    pub bmi: Vec<BmiCategory>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a single-value field's selection. Empty value clears the
    /// field. Unrecognized values and multi-select fields are a no-op
    /// (fail closed); returns whether anything was applied.
    pub fn set(&mut self, field: FilterField, value: &str) -> bool {
        match field {
            FilterField::Std => {
                if value.is_empty() {
                    self.std = None;
                    return true;
                }
                match Std::parse(value) {
                    Some(v) => {
                        self.std = Some(v);
                        true
                    }
                    None => false,
                }
            }
            FilterField::Section => {
                if value.is_empty() {
                    self.section = None;
                    return true;
                }
                match Section::parse(value) {
                    Some(v) => {
                        self.section = Some(v);
                        true
                    }
                    None => false,
                }
            }
            FilterField::PaymentStatus | FilterField::Gender | FilterField::Bmi => false,
        }
    }

    /// Flip membership of `value` in a multi-select field. Single-value
    /// fields and unrecognized values are a no-op.
    pub fn toggle(&mut self, field: FilterField, value: &str) -> bool {
        match field {
            FilterField::PaymentStatus => match PaymentStatus::parse(value) {
                Some(v) => {
                    toggle_value(&mut self.payment_status, v);
                    true
                }
                None => false,
            },
            FilterField::Gender => match Gender::parse(value) {
                Some(v) => {
                    toggle_value(&mut self.gender, v);
                    true
                }
                None => false,
            },
            FilterField::Bmi => match BmiCategory::parse(value) {
                Some(v) => {
                    toggle_value(&mut self.bmi, v);
                    true
                }
                None => false,
            },
            FilterField::Std | FilterField::Section => false,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn has_active(&self) -> bool {
        self.std.is_some()
            || self.section.is_some()
            || !self.payment_status.is_empty()
            || !self.gender.is_empty()
            || !self.bmi.is_empty()
    }

    pub fn matches(&self, s: &Student) -> bool {
        if let Some(std) = self.std {
            if s.std != Some(std) {
                return false;
            }
        }
        if let Some(section) = self.section {
            if s.section != Some(section) {
                return false;
            }
        }
        if !self.payment_status.is_empty() && !self.payment_status.contains(&s.payment_status) {
            return false;
        }
        if !self.gender.is_empty() && !self.gender.contains(&s.gender) {
            return false;
        }
        if !self.bmi.is_empty() {
            // Derived at apply time from the raw score; a record without a
            // latest test is excluded, not defaulted in.
            let category = s
                .latest_test
                .as_ref()
                .and_then(|t| bmi_category(t.score.bmi));
            match category {
                Some(c) if self.bmi.contains(&c) => {}
                _ => return false,
            }
        }
        true
    }

    /// Stable subsequence of `records` matching every field's predicate.
    pub fn apply(&self, records: &[Student]) -> Vec<Student> {
        records.iter().filter(|s| self.matches(s)).cloned().collect()
    }
}

fn toggle_value<T: PartialEq>(values: &mut Vec<T>, value: T) {
    if let Some(pos) = values.iter().position(|v| *v == value) {
        values.remove(pos);
    } else {
        values.push(value);
    }
}
