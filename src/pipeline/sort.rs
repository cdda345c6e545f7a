use chrono::Utc;
use serde::Serialize;
use std::cmp::Ordering;

use crate::model::{age_years, Gender, PaymentStatus, Student};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    None,
    Asc,
    Desc,
}

impl SortDirection {
    /// none -> asc -> desc -> none.
    pub fn next(self) -> Self {
        match self {
            SortDirection::None => SortDirection::Asc,
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    PaymentStatus,
    Gender,
    Age,
    ClassSection,
    Bmi,
    OverallScore,
    Pushup,
    Plank,
    Memory,
    Concentration,
    Speed,
    CoreBalance,
    BodyControl,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(SortField::Name),
            "paymentStatus" => Some(SortField::PaymentStatus),
            "gender" => Some(SortField::Gender),
            "age" => Some(SortField::Age),
            "classSection" => Some(SortField::ClassSection),
            "bmi" => Some(SortField::Bmi),
            "overallScore" => Some(SortField::OverallScore),
            "pushup" => Some(SortField::Pushup),
            "plank" => Some(SortField::Plank),
            "memory" => Some(SortField::Memory),
            "concentration" => Some(SortField::Concentration),
            "speed" => Some(SortField::Speed),
            "coreBalance" => Some(SortField::CoreBalance),
            "bodyControl" => Some(SortField::BodyControl),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
enum SortValue {
    Text(String),
    Number(f64),
    Missing,
}

fn test_score(s: &Student, pick: fn(&crate::model::TestScore) -> f64) -> SortValue {
    match &s.latest_test {
        Some(t) => SortValue::Number(pick(&t.score)),
        None => SortValue::Missing,
    }
}

fn sort_value(s: &Student, field: SortField, today: chrono::NaiveDate) -> SortValue {
    match field {
        SortField::Name => SortValue::Text(s.name.to_lowercase()),
        SortField::PaymentStatus => SortValue::Number(match s.payment_status {
            PaymentStatus::Paid => 1.0,
            PaymentStatus::Unpaid => 0.0,
        }),
        SortField::Gender => SortValue::Number(match s.gender {
            Gender::Male => 1.0,
            Gender::Female => 0.0,
        }),
        SortField::Age => s
            .date_of_birth
            .as_deref()
            .and_then(|dob| age_years(dob, today))
            .map(|a| SortValue::Number(f64::from(a)))
            .unwrap_or(SortValue::Missing),
        SortField::ClassSection => {
            if s.std.is_none() && s.section.is_none() {
                return SortValue::Missing;
            }
            // Zero-padded composite so "7_b" orders between "07_a" and "10_a".
            let num = s.std.map(|std| std.class_number()).unwrap_or(0);
            let letter = s.section.map(|sec| sec.letter()).unwrap_or('z');
            SortValue::Text(format!("{:02}_{}", num, letter))
        }
        SortField::Bmi => test_score(s, |t| t.bmi),
        SortField::OverallScore => test_score(s, |t| {
            (t.body_control + t.concentration + t.core_balance + t.fatigue) / 4.0
        }),
        SortField::Pushup => test_score(s, |t| t.pushup),
        SortField::Plank => test_score(s, |t| t.plank),
        SortField::Memory => test_score(s, |t| t.chimp_test),
        SortField::Concentration => test_score(s, |t| t.concentration),
        SortField::Speed => test_score(s, |t| t.fatigue),
        SortField::CoreBalance => test_score(s, |t| t.core_balance),
        SortField::BodyControl => test_score(s, |t| t.body_control),
    }
}

fn compare_present(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
        (SortValue::Number(a), SortValue::Number(b)) => {
            a.partial_cmp(b).unwrap_or(Ordering::Equal)
        }
        // Fields produce a single value kind; mixed pairs cannot occur.
        _ => Ordering::Equal,
    }
}

/// At most one active field plus a direction. Selecting a new field starts
/// at ascending; re-selecting the active field advances the cycle; reaching
/// none clears the field and the roster falls back to fetch order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    pub field: Option<SortField>,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        SortState {
            field: None,
            direction: SortDirection::None,
        }
    }
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_sort(&mut self, field: SortField) {
        let direction = if self.field == Some(field) {
            self.direction.next()
        } else {
            SortDirection::Asc
        };
        self.field = if direction == SortDirection::None {
            None
        } else {
            Some(field)
        };
        self.direction = direction;
    }

    pub fn is_sorting(&self) -> bool {
        self.field.is_some() && self.direction != SortDirection::None
    }

    /// Ordered copy of `records`. When no sort is active the input comes
    /// back untouched — the sort is not applied at all, which keeps the
    /// fetch order byte-stable across renders. Missing values sort to the
    /// end regardless of direction; the sort is stable.
    pub fn apply(&self, mut records: Vec<Student>) -> Vec<Student> {
        let Some(field) = self.field else {
            return records;
        };
        if self.direction == SortDirection::None {
            return records;
        }
        let descending = self.direction == SortDirection::Desc;
        let today = Utc::now().date_naive();
        records.sort_by(|a, b| {
            let av = sort_value(a, field, today);
            let bv = sort_value(b, field, today);
            match (&av, &bv) {
                (SortValue::Missing, SortValue::Missing) => Ordering::Equal,
                (SortValue::Missing, _) => Ordering::Greater,
                (_, SortValue::Missing) => Ordering::Less,
                _ => {
                    let ord = compare_present(&av, &bv);
                    if descending {
                        ord.reverse()
                    } else {
                        ord
                    }
                }
            }
        });
        records
    }

    /// Display-only; no state involved beyond reading the active field.
    pub fn icon_for(&self, field: SortField) -> &'static str {
        if self.field != Some(field) || self.direction == SortDirection::None {
            return "";
        }
        match self.direction {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
            SortDirection::None => "",
        }
    }
}
