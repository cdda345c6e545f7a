use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "Gender.male")]
    Male,
    #[serde(rename = "Gender.female")]
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Gender.male",
            Gender::Female => "Gender.female",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Gender.male" => Some(Gender::Male),
            "Gender.female" => Some(Gender::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[serde(rename = "PaymentStatus.paid")]
    Paid,
    #[serde(rename = "PaymentStatus.unpaid")]
    Unpaid,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Paid => "PaymentStatus.paid",
            PaymentStatus::Unpaid => "PaymentStatus.unpaid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PaymentStatus.paid" => Some(PaymentStatus::Paid),
            "PaymentStatus.unpaid" => Some(PaymentStatus::Unpaid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradeLevel {
    #[serde(rename = "GradeLevel.grade1to5")]
    Grade1To5,
    #[serde(rename = "GradeLevel.grade6to8")]
    Grade6To8,
    #[serde(rename = "GradeLevel.grade9to10")]
    Grade9To10,
    #[serde(rename = "GradeLevel.grade11to12")]
    Grade11To12,
}

impl GradeLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            GradeLevel::Grade1To5 => "GradeLevel.grade1to5",
            GradeLevel::Grade6To8 => "GradeLevel.grade6to8",
            GradeLevel::Grade9To10 => "GradeLevel.grade9to10",
            GradeLevel::Grade11To12 => "GradeLevel.grade11to12",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GradeLevel.grade1to5" => Some(GradeLevel::Grade1To5),
            "GradeLevel.grade6to8" => Some(GradeLevel::Grade6To8),
            "GradeLevel.grade9to10" => Some(GradeLevel::Grade9To10),
            "GradeLevel.grade11to12" => Some(GradeLevel::Grade11To12),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    #[serde(rename = "Section.a")]
    A,
    #[serde(rename = "Section.b")]
    B,
    #[serde(rename = "Section.c")]
    C,
    #[serde(rename = "Section.d")]
    D,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::A => "Section.a",
            Section::B => "Section.b",
            Section::C => "Section.c",
            Section::D => "Section.d",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Section.a" => Some(Section::A),
            "Section.b" => Some(Section::B),
            "Section.c" => Some(Section::C),
            "Section.d" => Some(Section::D),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Section::A => 'a',
            Section::B => 'b',
            Section::C => 'c',
            Section::D => 'd',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Std {
    #[serde(rename = "Std.one")]
    One,
    #[serde(rename = "Std.two")]
    Two,
    #[serde(rename = "Std.three")]
    Three,
    #[serde(rename = "Std.four")]
    Four,
    #[serde(rename = "Std.five")]
    Five,
    #[serde(rename = "Std.six")]
    Six,
    #[serde(rename = "Std.seven")]
    Seven,
    #[serde(rename = "Std.eight")]
    Eight,
    #[serde(rename = "Std.nine")]
    Nine,
    #[serde(rename = "Std.ten")]
    Ten,
    #[serde(rename = "Std.eleven")]
    Eleven,
    #[serde(rename = "Std.twelve")]
    Twelve,
}

impl Std {
    pub fn as_str(self) -> &'static str {
        match self {
            Std::One => "Std.one",
            Std::Two => "Std.two",
            Std::Three => "Std.three",
            Std::Four => "Std.four",
            Std::Five => "Std.five",
            Std::Six => "Std.six",
            Std::Seven => "Std.seven",
            Std::Eight => "Std.eight",
            Std::Nine => "Std.nine",
            Std::Ten => "Std.ten",
            Std::Eleven => "Std.eleven",
            Std::Twelve => "Std.twelve",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Std.one" => Some(Std::One),
            "Std.two" => Some(Std::Two),
            "Std.three" => Some(Std::Three),
            "Std.four" => Some(Std::Four),
            "Std.five" => Some(Std::Five),
            "Std.six" => Some(Std::Six),
            "Std.seven" => Some(Std::Seven),
            "Std.eight" => Some(Std::Eight),
            "Std.nine" => Some(Std::Nine),
            "Std.ten" => Some(Std::Ten),
            "Std.eleven" => Some(Std::Eleven),
            "Std.twelve" => Some(Std::Twelve),
            _ => None,
        }
    }

    pub fn class_number(self) -> u32 {
        match self {
            Std::One => 1,
            Std::Two => 2,
            Std::Three => 3,
            Std::Four => 4,
            Std::Five => 5,
            Std::Six => 6,
            Std::Seven => 7,
            Std::Eight => 8,
            Std::Nine => 9,
            Std::Ten => 10,
            Std::Eleven => 11,
            Std::Twelve => 12,
        }
    }
}

/// One fitness-test submission. Scores are the raw per-test numbers as the
/// assessment app records them; `overall_score` is the stored aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestScore {
    pub bmi: f64,
    pub body_control: f64,
    pub chimp_test: f64,
    pub concentration: f64,
    pub core_balance: f64,
    pub fatigue: f64,
    pub plank: f64,
    pub pushup: f64,
    pub overall_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestTest {
    pub score: TestScore,
    pub student_id: String,
    pub updated_at: String,
}

/// A roster record as cached client-side: the student document plus the
/// optional latest-test sub-record joined in at fetch time.
///
/// `id` is the store document id; `s_id` is the business identifier that is
/// unique within an institute+std partition and serves as the fetch cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub s_id: String,
    pub name: String,
    pub email: String,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<GradeLevel>,
    pub institute_id: String,
    #[serde(default)]
    pub is_on_boarded: bool,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub qr_code: String,
    #[serde(default)]
    pub rfid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std: Option<Std>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_test: Option<LatestTest>,
}

/// Whole years between an ISO date of birth and `today`.
pub fn age_years(date_of_birth: &str, today: NaiveDate) -> Option<i32> {
    let dob = NaiveDate::parse_from_str(date_of_birth, "%Y-%m-%d").ok()?;
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    Some(age)
}
