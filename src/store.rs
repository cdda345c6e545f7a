use rusqlite::{Connection, OptionalExtension};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::model::{
    Gender, GradeLevel, LatestTest, PaymentStatus, Section, Std, Student, TestScore,
};
use crate::survey::SurveyResponse;

/// How many roster records one remote page may carry.
pub const FETCH_PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The partition or record does not exist. Terminal; absence of data is
    /// not a failure for reads and is never retried.
    NotFound,
    /// A failure the request layer may retry (connection reset, lock timeout).
    Transient(String),
    /// Anything else the backend reported.
    Backend(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }

    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound => "not_found",
            StoreError::Transient(_) => "store_unavailable",
            StoreError::Backend(_) => "store_failed",
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "record not found"),
            StoreError::Transient(m) => write!(f, "transient store failure: {}", m),
            StoreError::Backend(m) => write!(f, "store failure: {}", m),
        }
    }
}

/// The remote data store as the pipeline sees it: paged reads scoped to an
/// institute+std partition, plus a single-field write. Pages come back in the
/// store's natural order (`s_id` ascending); `after_s_id` is exclusive-after.
pub trait RecordStore {
    fn query_records(
        &self,
        institute_id: &str,
        std: Std,
        page_size: usize,
        after_s_id: Option<&str>,
    ) -> Result<Vec<Student>, StoreError>;

    fn write_payment_status(
        &self,
        record_id: &str,
        status: PaymentStatus,
    ) -> Result<(), StoreError>;
}

/// Capped exponential backoff for transient read failures:
/// `min(base * 2^attempt, cap)`, at most `max_retries` retries.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base: Duration,
    pub cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 2,
            base: Duration::from_secs(1),
            cap: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base.checked_mul(factor).unwrap_or(self.cap).min(self.cap)
    }
}

/// Read one page, retrying transient failures per `policy`. NotFound and
/// backend errors return immediately.
pub fn query_with_retry(
    store: &dyn RecordStore,
    institute_id: &str,
    std: Std,
    page_size: usize,
    after_s_id: Option<&str>,
    policy: &RetryPolicy,
) -> Result<Vec<Student>, StoreError> {
    let mut attempt = 0u32;
    loop {
        match store.query_records(institute_id, std, page_size, after_s_id) {
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                std::thread::sleep(policy.delay_for(attempt));
                attempt += 1;
            }
            other => return other,
        }
    }
}

/// SQLite-backed store implementation used by the daemon and the integration
/// tests. It stands in for the remote document store but honors the same
/// query contract, including falling back to the first page when the cursor
/// record has disappeared.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(workspace)?;
        let db_path = workspace.join("rosterd.sqlite3");
        let conn = Connection::open(db_path)?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS students(
                id TEXT PRIMARY KEY,
                s_id TEXT NOT NULL,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                gender TEXT NOT NULL,
                date_of_birth TEXT,
                grade TEXT,
                institute_id TEXT NOT NULL,
                is_on_boarded INTEGER NOT NULL,
                payment_status TEXT NOT NULL,
                qr_code TEXT NOT NULL,
                rfid TEXT NOT NULL,
                section TEXT,
                std TEXT,
                UNIQUE(institute_id, std, s_id)
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_students_partition
             ON students(institute_id, std, s_id)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS latest_tests(
                student_id TEXT PRIMARY KEY,
                updated_at TEXT NOT NULL,
                bmi REAL NOT NULL,
                body_control REAL NOT NULL,
                chimp_test REAL NOT NULL,
                concentration REAL NOT NULL,
                core_balance REAL NOT NULL,
                fatigue REAL NOT NULL,
                plank REAL NOT NULL,
                pushup REAL NOT NULL,
                overall_score REAL NOT NULL,
                FOREIGN KEY(student_id) REFERENCES students(id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS survey_responses(
                respondent_id TEXT PRIMARY KEY,
                form_id TEXT NOT NULL,
                name TEXT NOT NULL,
                email TEXT,
                age_group TEXT NOT NULL,
                school_type TEXT NOT NULL,
                class_grade_level TEXT,
                religion TEXT,
                caste_community TEXT,
                parental_education TEXT,
                parental_occupation TEXT,
                sports_participation_status TEXT,
                sports_frequency TEXT,
                menarche_status TEXT,
                menstrual_product_use TEXT,
                survey_completed_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_survey_form ON survey_responses(form_id)",
            [],
        )?;

        Ok(SqliteStore { conn })
    }

    pub fn insert_student(&self, s: &Student) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO students(
                    id, s_id, name, email, gender, date_of_birth, grade,
                    institute_id, is_on_boarded, payment_status, qr_code, rfid,
                    section, std
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                rusqlite::params![
                    s.id,
                    s.s_id,
                    s.name,
                    s.email,
                    s.gender.as_str(),
                    s.date_of_birth,
                    s.grade.map(GradeLevel::as_str),
                    s.institute_id,
                    s.is_on_boarded as i64,
                    s.payment_status.as_str(),
                    s.qr_code,
                    s.rfid,
                    s.section.map(Section::as_str),
                    s.std.map(Std::as_str),
                ],
            )
            .map_err(backend)?;

        if let Some(test) = &s.latest_test {
            self.conn
                .execute(
                    "INSERT OR REPLACE INTO latest_tests(
                        student_id, updated_at, bmi, body_control, chimp_test,
                        concentration, core_balance, fatigue, plank, pushup,
                        overall_score
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    rusqlite::params![
                        s.id,
                        test.updated_at,
                        test.score.bmi,
                        test.score.body_control,
                        test.score.chimp_test,
                        test.score.concentration,
                        test.score.core_balance,
                        test.score.fatigue,
                        test.score.plank,
                        test.score.pushup,
                        test.score.overall_score,
                    ],
                )
                .map_err(backend)?;
        }
        Ok(())
    }

    pub fn insert_survey_response(
        &self,
        form_id: &str,
        r: &SurveyResponse,
    ) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO survey_responses(
                    respondent_id, form_id, name, email, age_group, school_type,
                    class_grade_level, religion, caste_community,
                    parental_education, parental_occupation,
                    sports_participation_status, sports_frequency,
                    menarche_status, menstrual_product_use, survey_completed_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                rusqlite::params![
                    r.respondent_id,
                    form_id,
                    r.name,
                    r.email,
                    r.age_group,
                    r.school_type,
                    r.class_grade_level,
                    r.religion,
                    r.caste_community,
                    r.parental_education,
                    r.parental_occupation,
                    r.sports_participation_status,
                    r.sports_frequency,
                    r.menarche_status,
                    r.menstrual_product_use,
                    r.survey_completed_at,
                ],
            )
            .map_err(backend)?;
        Ok(())
    }

    pub fn query_survey_responses(&self, form_id: &str) -> Result<Vec<SurveyResponse>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT respondent_id, name, email, age_group, school_type,
                        class_grade_level, religion, caste_community,
                        parental_education, parental_occupation,
                        sports_participation_status, sports_frequency,
                        menarche_status, menstrual_product_use, survey_completed_at
                 FROM survey_responses
                 WHERE form_id = ?
                 ORDER BY survey_completed_at, respondent_id",
            )
            .map_err(backend)?;
        let rows = stmt
            .query_map([form_id], |r| {
                Ok(SurveyResponse {
                    respondent_id: r.get(0)?,
                    name: r.get(1)?,
                    email: r.get(2)?,
                    age_group: r.get(3)?,
                    school_type: r.get(4)?,
                    class_grade_level: r.get(5)?,
                    religion: r.get(6)?,
                    caste_community: r.get(7)?,
                    parental_education: r.get(8)?,
                    parental_occupation: r.get(9)?,
                    sports_participation_status: r.get(10)?,
                    sports_frequency: r.get(11)?,
                    menarche_status: r.get(12)?,
                    menstrual_product_use: r.get(13)?,
                    survey_completed_at: r.get(14)?,
                })
            })
            .and_then(|it| it.collect::<Result<Vec<_>, _>>())
            .map_err(backend)?;
        Ok(rows)
    }

    fn cursor_exists(
        &self,
        institute_id: &str,
        std: Std,
        s_id: &str,
    ) -> Result<bool, StoreError> {
        let hit: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM students WHERE institute_id = ? AND std = ? AND s_id = ?",
                rusqlite::params![institute_id, std.as_str(), s_id],
                |r| r.get(0),
            )
            .optional()
            .map_err(backend)?;
        Ok(hit.is_some())
    }

    fn page_query(
        &self,
        institute_id: &str,
        std: Std,
        page_size: usize,
        after_s_id: Option<&str>,
    ) -> Result<Vec<Student>, StoreError> {
        let sql = "SELECT s.id, s.s_id, s.name, s.email, s.gender, s.date_of_birth,
                          s.grade, s.institute_id, s.is_on_boarded, s.payment_status,
                          s.qr_code, s.rfid, s.section, s.std,
                          t.updated_at, t.bmi, t.body_control, t.chimp_test,
                          t.concentration, t.core_balance, t.fatigue, t.plank,
                          t.pushup, t.overall_score
                   FROM students s
                   LEFT JOIN latest_tests t ON t.student_id = s.id
                   WHERE s.institute_id = ?1 AND s.std = ?2 AND s.s_id > ?3
                   ORDER BY s.s_id
                   LIMIT ?4";
        let mut stmt = self.conn.prepare(sql).map_err(backend)?;
        let rows = stmt
            .query_map(
                rusqlite::params![
                    institute_id,
                    std.as_str(),
                    after_s_id.unwrap_or(""),
                    page_size as i64
                ],
                row_to_student,
            )
            .and_then(|it| it.collect::<Result<Vec<_>, _>>())
            .map_err(backend)?;

        // Enum columns are validated outside the rusqlite row closure so a bad
        // value surfaces as a store error rather than a panic.
        rows.into_iter().map(finish_student).collect()
    }
}

type RawStudentRow = (
    Student,
    // raw enum texts still to validate
    String,         // gender
    String,         // payment_status
    Option<String>, // grade
    Option<String>, // section
    Option<String>, // std
);

fn row_to_student(r: &rusqlite::Row<'_>) -> rusqlite::Result<RawStudentRow> {
    let updated_at: Option<String> = r.get(14)?;
    let latest_test = match updated_at {
        Some(updated_at) => Some(LatestTest {
            score: TestScore {
                bmi: r.get(15)?,
                body_control: r.get(16)?,
                chimp_test: r.get(17)?,
                concentration: r.get(18)?,
                core_balance: r.get(19)?,
                fatigue: r.get(20)?,
                plank: r.get(21)?,
                pushup: r.get(22)?,
                overall_score: r.get(23)?,
            },
            student_id: r.get(0)?,
            updated_at,
        }),
        None => None,
    };

    let student = Student {
        id: r.get(0)?,
        s_id: r.get(1)?,
        name: r.get(2)?,
        email: r.get(3)?,
        gender: Gender::Male, // placeholder, validated in finish_student
        date_of_birth: r.get(5)?,
        grade: None,
        institute_id: r.get(7)?,
        is_on_boarded: r.get::<_, i64>(8)? != 0,
        payment_status: PaymentStatus::Unpaid, // placeholder, validated in finish_student
        qr_code: r.get(10)?,
        rfid: r.get(11)?,
        section: None,
        std: None,
        latest_test,
    };
    Ok((student, r.get(4)?, r.get(9)?, r.get(6)?, r.get(12)?, r.get(13)?))
}

fn finish_student(raw: RawStudentRow) -> Result<Student, StoreError> {
    let (mut s, gender, payment, grade, section, std) = raw;
    s.gender = Gender::parse(&gender)
        .ok_or_else(|| StoreError::Backend(format!("bad gender value: {}", gender)))?;
    s.payment_status = PaymentStatus::parse(&payment)
        .ok_or_else(|| StoreError::Backend(format!("bad payment status value: {}", payment)))?;
    s.grade = match grade {
        Some(g) => Some(
            GradeLevel::parse(&g)
                .ok_or_else(|| StoreError::Backend(format!("bad grade value: {}", g)))?,
        ),
        None => None,
    };
    s.section = section.as_deref().and_then(Section::parse);
    s.std = std.as_deref().and_then(Std::parse);
    Ok(s)
}

fn backend(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

impl RecordStore for SqliteStore {
    fn query_records(
        &self,
        institute_id: &str,
        std: Std,
        page_size: usize,
        after_s_id: Option<&str>,
    ) -> Result<Vec<Student>, StoreError> {
        // A cursor pointing at a record that no longer exists falls back to
        // the first page, matching the remote store's behavior.
        let after = match after_s_id {
            Some(s_id) if self.cursor_exists(institute_id, std, s_id)? => Some(s_id),
            _ => None,
        };
        self.page_query(institute_id, std, page_size, after)
    }

    fn write_payment_status(
        &self,
        record_id: &str,
        status: PaymentStatus,
    ) -> Result<(), StoreError> {
        let changed = self
            .conn
            .execute(
                "UPDATE students SET payment_status = ? WHERE id = ?",
                rusqlite::params![status.as_str(), record_id],
            )
            .map_err(backend)?;
        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
