use serde::Serialize;

use crate::model::{PaymentStatus, Std, Student};
use crate::pipeline::fetch::{FetchOutcome, RecordCache};
use crate::pipeline::filter::{FilterField, FilterState};
use crate::pipeline::reveal::RevealWindow;
use crate::pipeline::sort::{SortField, SortState};
use crate::store::{query_with_retry, RecordStore, RetryPolicy, StoreError};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
}

/// The caller-facing read surface: everything the table needs to render one
/// frame, derived fresh from the raw cache.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSnapshot {
    pub rows: Vec<Student>,
    pub total_cached: usize,
    pub total_filtered: usize,
    pub reveal_count: usize,
    pub has_more_visible: bool,
    pub has_more_remote: bool,
    pub is_fetching: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    pub filters: FilterState,
    pub sort: SortState,
    pub has_active_filters: bool,
    pub is_sorting: bool,
}

/// Composes Fetch -> Filter -> Sort -> Reveal over one partition. Filter and
/// Sort are pure and re-run from the cache snapshot on every read, so they
/// can never go stale relative to freshly fetched or mutated records.
#[derive(Debug)]
pub struct Roster {
    cache: RecordCache,
    filters: FilterState,
    sort: SortState,
    reveal: RevealWindow,
    retry: RetryPolicy,
    last_error: Option<StoreError>,
}

impl Default for Roster {
    fn default() -> Self {
        Self::with_cache(RecordCache::new())
    }
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache injected for tests that want a small page size.
    pub fn with_cache(cache: RecordCache) -> Self {
        Roster {
            cache,
            filters: FilterState::new(),
            sort: SortState::new(),
            reveal: RevealWindow::new(),
            retry: RetryPolicy::default(),
            last_error: None,
        }
    }

    pub fn set_retry_policy(&mut self, retry: RetryPolicy) {
        self.retry = retry;
    }

    pub fn is_configured(&self) -> bool {
        self.cache.partition().is_some()
    }

    /// Point the roster at a new institute+std partition. All four stage
    /// states start fresh; an in-flight fetch for the old partition becomes
    /// stale and its result will be discarded on arrival.
    pub fn configure(&mut self, institute_id: &str, std: Std) {
        self.cache.configure(institute_id, std);
        self.filters.clear();
        self.sort = SortState::new();
        self.reveal.reset();
        self.last_error = None;
    }

    /// Pull the next page through the store, retrying transient failures.
    pub fn fetch_next(&mut self, store: &dyn RecordStore) -> FetchOutcome {
        let Some(ticket) = self.cache.begin_fetch() else {
            return FetchOutcome::Skipped;
        };
        let result = query_with_retry(
            store,
            &ticket.partition.institute_id,
            ticket.partition.std,
            ticket.page_size,
            ticket.after.as_deref(),
            &self.retry,
        );
        let outcome = self.cache.complete_fetch(ticket, result);
        match &outcome {
            FetchOutcome::Failed(e) => self.last_error = Some(e.clone()),
            FetchOutcome::Merged { .. } => self.last_error = None,
            FetchOutcome::Skipped | FetchOutcome::Stale => {}
        }
        outcome
    }

    pub fn set_filter(&mut self, field: &str, value: &str) -> bool {
        match FilterField::parse(field) {
            Some(f) => self.filters.set(f, value),
            None => false,
        }
    }

    pub fn toggle_filter(&mut self, field: &str, value: &str) -> bool {
        match FilterField::parse(field) {
            Some(f) => self.filters.toggle(f, value),
            None => false,
        }
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    pub fn request_sort(&mut self, field: &str) -> bool {
        match SortField::parse(field) {
            Some(f) => {
                self.sort.request_sort(f);
                true
            }
            None => false,
        }
    }

    pub fn sort_icon(&self, field: &str) -> Option<&'static str> {
        SortField::parse(field).map(|f| self.sort.icon_for(f))
    }

    pub fn reveal_more(&mut self) {
        self.reveal.load_more();
    }

    /// Optimistic write-through: the cached record flips first, then the
    /// remote write goes out; on failure the record is rolled back and the
    /// error is re-raised.
    pub fn update_payment_status(
        &mut self,
        store: &dyn RecordStore,
        record_id: &str,
        status: PaymentStatus,
    ) -> Result<(), StoreError> {
        let mut update = self.cache.apply_payment(record_id, status)?;
        match store.write_payment_status(record_id, status) {
            Ok(()) => {
                update.confirm();
                Ok(())
            }
            Err(e) => {
                self.cache.roll_back_payment(&mut update);
                Err(e)
            }
        }
    }

    pub fn snapshot(&self) -> RosterSnapshot {
        let filtered = self.filters.apply(self.cache.records());
        let sorted = self.sort.apply(filtered);
        let total_filtered = sorted.len();
        let rows = self.reveal.visible(&sorted).to_vec();
        RosterSnapshot {
            rows,
            total_cached: self.cache.len(),
            total_filtered,
            reveal_count: self.reveal.count(),
            has_more_visible: self.reveal.has_more(total_filtered),
            has_more_remote: self.cache.more_remote(),
            is_fetching: self.cache.is_fetching(),
            error: self.last_error.as_ref().map(|e| ErrorInfo {
                code: e.code(),
                message: e.to_string(),
            }),
            filters: self.filters.clone(),
            sort: self.sort,
            has_active_filters: self.filters.has_active(),
            is_sorting: self.sort.is_sorting(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gender, LatestTest, Section, TestScore};
    use std::cell::{Cell, RefCell};
    use std::time::Duration;

    struct ScriptedStore {
        records: RefCell<Vec<Student>>,
        fail_reads: Cell<bool>,
        fail_writes: Cell<bool>,
    }

    impl ScriptedStore {
        fn with(records: Vec<Student>) -> Self {
            ScriptedStore {
                records: RefCell::new(records),
                fail_reads: Cell::new(false),
                fail_writes: Cell::new(false),
            }
        }
    }

    impl RecordStore for ScriptedStore {
        fn query_records(
            &self,
            institute_id: &str,
            std: Std,
            page_size: usize,
            after_s_id: Option<&str>,
        ) -> Result<Vec<Student>, StoreError> {
            if self.fail_reads.get() {
                return Err(StoreError::Transient("scripted outage".into()));
            }
            let records = self.records.borrow();
            let mut matching: Vec<Student> = records
                .iter()
                .filter(|s| s.institute_id == institute_id && s.std == Some(std))
                .cloned()
                .collect();
            matching.sort_by(|a, b| a.s_id.cmp(&b.s_id));
            let start = match after_s_id {
                Some(cursor) => matching
                    .iter()
                    .position(|s| s.s_id == cursor)
                    .map(|p| p + 1)
                    .unwrap_or(0),
                None => 0,
            };
            Ok(matching.into_iter().skip(start).take(page_size).collect())
        }

        fn write_payment_status(
            &self,
            record_id: &str,
            status: PaymentStatus,
        ) -> Result<(), StoreError> {
            if self.fail_writes.get() {
                return Err(StoreError::Backend("scripted write failure".into()));
            }
            let mut records = self.records.borrow_mut();
            match records.iter_mut().find(|r| r.id == record_id) {
                Some(r) => {
                    r.payment_status = status;
                    Ok(())
                }
                None => Err(StoreError::NotFound),
            }
        }
    }

    fn student(n: usize, gender: Gender) -> Student {
        Student {
            id: format!("doc-{:04}", n),
            s_id: format!("S-{:04}", n),
            name: format!("{}{:04}", if n % 2 == 0 { "Asha " } else { "Zoya " }, n),
            email: String::new(),
            gender,
            date_of_birth: None,
            grade: None,
            institute_id: "inst-a".into(),
            is_on_boarded: true,
            payment_status: PaymentStatus::Paid,
            qr_code: String::new(),
            rfid: String::new(),
            section: Some(Section::A),
            std: Some(Std::Seven),
            latest_test: Some(LatestTest {
                score: TestScore {
                    bmi: 20.0,
                    body_control: 50.0,
                    chimp_test: 50.0,
                    concentration: 50.0,
                    core_balance: 50.0,
                    fatigue: 50.0,
                    plank: 50.0,
                    pushup: 50.0,
                    overall_score: 50.0,
                },
                student_id: format!("doc-{:04}", n),
                updated_at: "2026-05-01T10:00:00Z".into(),
            }),
        }
    }

    fn no_delay() -> RetryPolicy {
        RetryPolicy {
            max_retries: 2,
            base: Duration::ZERO,
            cap: Duration::ZERO,
        }
    }

    #[test]
    fn filtered_sorted_revealed_composition() {
        // 25 records in class seven, mixed genders.
        let records: Vec<Student> = (1..=25)
            .map(|n| {
                student(
                    n,
                    if n % 3 == 0 {
                        Gender::Female
                    } else {
                        Gender::Male
                    },
                )
            })
            .collect();
        let store = ScriptedStore::with(records);
        let mut roster = Roster::new();
        roster.set_retry_policy(no_delay());
        roster.configure("inst-a", Std::Seven);
        roster.fetch_next(&store);

        roster.toggle_filter("gender", "Gender.male");
        roster.request_sort("name");

        let snap = roster.snapshot();
        assert!(snap.rows.len() <= 20);
        assert!(snap.rows.iter().all(|s| s.gender == Gender::Male));
        let names: Vec<String> = snap.rows.iter().map(|s| s.name.to_lowercase()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(snap.has_active_filters);
        assert!(snap.is_sorting);
    }

    #[test]
    fn fetch_paginates_until_a_short_page() {
        let records: Vec<Student> = (1..=62).map(|n| student(n, Gender::Male)).collect();
        let store = ScriptedStore::with(records);
        let mut roster = Roster::new();
        roster.set_retry_policy(no_delay());
        roster.configure("inst-a", Std::Seven);

        assert!(matches!(
            roster.fetch_next(&store),
            FetchOutcome::Merged {
                added: 50,
                more_remote: true
            }
        ));
        assert!(matches!(
            roster.fetch_next(&store),
            FetchOutcome::Merged {
                added: 12,
                more_remote: false
            }
        ));
        assert!(matches!(roster.fetch_next(&store), FetchOutcome::Skipped));
        assert_eq!(roster.snapshot().total_cached, 62);
    }

    #[test]
    fn unconfigured_roster_skips_fetches() {
        let store = ScriptedStore::with(vec![]);
        let mut roster = Roster::new();
        assert!(matches!(roster.fetch_next(&store), FetchOutcome::Skipped));
    }

    #[test]
    fn transient_outage_surfaces_after_retries_and_clears_on_success() {
        let store = ScriptedStore::with(vec![student(1, Gender::Male)]);
        store.fail_reads.set(true);

        let mut roster = Roster::new();
        roster.set_retry_policy(no_delay());
        roster.configure("inst-a", Std::Seven);

        assert!(matches!(roster.fetch_next(&store), FetchOutcome::Failed(_)));
        let snap = roster.snapshot();
        assert_eq!(snap.error.as_ref().map(|e| e.code), Some("store_unavailable"));

        store.fail_reads.set(false);
        assert!(matches!(roster.fetch_next(&store), FetchOutcome::Merged { .. }));
        assert!(roster.snapshot().error.is_none());
    }

    #[test]
    fn failed_remote_write_rolls_the_record_back_and_reraises() {
        let store = ScriptedStore::with(vec![student(1, Gender::Male)]);
        let mut roster = Roster::new();
        roster.set_retry_policy(no_delay());
        roster.configure("inst-a", Std::Seven);
        roster.fetch_next(&store);
        assert_eq!(
            roster.snapshot().rows[0].payment_status,
            PaymentStatus::Paid
        );

        store.fail_writes.set(true);
        let err = roster
            .update_payment_status(&store, "doc-0001", PaymentStatus::Unpaid)
            .expect_err("write must fail");
        assert_eq!(err.code(), "store_failed");
        // Cache settles back to the prior status; nothing else was touched.
        let snap = roster.snapshot();
        assert_eq!(snap.rows[0].payment_status, PaymentStatus::Paid);
        assert_eq!(snap.total_cached, 1);

        store.fail_writes.set(false);
        roster
            .update_payment_status(&store, "doc-0001", PaymentStatus::Unpaid)
            .expect("write succeeds");
        assert_eq!(
            roster.snapshot().rows[0].payment_status,
            PaymentStatus::Unpaid
        );
    }

    #[test]
    fn reconfigure_resets_every_stage() {
        let store = ScriptedStore::with(
            (1..=25)
                .map(|n| student(n, Gender::Male))
                .collect::<Vec<_>>(),
        );
        let mut roster = Roster::new();
        roster.set_retry_policy(no_delay());
        roster.configure("inst-a", Std::Seven);
        roster.fetch_next(&store);
        roster.toggle_filter("gender", "Gender.male");
        roster.request_sort("name");
        roster.reveal_more();

        roster.configure("inst-b", Std::Nine);
        let snap = roster.snapshot();
        assert_eq!(snap.total_cached, 0);
        assert!(!snap.has_active_filters);
        assert!(!snap.is_sorting);
        assert_eq!(snap.reveal_count, 20);
        assert!(snap.has_more_remote, "fresh partition is eligible to fetch");
    }

    #[test]
    fn unknown_fields_are_noops_at_the_orchestrator_too() {
        let mut roster = Roster::new();
        roster.configure("inst-a", Std::Seven);
        assert!(!roster.set_filter("height", "1"));
        assert!(!roster.request_sort("height"));
        assert_eq!(roster.sort_icon("height"), None);
        let snap = roster.snapshot();
        assert!(!snap.has_active_filters);
        assert!(!snap.is_sorting);
    }
}
