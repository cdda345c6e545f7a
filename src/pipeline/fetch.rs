use std::collections::HashSet;

use crate::model::{PaymentStatus, Std, Student};
use crate::store::{StoreError, FETCH_PAGE_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub institute_id: String,
    pub std: Std,
}

/// Capture of the cache state at the moment a fetch was issued. A completed
/// fetch only merges if its ticket still matches the cache generation, which
/// is how a response for an abandoned partition gets discarded.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    generation: u64,
    pub partition: Partition,
    pub after: Option<String>,
    pub page_size: usize,
}

#[derive(Debug)]
pub enum FetchOutcome {
    Merged { added: usize, more_remote: bool },
    /// Nothing eligible to fetch: unconfigured, end of data, or a fetch
    /// already outstanding.
    Skipped,
    /// The ticket belonged to a previous partition; result dropped.
    Stale,
    Failed(StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePhase {
    Applied,
    Confirmed,
    RolledBack,
}

/// One in-flight optimistic payment-status mutation. The cached record is
/// rewritten before the remote write goes out; on failure `roll_back`
/// restores exactly the captured prior status.
#[derive(Debug)]
pub struct PaymentUpdate {
    record_id: String,
    previous: PaymentStatus,
    phase: UpdatePhase,
}

impl PaymentUpdate {
    pub fn phase(&self) -> UpdatePhase {
        self.phase
    }

    pub fn confirm(&mut self) {
        self.phase = UpdatePhase::Confirmed;
    }
}

/// Append-only, de-duplicated accumulation of remote pages for one
/// institute+std partition. Records are keyed by `s_id`; a record seen once
/// is never overwritten by a later page.
#[derive(Debug)]
pub struct RecordCache {
    partition: Option<Partition>,
    records: Vec<Student>,
    seen: HashSet<String>,
    cursor: Option<String>,
    more_remote: bool,
    in_flight: bool,
    generation: u64,
    page_size: usize,
}

impl Default for RecordCache {
    fn default() -> Self {
        Self::with_page_size(FETCH_PAGE_SIZE)
    }
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: usize) -> Self {
        RecordCache {
            partition: None,
            records: Vec::new(),
            seen: HashSet::new(),
            cursor: None,
            more_remote: false,
            in_flight: false,
            generation: 0,
            page_size,
        }
    }

    /// Point the cache at a partition, discarding everything held for the
    /// previous one. Any fetch still outstanding becomes stale.
    pub fn configure(&mut self, institute_id: &str, std: Std) {
        self.generation += 1;
        self.partition = Some(Partition {
            institute_id: institute_id.to_string(),
            std,
        });
        self.records.clear();
        self.seen.clear();
        self.cursor = None;
        self.more_remote = true;
        self.in_flight = false;
    }

    pub fn records(&self) -> &[Student] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn partition(&self) -> Option<&Partition> {
        self.partition.as_ref()
    }

    pub fn more_remote(&self) -> bool {
        self.more_remote
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight
    }

    /// Start a fetch if one is warranted. Fetches are never pipelined: a
    /// second call while one ticket is outstanding returns `None`.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        let partition = self.partition.clone()?;
        if !self.more_remote || self.in_flight {
            return None;
        }
        self.in_flight = true;
        Some(FetchTicket {
            generation: self.generation,
            partition,
            after: self.cursor.clone(),
            page_size: self.page_size,
        })
    }

    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Student>, StoreError>,
    ) -> FetchOutcome {
        if ticket.generation != self.generation {
            return FetchOutcome::Stale;
        }
        self.in_flight = false;
        match result {
            Ok(page) => {
                // A final page of exactly page_size records still reads as
                // "more"; the follow-up fetch returns empty. Accepted cost.
                let full = page.len() == ticket.page_size;
                if let Some(last) = page.last() {
                    self.cursor = Some(last.s_id.clone());
                }
                let mut added = 0;
                for record in page {
                    if self.seen.insert(record.s_id.clone()) {
                        self.records.push(record);
                        added += 1;
                    }
                }
                self.more_remote = full;
                FetchOutcome::Merged {
                    added,
                    more_remote: full,
                }
            }
            // An absent partition is an empty roster, not a failure.
            Err(StoreError::NotFound) => {
                self.more_remote = false;
                FetchOutcome::Merged {
                    added: 0,
                    more_remote: false,
                }
            }
            Err(e) => FetchOutcome::Failed(e),
        }
    }

    /// Synchronously rewrite a cached record's payment status ahead of the
    /// remote write. Unknown ids fail closed; nothing is applied.
    pub fn apply_payment(
        &mut self,
        record_id: &str,
        status: PaymentStatus,
    ) -> Result<PaymentUpdate, StoreError> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or(StoreError::NotFound)?;
        let previous = record.payment_status;
        record.payment_status = status;
        Ok(PaymentUpdate {
            record_id: record_id.to_string(),
            previous,
            phase: UpdatePhase::Applied,
        })
    }

    /// Restore the status captured when the update was applied. Only the
    /// affected record is touched; the rest of the cache survives.
    pub fn roll_back_payment(&mut self, update: &mut PaymentUpdate) {
        if let Some(record) = self.records.iter_mut().find(|r| r.id == update.record_id) {
            record.payment_status = update.previous;
        }
        update.phase = UpdatePhase::RolledBack;
    }
}
