//! Sequential multi-page collection with per-page failure tracking and a
//! bounded retry protocol.
//!
//! A [`BatchRun`] owns its record set and progress for the whole run. Pages
//! are fetched strictly one at a time in ascending order. Failures never
//! escape as errors: they land in the failed-page set, which a caller clears
//! with [`BatchRun::reprocess_failed_pages`] before exporting. The exception
//! is a relay rejection, which ends the run with [`BatchError::Fatal`] and is
//! never retried.

mod progress;
mod record_set;

use std::collections::BTreeMap;

use thiserror::Error;
use uuid::Uuid;

use onset_core::{BatchSnapshot, Breadcrumb, CompanyRecord, Pagination, SearchFilters};

use crate::fetcher::{FetchError, PageFetcher};
use crate::types::SearchPage;

pub use progress::{BatchProgress, BatchState};
pub use record_set::RecordSet;

/// Retry generations run by [`BatchRun::reprocess_failed_pages`].
pub const MAX_RETRY_GENERATIONS: u32 = 3;

/// Upper bound on pages fetched by [`BatchRun::collect_all`].
pub const MAX_OPEN_ENDED_PAGES: u32 = 500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("invalid page range {from}..={to}: pages start at 1 and the range must not be reversed")]
    InvalidRange { from: u32, to: u32 },

    #[error("batch run is {state}, not ready")]
    NotReady { state: BatchState },

    /// The relay refused a request outright; retrying cannot help.
    #[error("page {page} rejected by the search relay: {message}")]
    Fatal { page: u32, message: String },
}

/// Post-run statistics for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub total_records: usize,
    pub page_counts: BTreeMap<u32, usize>,
    /// Pages in the run times the page size.
    pub expected_records: u64,
    /// Records missing from `expected_records`, reported only when no page failed.
    pub shortfall: Option<u64>,
    pub failed_pages: Vec<u32>,
    pub has_duplicate_or_missing_ids: bool,
    /// `total_entries` from the first successful page, if any.
    pub reported_total_entries: Option<u64>,
}

/// One batch collection run over a fixed set of filters.
pub struct BatchRun<F> {
    fetcher: F,
    filters: SearchFilters,
    run_id: Uuid,
    state: BatchState,
    progress: BatchProgress,
    records: RecordSet,
    breadcrumbs: Vec<Breadcrumb>,
    pagination: Option<Pagination>,
    page_from: u32,
    page_to: u32,
    /// Page whose fetch hit a fatal error; blocks retries until reset.
    fatal_page: Option<u32>,
}

impl<F: PageFetcher> BatchRun<F> {
    #[must_use]
    pub fn new(fetcher: F, filters: SearchFilters) -> Self {
        Self {
            fetcher,
            filters,
            run_id: Uuid::new_v4(),
            state: BatchState::Idle,
            progress: BatchProgress::default(),
            records: RecordSet::default(),
            breadcrumbs: Vec::new(),
            pagination: None,
            page_from: 0,
            page_to: 0,
            fatal_page: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> BatchState {
        self.state
    }

    #[must_use]
    pub fn progress(&self) -> &BatchProgress {
        &self.progress
    }

    #[must_use]
    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Page that ended the run with a fatal error, if any.
    #[must_use]
    pub fn fatal_page(&self) -> Option<u32> {
        self.fatal_page
    }

    /// Pages covered by the run, inclusive.
    #[must_use]
    pub fn page_range(&self) -> (u32, u32) {
        (self.page_from, self.page_to)
    }

    /// Fetches pages `from..=to`, one at a time.
    ///
    /// A page that errors, is malformed, or comes back empty is recorded as
    /// failed and contributes no records; the run always continues to `to`.
    /// Any previous results are discarded first.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::InvalidRange`] if `from` is 0 or `to < from`,
    /// and [`BatchError::Fatal`] when the relay rejects a request. The run is
    /// still settled in that case, with the rejected page failed and the
    /// remaining pages unfetched.
    pub async fn collect_range(
        &mut self,
        from: u32,
        to: u32,
        mut on_progress: impl FnMut(&BatchProgress),
    ) -> Result<BatchState, BatchError> {
        if from == 0 || to < from {
            return Err(BatchError::InvalidRange { from, to });
        }
        self.begin(from, to, BatchProgress::planned(to - from + 1));
        tracing::info!(run_id = %self.run_id, from, to, "collecting page range");

        for page in from..=to {
            match self.fetcher.fetch(&self.filters.for_page(page), page).await {
                Ok(result) if !result.organizations.is_empty() => self.accept(page, result),
                Ok(_) => {
                    tracing::warn!(run_id = %self.run_id, page, "page returned no companies");
                    self.progress.mark_failed(page);
                }
                Err(e) if e.is_fatal() => {
                    self.progress.mark_failed(page);
                    self.progress.advance();
                    on_progress(&self.progress);
                    return Err(self.abort(page, &e));
                }
                Err(e) => {
                    tracing::warn!(run_id = %self.run_id, page, error = %e, "page fetch failed");
                    self.progress.mark_failed(page);
                }
            }
            self.progress.advance();
            on_progress(&self.progress);
        }

        Ok(self.settle())
    }

    /// Fetches pages from `from` until one comes back empty or malformed.
    ///
    /// A fetch error stops the run and marks that one page failed. Stops
    /// after [`MAX_OPEN_ENDED_PAGES`] pages, or at the last representable
    /// page number, regardless. Any previous results are discarded first.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::InvalidRange`] if `from` is 0, and
    /// [`BatchError::Fatal`] when the relay rejects a request.
    pub async fn collect_all(
        &mut self,
        from: u32,
        mut on_progress: impl FnMut(&BatchProgress),
    ) -> Result<BatchState, BatchError> {
        if from == 0 {
            return Err(BatchError::InvalidRange { from, to: from });
        }
        self.begin(from, from, BatchProgress::default());
        tracing::info!(run_id = %self.run_id, from, "collecting until end of data");

        let mut page = from;
        loop {
            if page - from >= MAX_OPEN_ENDED_PAGES {
                tracing::warn!(
                    run_id = %self.run_id,
                    max_pages = MAX_OPEN_ENDED_PAGES,
                    "open-ended collection hit page limit"
                );
                break;
            }

            self.progress.extend_and_advance();
            let outcome = self.fetcher.fetch(&self.filters.for_page(page), page).await;
            let keep_going = match outcome {
                Ok(result) if !result.organizations.is_empty() => {
                    self.accept(page, result);
                    self.page_to = page;
                    true
                }
                Ok(_) => {
                    tracing::info!(run_id = %self.run_id, page, "no more companies");
                    false
                }
                Err(e) if e.is_malformed() => {
                    tracing::info!(run_id = %self.run_id, page, error = %e, "malformed page, treating as end of data");
                    false
                }
                Err(e) if e.is_fatal() => {
                    self.progress.mark_failed(page);
                    self.page_to = page;
                    on_progress(&self.progress);
                    return Err(self.abort(page, &e));
                }
                Err(e) => {
                    tracing::warn!(run_id = %self.run_id, page, error = %e, "page fetch failed, stopping");
                    self.progress.mark_failed(page);
                    self.page_to = page;
                    false
                }
            };
            on_progress(&self.progress);

            if !keep_going {
                break;
            }
            let Some(next) = page.checked_add(1) else {
                tracing::warn!(run_id = %self.run_id, page, "reached the last page number");
                break;
            };
            page = next;
        }

        Ok(self.settle())
    }

    /// Re-fetches the current failed pages for up to
    /// [`MAX_RETRY_GENERATIONS`] generations.
    ///
    /// A page that succeeds has its earlier records replaced by the new ones
    /// and leaves the failed set. Returns the pages still failing afterwards.
    /// With no failed pages this does nothing. After a fatal relay rejection
    /// nothing is re-fetched and a new rejection ends the pass.
    pub async fn reprocess_failed_pages(
        &mut self,
        mut on_progress: impl FnMut(&BatchProgress),
    ) -> Vec<u32> {
        if !self.progress.has_failures() {
            return Vec::new();
        }
        if let Some(page) = self.fatal_page {
            tracing::warn!(run_id = %self.run_id, page, "skipping retry after relay rejection");
            return self.progress.failed_pages();
        }
        self.state = BatchState::Retrying;

        'generations: for generation in 1..=MAX_RETRY_GENERATIONS {
            let pending = self.progress.failed_pages();
            if pending.is_empty() {
                break;
            }
            tracing::info!(run_id = %self.run_id, generation, pages = ?pending, "reprocessing failed pages");
            self.progress
                .restart(u32::try_from(pending.len()).unwrap_or(u32::MAX));

            for page in pending {
                match self.fetcher.fetch(&self.filters.for_page(page), page).await {
                    Ok(result) => {
                        self.records.remove_page(page);
                        self.accept(page, result);
                        self.progress.mark_recovered(page);
                        tracing::info!(run_id = %self.run_id, generation, page, "page recovered");
                    }
                    Err(e) if e.is_fatal() => {
                        self.progress.advance();
                        on_progress(&self.progress);
                        self.fatal_page = Some(page);
                        tracing::error!(run_id = %self.run_id, generation, page, error = %e, "relay rejected retry, giving up");
                        break 'generations;
                    }
                    Err(e) => {
                        tracing::warn!(run_id = %self.run_id, generation, page, error = %e, "page failed again");
                    }
                }
                self.progress.advance();
                on_progress(&self.progress);
            }
        }

        self.settle();
        self.progress.failed_pages()
    }

    /// Copy of the run's results for the export assembler.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::NotReady`] while the run is idle or in progress.
    pub fn snapshot(&self) -> Result<BatchSnapshot, BatchError> {
        if !self.state.is_settled() {
            return Err(BatchError::NotReady { state: self.state });
        }
        Ok(BatchSnapshot {
            records: self.records.records().to_vec(),
            failed_pages: self.progress.failed_pages(),
            page_from: self.page_from,
            page_to: self.page_to,
            breadcrumbs: self.breadcrumbs.clone(),
        })
    }

    /// Records that the run's results were written out.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::NotReady`] unless the run is `Ready`.
    pub fn mark_exported(&mut self) -> Result<(), BatchError> {
        if self.state != BatchState::Ready {
            return Err(BatchError::NotReady { state: self.state });
        }
        self.state = BatchState::Exported;
        Ok(())
    }

    #[must_use]
    pub fn summary(&self) -> BatchSummary {
        let failed_pages = self.progress.failed_pages();
        let pages = if self.state == BatchState::Idle {
            0
        } else {
            u64::from(self.page_to - self.page_from + 1)
        };
        let expected_records = pages * u64::from(self.filters.per_page);
        let total_records = self.records.len();
        let collected = u64::try_from(total_records).unwrap_or(u64::MAX);
        let shortfall = if failed_pages.is_empty() {
            Some(expected_records.saturating_sub(collected)).filter(|&n| n > 0)
        } else {
            None
        };

        BatchSummary {
            total_records,
            page_counts: self.records.page_counts(),
            expected_records,
            shortfall,
            failed_pages,
            has_duplicate_or_missing_ids: self.records.has_duplicate_or_missing_ids(),
            reported_total_entries: self.pagination.map(|p| p.total_entries),
        }
    }

    /// Discards all results and returns to `Idle`.
    pub fn reset(&mut self) {
        self.state = BatchState::Idle;
        self.progress = BatchProgress::default();
        self.records.clear();
        self.breadcrumbs.clear();
        self.pagination = None;
        self.page_from = 0;
        self.page_to = 0;
        self.fatal_page = None;
    }

    /// Consumes the run, returning its records.
    #[must_use]
    pub fn into_records(self) -> Vec<CompanyRecord> {
        self.records.into_records()
    }

    fn begin(&mut self, from: u32, to: u32, progress: BatchProgress) {
        self.reset();
        self.run_id = Uuid::new_v4();
        self.state = BatchState::Collecting;
        self.progress = progress;
        self.page_from = from;
        self.page_to = to;
    }

    fn accept(&mut self, page: u32, result: SearchPage) {
        if self.breadcrumbs.is_empty() {
            self.breadcrumbs = result.breadcrumbs;
        }
        if self.pagination.is_none() {
            self.pagination = Some(result.pagination);
        }
        self.records.push_page(page, result.organizations);
    }

    /// Settles the run after a fatal rejection of `page`.
    fn abort(&mut self, page: u32, error: &FetchError) -> BatchError {
        tracing::error!(run_id = %self.run_id, page, error = %error, "relay rejected request, stopping");
        self.fatal_page = Some(page);
        self.settle();
        BatchError::Fatal {
            page,
            message: error.source.to_string(),
        }
    }

    fn settle(&mut self) -> BatchState {
        self.state = if self.progress.has_failures() {
            BatchState::ReadyWithErrors
        } else {
            BatchState::Ready
        };
        tracing::info!(
            run_id = %self.run_id,
            state = %self.state,
            records = self.records.len(),
            failed_pages = ?self.progress.failed_pages(),
            "batch run settled"
        );
        self.state
    }
}
