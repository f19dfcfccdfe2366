//! Batch collector behaviour against a scripted in-memory page fetcher.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use onset_apollo::{
    ApolloError, BatchError, BatchRun, BatchState, FetchError, PageFetcher, SearchPage,
};
use onset_core::{Breadcrumb, CompanyRecord, Pagination, SearchFilters};

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Records(usize),
    Empty,
    Fail,
    Malformed,
    Rejected,
}

/// Answers each page from its script, falling back to `default` once the
/// script for that page runs out.
#[derive(Clone)]
struct ScriptedFetcher {
    scripts: Arc<Mutex<HashMap<u32, VecDeque<Outcome>>>>,
    default: Outcome,
    calls: Arc<AtomicU32>,
    order: Arc<Mutex<Vec<u32>>>,
}

impl ScriptedFetcher {
    fn new(default: Outcome) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(HashMap::new())),
            default,
            calls: Arc::new(AtomicU32::new(0)),
            order: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn script(self, page: u32, outcomes: &[Outcome]) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(page, outcomes.iter().copied().collect());
        self
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn order(&self) -> Vec<u32> {
        self.order.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, filters: &SearchFilters, page: u32) -> Result<SearchPage, FetchError> {
        assert_eq!(filters.page, page, "filters must target the fetched page");
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
        self.order.lock().unwrap().push(page);

        let outcome = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&page)
            .and_then(VecDeque::pop_front)
            .unwrap_or(self.default);

        match outcome {
            Outcome::Records(n) => Ok(SearchPage {
                organizations: (0..n)
                    .map(|i| {
                        CompanyRecord::from(json!({
                            "id": format!("p{page}-c{attempt}-{i}"),
                            "name": format!("Empresa {page}.{i}")
                        }))
                    })
                    .collect(),
                pagination: Pagination {
                    page,
                    per_page: filters.per_page,
                    total_entries: 1000,
                    total_pages: 40,
                },
                breadcrumbs: vec![Breadcrumb {
                    label: "Company Locations".to_string(),
                    signal_field_name: "organization_locations".to_string(),
                    value: json!("Brazil"),
                    display_name: format!("from page {page}"),
                }],
            }),
            Outcome::Empty => Ok(SearchPage::default()),
            Outcome::Fail => Err(FetchError::new(
                page,
                ApolloError::UnexpectedStatus {
                    status: 502,
                    url: "http://apollo.test".to_string(),
                },
            )),
            Outcome::Malformed => Err(FetchError::new(
                page,
                ApolloError::MissingOrganizations { page },
            )),
            Outcome::Rejected => Err(FetchError::new(
                page,
                ApolloError::Relay {
                    status: 500,
                    message: "API key not configured".to_string(),
                },
            )),
        }
    }
}

fn run(fetcher: &ScriptedFetcher) -> BatchRun<ScriptedFetcher> {
    BatchRun::new(fetcher.clone(), SearchFilters::default())
}

#[tokio::test]
async fn range_fetches_each_page_exactly_once_in_order() {
    let fetcher = ScriptedFetcher::new(Outcome::Records(25));
    let mut batch = run(&fetcher);
    let mut reports = Vec::new();

    let state = batch
        .collect_range(3, 7, |p| reports.push((p.current(), p.total())))
        .await
        .unwrap();

    assert_eq!(state, BatchState::Ready);
    assert_eq!(fetcher.calls(), 5);
    assert_eq!(fetcher.order(), vec![3, 4, 5, 6, 7]);
    assert_eq!(reports, vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]);
    assert_eq!(batch.records().len(), 125);
    assert_eq!(batch.page_range(), (3, 7));
}

#[tokio::test]
async fn range_records_failures_and_continues() {
    let fetcher = ScriptedFetcher::new(Outcome::Records(2))
        .script(2, &[Outcome::Fail])
        .script(3, &[Outcome::Empty])
        .script(4, &[Outcome::Malformed]);
    let mut batch = run(&fetcher);

    let state = batch.collect_range(1, 5, |_| {}).await.unwrap();

    assert_eq!(state, BatchState::ReadyWithErrors);
    assert_eq!(fetcher.calls(), 5);
    assert_eq!(batch.progress().failed_pages(), vec![2, 3, 4]);
    assert_eq!(batch.records().len(), 4);
    assert_eq!(batch.records().count_for_page(2), 0);
}

#[tokio::test]
async fn invalid_ranges_are_rejected_without_fetching() {
    let fetcher = ScriptedFetcher::new(Outcome::Records(1));
    let mut batch = run(&fetcher);

    assert_eq!(
        batch.collect_range(0, 2, |_| {}).await,
        Err(BatchError::InvalidRange { from: 0, to: 2 })
    );
    assert_eq!(
        batch.collect_range(5, 4, |_| {}).await,
        Err(BatchError::InvalidRange { from: 5, to: 4 })
    );
    assert_eq!(fetcher.calls(), 0);
    assert_eq!(batch.state(), BatchState::Idle);
}

#[tokio::test]
async fn retry_replaces_records_of_recovered_page() {
    // Page 2 fails during collection, then returns 3 records on retry.
    let fetcher = ScriptedFetcher::new(Outcome::Records(25))
        .script(2, &[Outcome::Fail, Outcome::Records(3)]);
    let mut batch = run(&fetcher);

    batch.collect_range(1, 3, |_| {}).await.unwrap();
    assert_eq!(batch.progress().failed_pages(), vec![2]);

    let still_failing = batch.reprocess_failed_pages(|_| {}).await;

    assert!(still_failing.is_empty());
    assert_eq!(batch.state(), BatchState::Ready);
    assert_eq!(batch.records().count_for_page(2), 3);
    assert_eq!(batch.records().len(), 53);
    assert_eq!(fetcher.calls(), 4);
}

#[tokio::test]
async fn retry_never_accumulates_old_and_new_records() {
    // An empty answer during collection is a failure in ranged mode but the
    // retry accepts whatever the page returns.
    let fetcher = ScriptedFetcher::new(Outcome::Records(4)).script(1, &[Outcome::Empty]);
    let mut batch = run(&fetcher);

    batch.collect_range(1, 2, |_| {}).await.unwrap();
    batch.reprocess_failed_pages(|_| {}).await;

    assert_eq!(batch.records().count_for_page(1), 4);
    assert_eq!(batch.records().count_for_page(2), 4);
    assert!(!batch.records().has_duplicate_or_missing_ids());
}

#[tokio::test]
async fn retry_with_no_failures_is_a_no_op() {
    let fetcher = ScriptedFetcher::new(Outcome::Records(1));
    let mut batch = run(&fetcher);
    batch.collect_range(1, 2, |_| {}).await.unwrap();

    let before = batch.records().len();
    let still_failing = batch.reprocess_failed_pages(|_| panic!("no progress expected")).await;

    assert!(still_failing.is_empty());
    assert_eq!(fetcher.calls(), 2);
    assert_eq!(batch.records().len(), before);
    assert_eq!(batch.state(), BatchState::Ready);
}

#[tokio::test]
async fn retry_gives_up_after_three_generations() {
    let fetcher = ScriptedFetcher::new(Outcome::Records(2))
        .script(2, &[Outcome::Fail, Outcome::Fail, Outcome::Fail, Outcome::Fail]);
    let mut batch = run(&fetcher);
    batch.collect_range(1, 3, |_| {}).await.unwrap();

    let still_failing = batch.reprocess_failed_pages(|_| {}).await;

    assert_eq!(still_failing, vec![2]);
    assert_eq!(batch.state(), BatchState::ReadyWithErrors);
    // 3 collection fetches + 3 retry generations of page 2.
    assert_eq!(fetcher.calls(), 6);
    assert_eq!(fetcher.order(), vec![1, 2, 3, 2, 2, 2]);
}

#[tokio::test]
async fn retry_stops_once_every_page_recovers() {
    let fetcher = ScriptedFetcher::new(Outcome::Records(2))
        .script(2, &[Outcome::Fail, Outcome::Fail])
        .script(4, &[Outcome::Fail]);
    let mut batch = run(&fetcher);
    batch.collect_range(1, 4, |_| {}).await.unwrap();

    let still_failing = batch.reprocess_failed_pages(|_| {}).await;

    assert!(still_failing.is_empty());
    // Generation 1 retries 2 and 4 (2 fails again), generation 2 retries only 2.
    assert_eq!(fetcher.order(), vec![1, 2, 3, 4, 2, 4, 2]);
}

#[tokio::test]
async fn collect_all_stops_at_first_empty_page() {
    let fetcher = ScriptedFetcher::new(Outcome::Records(25)).script(4, &[Outcome::Empty]);
    let mut batch = run(&fetcher);
    let mut reports = Vec::new();

    let state = batch
        .collect_all(1, |p| reports.push((p.current(), p.total())))
        .await
        .unwrap();

    assert_eq!(state, BatchState::Ready);
    assert_eq!(fetcher.order(), vec![1, 2, 3, 4]);
    assert_eq!(batch.records().len(), 75);
    assert_eq!(batch.page_range(), (1, 3));
    assert!(reports.iter().all(|(current, total)| current <= total));
}

#[tokio::test]
async fn collect_all_treats_malformed_page_as_end_of_data() {
    let fetcher = ScriptedFetcher::new(Outcome::Records(1)).script(3, &[Outcome::Malformed]);
    let mut batch = run(&fetcher);

    let state = batch.collect_all(2, |_| {}).await.unwrap();

    assert_eq!(state, BatchState::Ready);
    assert_eq!(fetcher.order(), vec![2, 3]);
    assert!(batch.progress().failed_pages().is_empty());
}

#[tokio::test]
async fn collect_all_stops_on_error_and_marks_that_page() {
    let fetcher = ScriptedFetcher::new(Outcome::Records(5)).script(3, &[Outcome::Fail]);
    let mut batch = run(&fetcher);

    let state = batch.collect_all(1, |_| {}).await.unwrap();

    assert_eq!(state, BatchState::ReadyWithErrors);
    assert_eq!(fetcher.order(), vec![1, 2, 3]);
    assert_eq!(batch.progress().failed_pages(), vec![3]);
    assert_eq!(batch.records().len(), 10);

    batch.reprocess_failed_pages(|_| {}).await;
    assert_eq!(batch.state(), BatchState::Ready);
    assert_eq!(batch.records().len(), 15);
}

#[tokio::test]
async fn collect_all_from_last_page_number_stops_after_it() {
    let fetcher = ScriptedFetcher::new(Outcome::Records(1));
    let mut batch = run(&fetcher);

    let state = batch.collect_all(u32::MAX, |_| {}).await.unwrap();

    assert_eq!(state, BatchState::Ready);
    assert_eq!(fetcher.order(), vec![u32::MAX]);
    assert_eq!(batch.page_range(), (u32::MAX, u32::MAX));
    assert_eq!(batch.records().len(), 1);
}

#[tokio::test]
async fn range_stops_at_relay_rejection_and_skips_retry() {
    let fetcher = ScriptedFetcher::new(Outcome::Records(3)).script(2, &[Outcome::Rejected]);
    let mut batch = run(&fetcher);

    let err = batch.collect_range(1, 4, |_| {}).await.unwrap_err();

    assert_eq!(
        err,
        BatchError::Fatal {
            page: 2,
            message: "relay error 500: API key not configured".to_string(),
        }
    );
    assert_eq!(fetcher.order(), vec![1, 2]);
    assert_eq!(batch.state(), BatchState::ReadyWithErrors);
    assert_eq!(batch.fatal_page(), Some(2));
    assert_eq!(batch.records().len(), 3);

    let still_failing = batch.reprocess_failed_pages(|_| {}).await;
    assert_eq!(still_failing, vec![2]);
    assert_eq!(fetcher.calls(), 2);
    assert!(batch.snapshot().unwrap().ensure_exportable().is_err());
}

#[tokio::test]
async fn collect_all_stops_at_relay_rejection() {
    let fetcher = ScriptedFetcher::new(Outcome::Records(2)).script(3, &[Outcome::Rejected]);
    let mut batch = run(&fetcher);

    let err = batch.collect_all(1, |_| {}).await.unwrap_err();

    assert!(matches!(err, BatchError::Fatal { page: 3, .. }), "got {err:?}");
    assert_eq!(fetcher.order(), vec![1, 2, 3]);
    assert_eq!(batch.progress().failed_pages(), vec![3]);
    assert_eq!(batch.page_range(), (1, 3));
}

#[tokio::test]
async fn relay_rejection_during_retry_ends_the_pass() {
    let fetcher = ScriptedFetcher::new(Outcome::Records(1))
        .script(1, &[Outcome::Fail, Outcome::Rejected])
        .script(3, &[Outcome::Fail]);
    let mut batch = run(&fetcher);
    batch.collect_range(1, 3, |_| {}).await.unwrap();

    let still_failing = batch.reprocess_failed_pages(|_| {}).await;

    // Page 1 is rejected in generation 1, so page 3 is never retried.
    assert_eq!(fetcher.order(), vec![1, 2, 3, 1]);
    assert_eq!(still_failing, vec![1, 3]);
    assert_eq!(batch.fatal_page(), Some(1));
    assert_eq!(batch.state(), BatchState::ReadyWithErrors);

    batch.reset();
    assert_eq!(batch.fatal_page(), None);
}

#[tokio::test]
async fn snapshot_carries_failed_pages_and_first_breadcrumbs() {
    let fetcher = ScriptedFetcher::new(Outcome::Records(1)).script(1, &[Outcome::Fail]);
    let mut batch = run(&fetcher);

    assert!(matches!(
        batch.snapshot(),
        Err(BatchError::NotReady { state: BatchState::Idle })
    ));

    batch.collect_range(1, 3, |_| {}).await.unwrap();
    let snapshot = batch.snapshot().unwrap();

    assert_eq!(snapshot.failed_pages, vec![1]);
    assert_eq!((snapshot.page_from, snapshot.page_to), (1, 3));
    assert_eq!(snapshot.records.len(), 2);
    assert_eq!(snapshot.breadcrumbs[0].display_name, "from page 2");
    assert!(batch.mark_exported().is_err());
}

#[tokio::test]
async fn mark_exported_then_reset_returns_to_idle() {
    let fetcher = ScriptedFetcher::new(Outcome::Records(3));
    let mut batch = run(&fetcher);
    batch.collect_range(1, 1, |_| {}).await.unwrap();

    batch.mark_exported().unwrap();
    assert_eq!(batch.state(), BatchState::Exported);
    assert!(batch.snapshot().is_ok());

    batch.reset();
    assert_eq!(batch.state(), BatchState::Idle);
    assert!(batch.records().is_empty());
    assert_eq!(batch.progress().total(), 0);
}

#[tokio::test]
async fn new_collection_discards_previous_results() {
    let fetcher = ScriptedFetcher::new(Outcome::Records(2));
    let mut batch = run(&fetcher);

    batch.collect_range(1, 3, |_| {}).await.unwrap();
    batch.collect_range(5, 5, |_| {}).await.unwrap();

    assert_eq!(batch.records().len(), 2);
    assert_eq!(batch.records().page_counts().keys().copied().collect::<Vec<_>>(), vec![5]);
}

#[tokio::test]
async fn summary_reports_counts_and_shortfall() {
    let fetcher = ScriptedFetcher::new(Outcome::Records(25)).script(2, &[Outcome::Records(20)]);
    let mut batch = run(&fetcher);
    batch.collect_range(1, 2, |_| {}).await.unwrap();

    let summary = batch.summary();

    assert_eq!(summary.total_records, 45);
    assert_eq!(summary.expected_records, 50);
    assert_eq!(summary.shortfall, Some(5));
    assert_eq!(summary.page_counts.get(&2), Some(&20));
    assert_eq!(summary.reported_total_entries, Some(1000));
    assert!(!summary.has_duplicate_or_missing_ids);
}

#[tokio::test]
async fn summary_omits_shortfall_while_pages_are_failed() {
    let fetcher = ScriptedFetcher::new(Outcome::Records(25)).script(2, &[Outcome::Fail]);
    let mut batch = run(&fetcher);
    batch.collect_range(1, 2, |_| {}).await.unwrap();

    let summary = batch.summary();
    assert_eq!(summary.failed_pages, vec![2]);
    assert_eq!(summary.shortfall, None);
}
