// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use tendrs::domain::models::filters::SearchCategory;
use tendrs::domain::search::source::{HarvestError, TenderSource};
use tendrs::infrastructure::harvest::fetcher::PageFetcher;
use tendrs::infrastructure::harvest::record_filter::RecordFilter;
use tendrs::infrastructure::harvest::retry::RetryPolicy;

use crate::helpers::{filters_for, no_match_pattern, tender, StubSource};

fn page_of(count: usize, page: u32) -> Vec<tendrs::domain::models::tender::Tender> {
    (0..count)
        .map(|i| tender(&format!("lot-{}-{}", page, i), "100"))
        .collect()
}

fn stub_filter(source: &StubSource) -> RecordFilter {
    RecordFilter::new(no_match_pattern(), 0, source.origin())
}

/// Pages of sizes [N, N, N, k<N] stop the loop after exactly 4 pages with
/// 3N+k records aggregated.
#[tokio::test(start_paused = true)]
async fn test_pagination_stops_on_short_page() {
    let source = StubSource::new(5).with_script(
        "stub",
        vec![page_of(5, 1), page_of(5, 2), page_of(5, 3), page_of(2, 4)],
    );
    let fetcher = PageFetcher::new(RetryPolicy::standard());
    let filters = filters_for(SearchCategory::Doors, 0);
    let query = source
        .build_query("stub", SearchCategory::Doors, &filters)
        .unwrap();

    let records = fetcher
        .fetch_all(&source, &query, "stub", &stub_filter(&source))
        .await
        .unwrap();

    assert_eq!(records.len(), 17);
    assert_eq!(source.attempts(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_pagination_stops_on_empty_page() {
    let source = StubSource::new(5).with_script("stub", vec![page_of(5, 1), Vec::new()]);
    let fetcher = PageFetcher::new(RetryPolicy::standard());
    let filters = filters_for(SearchCategory::Doors, 0);
    let query = source
        .build_query("stub", SearchCategory::Doors, &filters)
        .unwrap();

    let records = fetcher
        .fetch_all(&source, &query, "stub", &stub_filter(&source))
        .await
        .unwrap();

    assert_eq!(records.len(), 5);
    assert_eq!(source.attempts(), 2);
}

/// When the reported total is below the saturation cap the loop stops as
/// soon as `page × size` reaches it, even though every page is full.
#[tokio::test(start_paused = true)]
async fn test_pagination_stops_at_reported_total() {
    let source = StubSource::new(2)
        .with_total_hits(4)
        .with_script("stub", vec![page_of(2, 1), page_of(2, 2), page_of(2, 3)]);
    let fetcher = PageFetcher::new(RetryPolicy::standard());
    let filters = filters_for(SearchCategory::Doors, 0);
    let query = source
        .build_query("stub", SearchCategory::Doors, &filters)
        .unwrap();

    let records = fetcher
        .fetch_all(&source, &query, "stub", &stub_filter(&source))
        .await
        .unwrap();

    assert_eq!(records.len(), 4);
    assert_eq!(source.attempts(), 2);
}

/// A total at the saturation cap is not trusted; the page ceiling bounds
/// the loop instead.
#[tokio::test(start_paused = true)]
async fn test_pagination_respects_page_ceiling() {
    let source = StubSource::new(2)
        .with_total_hits(10_000)
        .with_max_pages(2)
        .with_script("stub", vec![page_of(2, 1), page_of(2, 2), page_of(2, 3)]);
    let fetcher = PageFetcher::new(RetryPolicy::standard());
    let filters = filters_for(SearchCategory::Doors, 0);
    let query = source
        .build_query("stub", SearchCategory::Doors, &filters)
        .unwrap();

    let records = fetcher
        .fetch_all(&source, &query, "stub", &stub_filter(&source))
        .await
        .unwrap();

    assert_eq!(records.len(), 4);
    assert_eq!(source.attempts(), 2);
}

/// Two transport failures burn two backoff delays (2s + 8s under the
/// standard policy); the third attempt succeeds. Virtual time proves the
/// exact number of backoffs observed.
#[tokio::test(start_paused = true)]
async fn test_retry_succeeds_within_budget() {
    let source = StubSource::new(5)
        .with_script("stub", vec![page_of(2, 1)])
        .with_transport_failures("stub", 1, 2);
    let fetcher = PageFetcher::new(RetryPolicy::standard());
    let filters = filters_for(SearchCategory::Doors, 0);
    let query = source
        .build_query("stub", SearchCategory::Doors, &filters)
        .unwrap();

    let started = tokio::time::Instant::now();
    let records = fetcher
        .fetch_all(&source, &query, "stub", &stub_filter(&source))
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(source.attempts(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(10));
}

/// A third consecutive transport failure exhausts the budget and surfaces
/// a page-tagged fatal error.
#[tokio::test(start_paused = true)]
async fn test_retry_budget_exhausted() {
    let source = StubSource::new(5)
        .with_script("stub", vec![page_of(5, 1), page_of(5, 2)])
        .with_transport_failures("stub", 2, 3);
    let fetcher = PageFetcher::new(RetryPolicy::standard());
    let filters = filters_for(SearchCategory::Doors, 0);
    let query = source
        .build_query("stub", SearchCategory::Doors, &filters)
        .unwrap();

    let err = fetcher
        .fetch_all(&source, &query, "stub", &stub_filter(&source))
        .await
        .unwrap_err();

    match err {
        HarvestError::Page { page, source: inner } => {
            assert_eq!(page, 2);
            assert!(matches!(
                *inner,
                HarvestError::RetriesExhausted { attempts: 3, .. }
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // 1 attempt for page 1, 3 for page 2.
    assert_eq!(source.attempts(), 4);
}

/// Non-2xx statuses are terminal: no retries, no backoff.
#[tokio::test(start_paused = true)]
async fn test_status_error_is_not_retried() {
    let source = StubSource::new(5).with_status_failure("stub");
    let fetcher = PageFetcher::new(RetryPolicy::standard());
    let filters = filters_for(SearchCategory::Doors, 0);
    let query = source
        .build_query("stub", SearchCategory::Doors, &filters)
        .unwrap();

    let started = tokio::time::Instant::now();
    let err = fetcher
        .fetch_all(&source, &query, "stub", &stub_filter(&source))
        .await
        .unwrap_err();

    match err {
        HarvestError::Page { page, source: inner } => {
            assert_eq!(page, 1);
            assert!(matches!(*inner, HarvestError::Status(500)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(source.attempts(), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

/// The category minimum price is applied per page, inside the loop.
#[tokio::test(start_paused = true)]
async fn test_records_below_minimum_price_are_dropped_per_page() {
    let source = StubSource::new(5).with_script(
        "stub",
        vec![vec![
            tender("Дорогой лот", "200000"),
            tender("Дешёвый лот", "50000"),
        ]],
    );
    let fetcher = PageFetcher::new(RetryPolicy::standard());
    let filter = RecordFilter::new(no_match_pattern(), 100_000, source.origin());
    let filters = filters_for(SearchCategory::Doors, 100_000);
    let query = source
        .build_query("stub", SearchCategory::Doors, &filters)
        .unwrap();

    let records = fetcher
        .fetch_all(&source, &query, "stub", &filter)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Дорогой лот");
}
