// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tracing::{info, warn};

use crate::domain::models::tender::Tender;
use crate::domain::search::source::{HarvestError, TenderSource};
use crate::infrastructure::harvest::record_filter::RecordFilter;
use crate::infrastructure::harvest::retry::RetryPolicy;

/// The commercial portal reports at most this many hits; a total at the cap
/// says nothing about the real result count.
pub const TOTAL_SATURATION_CAP: u64 = 10_000;

/// Drives one query across all of its pages.
///
/// The loop is shared by every source: pagination, retry/backoff, the
/// stopping rules, and per-page filtering live here exactly once.
pub struct PageFetcher {
    policy: RetryPolicy,
}

impl PageFetcher {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Fetch every page of `query`, filter each page's records, and return
    /// the accumulated set. `label` names the phrase in logs and errors.
    ///
    /// A page that exhausts its retry budget, returns a non-2xx status, or
    /// fails to parse aborts the whole fetch with a page-tagged error.
    pub async fn fetch_all<S: TenderSource>(
        &self,
        source: &S,
        query: &S::Query,
        label: &str,
        filter: &RecordFilter,
    ) -> Result<Vec<Tender>, HarvestError> {
        let page_size = source.page_size();
        let mut collected = Vec::new();
        let mut page = 1u32;

        loop {
            info!(source = source.name(), phrase = label, page, "fetching page");

            let body = self
                .fetch_page_with_retry(source, query, page)
                .await
                .map_err(|e| HarvestError::page(page, e))?;

            let extracted = source
                .extract_records(&body)
                .map_err(|e| HarvestError::page(page, e))?;

            let cards = extracted.cards;
            let total_hits = extracted.total_hits;

            let mut kept: Vec<Tender> = extracted
                .records
                .into_iter()
                .filter_map(|tender| filter.apply(tender))
                .collect();
            source.enrich(&mut kept).await;

            info!(
                source = source.name(),
                phrase = label,
                page,
                cards,
                kept = kept.len(),
                "page extracted"
            );
            collected.extend(kept);

            if cards == 0 {
                info!(source = source.name(), phrase = label, page, "empty page, stopping");
                break;
            }
            if cards < page_size {
                info!(source = source.name(), phrase = label, page, "last page reached");
                break;
            }
            if let Some(total) = total_hits {
                if total < TOTAL_SATURATION_CAP && u64::from(page * page_size) >= total {
                    info!(source = source.name(), phrase = label, total, "reported total reached");
                    break;
                }
            }
            if let Some(max) = source.max_pages() {
                if page >= max {
                    warn!(source = source.name(), phrase = label, max, "page ceiling reached");
                    break;
                }
            }

            page += 1;
            tokio::time::sleep(self.policy.page_delay).await;
        }

        info!(
            source = source.name(),
            phrase = label,
            total = collected.len(),
            "phrase fetch finished"
        );
        Ok(collected)
    }

    /// One page with the retry budget applied. Only transport failures are
    /// retried; protocol errors surface immediately.
    async fn fetch_page_with_retry<S: TenderSource>(
        &self,
        source: &S,
        query: &S::Query,
        page: u32,
    ) -> Result<String, HarvestError> {
        let mut attempt = 1u32;
        loop {
            match source.fetch_page(query, page).await {
                Ok(body) => return Ok(body),
                Err(err) if err.is_retryable() && self.policy.should_retry(attempt) => {
                    let wait = self.policy.backoff(attempt);
                    warn!(
                        source = source.name(),
                        page,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        error = %err,
                        "attempt failed, backing off"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(err) if err.is_retryable() => {
                    return Err(HarvestError::RetriesExhausted {
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }
}
