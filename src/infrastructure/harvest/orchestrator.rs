// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::Mutex;
use regex::Regex;
use tracing::{info, warn};

use crate::domain::models::filters::{SearchCategory, SearchFilters};
use crate::domain::models::report::CategoryResult;
use crate::domain::models::tender::Tender;
use crate::domain::search::source::{HarvestError, PhraseFailure, TenderSource};
use crate::infrastructure::harvest::fetcher::PageFetcher;
use crate::infrastructure::harvest::record_filter::RecordFilter;
use crate::infrastructure::harvest::retry::RetryPolicy;

/// Drop duplicate titles, keeping the first occurrence. Idempotent; empty
/// titles are dropped outright.
///
/// Title is a weak identity key (two distinct tenders can share one), but
/// it is the portal-compatible behavior; see DESIGN.md before changing it.
pub fn merge_unique(tenders: Vec<Tender>) -> Vec<Tender> {
    let mut seen = HashSet::new();
    tenders
        .into_iter()
        .filter(|tender| !tender.title.is_empty() && seen.insert(tender.title.clone()))
        .collect()
}

/// Runs every search phrase of a category concurrently and merges the
/// results.
///
/// One task per phrase, full fan-out, and a join point that always waits
/// for every sibling: a failing phrase never cancels the others. Partial
/// results are kept alongside the failures.
pub struct CategoryOrchestrator {
    fetcher: Arc<PageFetcher>,
    exclude: Arc<Regex>,
}

impl CategoryOrchestrator {
    pub fn new(policy: RetryPolicy, exclude: Arc<Regex>) -> Self {
        Self {
            fetcher: Arc::new(PageFetcher::new(policy)),
            exclude,
        }
    }

    pub async fn harvest<S>(
        &self,
        source: &Arc<S>,
        category: SearchCategory,
        filters: &Arc<SearchFilters>,
    ) -> CategoryResult
    where
        S: TenderSource + 'static,
    {
        let phrases = source.phrases(category);
        let collected = Arc::new(Mutex::new(Vec::<Tender>::new()));
        let failures = Arc::new(Mutex::new(Vec::<PhraseFailure>::new()));

        let mut handles = Vec::with_capacity(phrases.len());
        for &phrase in phrases {
            let source = Arc::clone(source);
            let filters = Arc::clone(filters);
            let fetcher = Arc::clone(&self.fetcher);
            let collected = Arc::clone(&collected);
            let failures = Arc::clone(&failures);
            let filter = RecordFilter::new(
                Arc::clone(&self.exclude),
                filters.min_price(category),
                source.origin(),
            );

            handles.push(tokio::spawn(async move {
                let outcome = match source.build_query(phrase, category, &filters) {
                    Ok(query) => fetcher.fetch_all(&*source, &query, phrase, &filter).await,
                    Err(err) => Err(err),
                };

                // Append under the lock, in completion order.
                match outcome {
                    Ok(tenders) => collected.lock().extend(tenders),
                    Err(error) => failures.lock().push(PhraseFailure {
                        phrase: phrase.to_string(),
                        error,
                    }),
                }
            }));
        }

        let joined = join_all(handles).await;
        for (&phrase, result) in phrases.iter().zip(joined) {
            if let Err(err) = result {
                failures.lock().push(PhraseFailure {
                    phrase: phrase.to_string(),
                    error: HarvestError::Task(err.to_string()),
                });
            }
        }

        let merged = merge_unique(std::mem::take(&mut *collected.lock()));
        let failures = std::mem::take(&mut *failures.lock());

        if failures.is_empty() {
            info!(
                source = source.name(),
                category = category.key(),
                found = merged.len(),
                "category harvested"
            );
        } else {
            warn!(
                source = source.name(),
                category = category.key(),
                found = merged.len(),
                failed_phrases = failures.len(),
                "category harvested with failures"
            );
        }

        CategoryResult {
            category,
            tenders: merged,
            failures,
        }
    }
}
