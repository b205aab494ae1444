// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::Mutex;
use tracing::warn;

use crate::domain::models::filters::SearchFilters;
use crate::domain::models::report::{AggregateReport, CategoryTenders};
use crate::domain::search::source::{CategoryError, TenderSource};
use crate::infrastructure::harvest::orchestrator::CategoryOrchestrator;
use crate::infrastructure::sources::gov_portal::GovPortalSource;
use crate::infrastructure::sources::sber_ast::SberAstSource;

type Stats = Arc<Mutex<BTreeMap<String, usize>>>;
type Warnings = Arc<Mutex<Vec<String>>>;

/// Runs the category orchestrator across both portals and merges the
/// outcome into one [`AggregateReport`].
///
/// The sources are independent: a total failure on one side is downgraded
/// to a warning and never blocks the other side's results.
pub struct SourceAggregator {
    gov: Arc<GovPortalSource>,
    sber: Arc<SberAstSource>,
    orchestrator: Arc<CategoryOrchestrator>,
}

impl SourceAggregator {
    pub fn new(
        gov: Arc<GovPortalSource>,
        sber: Arc<SberAstSource>,
        orchestrator: Arc<CategoryOrchestrator>,
    ) -> Self {
        Self {
            gov,
            sber,
            orchestrator,
        }
    }

    pub async fn run(&self, filters: SearchFilters) -> AggregateReport {
        let filters = Arc::new(filters);
        let stats: Stats = Arc::new(Mutex::new(BTreeMap::new()));
        let warnings: Warnings = Arc::new(Mutex::new(Vec::new()));

        let (gov_tenders, sber_tenders) = tokio::join!(
            self.harvest_source(&self.gov, &filters, &stats, &warnings),
            self.harvest_source(&self.sber, &filters, &stats, &warnings),
        );

        let mut stats = std::mem::take(&mut *stats.lock());
        let total = [self.gov.stat_tag(), self.sber.stat_tag()]
            .iter()
            .map(|tag| {
                stats
                    .get(&format!("totalFound{}", tag))
                    .copied()
                    .unwrap_or(0)
            })
            .sum();
        stats.insert("totalFound".to_string(), total);

        let mut warnings = std::mem::take(&mut *warnings.lock());
        if total == 0 {
            // A valid outcome, distinguishable from a failed run.
            warn!("no tenders found from any source");
            warnings.push("no tenders found from any source".to_string());
        }

        AggregateReport {
            zakupki_gov_ru: gov_tenders,
            sber_ast: sber_tenders,
            stats,
            warnings,
        }
    }

    /// Harvest every enabled category of one source concurrently.
    async fn harvest_source<S>(
        &self,
        source: &Arc<S>,
        filters: &Arc<SearchFilters>,
        stats: &Stats,
        warnings: &Warnings,
    ) -> CategoryTenders
    where
        S: TenderSource + 'static,
    {
        let mut handles = Vec::new();
        for &category in &filters.categories {
            let orchestrator = Arc::clone(&self.orchestrator);
            let source = Arc::clone(source);
            let filters = Arc::clone(filters);
            handles.push(tokio::spawn(async move {
                orchestrator.harvest(&source, category, &filters).await
            }));
        }

        let mut tenders = CategoryTenders::new();
        for joined in join_all(handles).await {
            let result = match joined {
                Ok(result) => result,
                Err(err) => {
                    warnings
                        .lock()
                        .push(format!("{}: harvest task failed: {}", source.name(), err));
                    continue;
                }
            };

            let category = result.category;
            let found = result.tenders.len();

            if result.is_total_failure() {
                let error = CategoryError {
                    category,
                    failures: result.failures,
                };
                warn!(source = source.name(), %error, "category failed on every phrase");
                warnings
                    .lock()
                    .push(format!("{}: {}", source.name(), error));
            } else if !result.failures.is_empty() {
                let detail: Vec<String> =
                    result.failures.iter().map(|f| f.to_string()).collect();
                warnings.lock().push(format!(
                    "{}: {} partial failure: {}",
                    source.name(),
                    category.key(),
                    detail.join("; ")
                ));
            }

            {
                let mut stats = stats.lock();
                stats.insert(
                    format!("{}Found{}", category.key(), source.stat_tag()),
                    found,
                );
                *stats
                    .entry(format!("totalFound{}", source.stat_tag()))
                    .or_insert(0) += found;
            }

            tenders.insert(category, result.tenders);
        }

        // A source with no categories fetched still reports a zero total.
        stats
            .lock()
            .entry(format!("totalFound{}", source.stat_tag()))
            .or_insert(0);

        tenders
    }
}
