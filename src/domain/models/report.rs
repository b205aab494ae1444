// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::models::filters::SearchCategory;
use crate::domain::models::tender::Tender;
use crate::domain::search::source::PhraseFailure;

/// Outcome of extracting one fetched page.
///
/// `records` is already stripped of empty-title cards; `cards` counts every
/// listing element / hit seen on the page and drives the stopping rule.
#[derive(Debug, Default)]
pub struct PageResult {
    pub records: Vec<Tender>,
    pub cards: u32,
    /// Server-reported total, present only for the JSON source. The value
    /// saturates at a fixed cap and is not trusted above it.
    pub total_hits: Option<u64>,
}

/// Deduplicated, filtered record set for one category from one source.
#[derive(Debug)]
pub struct CategoryResult {
    pub category: SearchCategory,
    pub tenders: Vec<Tender>,
    pub failures: Vec<PhraseFailure>,
}

impl CategoryResult {
    /// True when every phrase of the category failed outright.
    pub fn is_total_failure(&self) -> bool {
        self.tenders.is_empty() && !self.failures.is_empty()
    }
}

pub type CategoryTenders = BTreeMap<SearchCategory, Vec<Tender>>;

/// Final structure handed to the report renderer: per-source, per-category
/// record lists plus a flat statistics mapping and accumulated warnings.
/// Created once per search request and discarded after rendering.
#[derive(Debug, Default, Serialize)]
pub struct AggregateReport {
    pub zakupki_gov_ru: CategoryTenders,
    pub sber_ast: CategoryTenders,
    pub stats: BTreeMap<String, usize>,
    pub warnings: Vec<String>,
}

impl AggregateReport {
    pub fn total(&self) -> usize {
        self.stats.get("totalFound").copied().unwrap_or(0)
    }

    /// An empty report is a valid outcome, distinct from a failed run.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
