// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::filters::{SearchCategory, SearchFilters};
use crate::domain::models::report::PageResult;
use crate::domain::models::tender::Tender;

/// Errors produced while harvesting a single search phrase.
///
/// Transport failures are the only retryable class; everything else is
/// terminal for the page it occurred on.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status code {0}")]
    Status(u16),

    #[error("malformed {layer} payload: {message}")]
    Decode {
        layer: &'static str,
        message: String,
    },

    #[error("failed to build request: {0}")]
    Request(String),

    #[error("harvest task failed: {0}")]
    Task(String),

    #[error("page {page}: {source}")]
    Page {
        page: u32,
        #[source]
        source: Box<HarvestError>,
    },

    #[error("transport error after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<HarvestError>,
    },
}

impl HarvestError {
    /// Only plain transport failures are worth another attempt. Non-2xx
    /// statuses and malformed payloads will not improve on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, HarvestError::Transport(_))
    }

    pub fn page(page: u32, source: HarvestError) -> Self {
        HarvestError::Page {
            page,
            source: Box::new(source),
        }
    }
}

/// A search phrase that failed outright, with the error that killed it.
#[derive(Debug)]
pub struct PhraseFailure {
    pub phrase: String,
    pub error: HarvestError,
}

impl fmt::Display for PhraseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.phrase, self.error)
    }
}

/// All phrases of a category failed; carries every phrase's failure reason.
#[derive(Debug)]
pub struct CategoryError {
    pub category: SearchCategory,
    pub failures: Vec<PhraseFailure>,
}

impl std::error::Error for CategoryError {}

impl fmt::Display for CategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} search failed: ", self.category.key())?;
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

/// One external procurement portal.
///
/// Both portals share the same harvesting pipeline: the generic paginated
/// fetcher drives `fetch_page`/`extract_records` page by page, while
/// `build_query` turns a search phrase plus the run's filters into the
/// source-specific request descriptor. Query construction performs no I/O.
#[async_trait]
pub trait TenderSource: Send + Sync {
    /// Source-specific request descriptor produced by
    /// [`build_query`](TenderSource::build_query).
    type Query: Send + Sync;

    fn name(&self) -> &'static str;

    /// Tag used in statistics keys (`"{category}Found{tag}"`).
    fn stat_tag(&self) -> &'static str;

    /// Origin used to rewrite relative detail links.
    fn origin(&self) -> &str;

    /// Records requested per page.
    fn page_size(&self) -> u32;

    /// Defensive page ceiling. `None` means the stopping rule alone bounds
    /// the loop.
    fn max_pages(&self) -> Option<u32> {
        None
    }

    /// Literal search phrases for a category on this source.
    fn phrases(&self, category: SearchCategory) -> &'static [&'static str];

    /// Build the request descriptor for one phrase. Pure data
    /// transformation; a zero minimum price must serialize explicitly.
    fn build_query(
        &self,
        phrase: &str,
        category: SearchCategory,
        filters: &SearchFilters,
    ) -> Result<Self::Query, HarvestError>;

    /// Fetch one page (1-based) of the query. A single attempt; the caller
    /// owns retries.
    async fn fetch_page(&self, query: &Self::Query, page: u32) -> Result<String, HarvestError>;

    /// Extract candidate records and the continuation signal from a fetched
    /// page body.
    fn extract_records(&self, body: &str) -> Result<PageResult, HarvestError>;

    /// Optional post-filter enrichment of kept records (secondary fetches).
    /// The default does nothing.
    async fn enrich(&self, _records: &mut [Tender]) {}
}
