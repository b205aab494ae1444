// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::Path;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::domain::models::tender::{Tender, PRICE_NOT_SPECIFIED};

/// Pattern that cannot match anything; used when the exclusion file is
/// empty.
const MATCH_NOTHING: &str = r"[^\s\S]";

/// Compile the title-exclusion pattern from a plain-text file: one regex
/// fragment per line, blank lines and `#` comments skipped, joined as a
/// case-insensitive alternation. Loaded once at process start.
pub fn load_exclusion_pattern(path: &Path) -> anyhow::Result<Regex> {
    let content = std::fs::read_to_string(path)?;
    let fragments: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    let pattern = if fragments.is_empty() {
        MATCH_NOTHING.to_string()
    } else {
        fragments.join("|")
    };

    Ok(RegexBuilder::new(&pattern).case_insensitive(true).build()?)
}

/// Parse a locale-formatted price string: strip tab and non-breaking-space
/// characters, then take the longest leading run of ASCII digits as the
/// integer value. `None` when there is no leading digit run.
///
/// This is the most fragile text handling in the pipeline; keep every
/// format quirk covered by the tests below.
pub fn leading_price(text: &str) -> Option<u64> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '\t' && *c != '\u{a0}')
        .collect();

    let digits: String = cleaned
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Per-phrase record filter: exclusion pattern, category minimum price,
/// and link normalization. Never fails — every edge case resolves to a
/// discard (`None`) or a best-effort record.
pub struct RecordFilter {
    pattern: Arc<Regex>,
    min_price: u64,
    origin: String,
}

impl RecordFilter {
    pub fn new(pattern: Arc<Regex>, min_price: u64, origin: impl Into<String>) -> Self {
        Self {
            pattern,
            min_price,
            origin: origin.into(),
        }
    }

    pub fn apply(&self, mut tender: Tender) -> Option<Tender> {
        if tender.title.is_empty() {
            return None;
        }

        if self.pattern.is_match(&tender.title.to_lowercase()) {
            return None;
        }

        match leading_price(&tender.price) {
            Some(value) if value < self.min_price => return None,
            Some(_) => {}
            None => {
                // Fails open: an unparseable price keeps the record.
                if tender.price != PRICE_NOT_SPECIFIED {
                    warn!(price = %tender.price, title = %tender.title, "unparseable price text");
                }
            }
        }

        if !tender.link.is_empty() && !tender.link.starts_with("http") {
            tender.link = format!("{}{}", self.origin, tender.link);
        }

        Some(tender)
    }
}
