// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// Price text shown when a listing carries no price at all.
pub const PRICE_NOT_SPECIFIED: &str = "Не указана";

/// One normalized procurement listing.
///
/// An empty `title` marks an invalid parse; such records never leave the
/// extractors. Dedup identity is the exact `title` string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tender {
    pub title: String,
    pub customer: String,
    /// Display string as shown by the portal, or [`PRICE_NOT_SPECIFIED`].
    pub price: String,
    pub publish_date: String,
    pub end_date: String,
    /// Absolute detail URL. Relative portal paths are rewritten by the
    /// record filter before the record reaches the orchestrator.
    pub link: String,
    /// Delivery region, filled by the HTML source's detail-page enrichment.
    pub region: Option<String>,
}

impl Default for Tender {
    fn default() -> Self {
        Self {
            title: String::new(),
            customer: String::new(),
            price: PRICE_NOT_SPECIFIED.to_string(),
            publish_date: String::new(),
            end_date: String::new(),
            link: String::new(),
            region: None,
        }
    }
}

impl Tender {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}
