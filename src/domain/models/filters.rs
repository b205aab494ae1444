// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// Logical search topic. Each category maps to one or more literal search
/// phrases per source; the phrase tables live with the sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SearchCategory {
    Ventilation,
    Doors,
    Construction,
    Metal,
}

impl SearchCategory {
    pub const ALL: [SearchCategory; 4] = [
        SearchCategory::Ventilation,
        SearchCategory::Doors,
        SearchCategory::Construction,
        SearchCategory::Metal,
    ];

    /// Short key used in statistics map entries (`"{key}Found{Source}"`).
    pub fn key(&self) -> &'static str {
        match self {
            Self::Ventilation => "vent",
            Self::Doors => "doors",
            Self::Construction => "build",
            Self::Metal => "metal",
        }
    }

    /// Worksheet title in the generated report.
    pub fn sheet_title(&self) -> &'static str {
        match self {
            Self::Ventilation => "Вентиляция",
            Self::Doors => "Двери",
            Self::Construction => "Строительство",
            Self::Metal => "Металл.",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "vent" => Some(Self::Ventilation),
            "doors" => Some(Self::Doors),
            "build" => Some(Self::Construction),
            "metal" => Some(Self::Metal),
            _ => None,
        }
    }
}

/// Procurement-status restriction requested by the user.
///
/// The HTML portal maps this to one of two mutually exclusive stage flags;
/// the JSON portal constrains the publication-date range instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcurementStatus {
    #[default]
    Active,
    Completed,
    Any,
}

/// Per-run search configuration.
///
/// Resolved once per incoming request and shared immutably (behind `Arc`)
/// with every concurrent fetch task. Nothing in the pipeline mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchFilters {
    pub categories: Vec<SearchCategory>,
    pub min_price_vent: u64,
    pub min_price_doors: u64,
    pub min_price_build: u64,
    pub min_price_metal: u64,
    /// Federal-district / customer-place codes, repeated-value parameters.
    /// Order-preserving, duplicates allowed.
    pub customer_place: Vec<String>,
    pub del_kladr_ids: Vec<String>,
    pub status: ProcurementStatus,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            min_price_vent: 0,
            min_price_doors: 0,
            min_price_build: 0,
            min_price_metal: 0,
            customer_place: Vec::new(),
            del_kladr_ids: Vec::new(),
            status: ProcurementStatus::Active,
        }
    }
}

impl SearchFilters {
    pub fn is_enabled(&self, category: SearchCategory) -> bool {
        self.categories.contains(&category)
    }

    pub fn min_price(&self, category: SearchCategory) -> u64 {
        match category {
            SearchCategory::Ventilation => self.min_price_vent,
            SearchCategory::Doors => self.min_price_doors,
            SearchCategory::Construction => self.min_price_build,
            SearchCategory::Metal => self.min_price_metal,
        }
    }
}
