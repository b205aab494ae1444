// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use serde::Deserialize;
use tracing::debug;

use crate::domain::models::filters::{SearchCategory, SearchFilters};
use crate::domain::models::report::PageResult;
use crate::domain::models::tender::{Tender, PRICE_NOT_SPECIFIED};
use crate::domain::search::source::{HarvestError, TenderSource};
use crate::infrastructure::sources::elastic::ElasticRequest;

pub const ORIGIN: &str = "https://sberbank-ast.ru";
const SEARCH_PATH: &str = "/SearchQuery.aspx";
const PAGE_SIZE: u32 = 20;
/// Defensive ceiling: the portal's reported total saturates at 10 000, so
/// the loop cannot trust it as a hard bound.
const MAX_PAGES: u32 = 50;
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// The elastic-search-backed commercial portal.
///
/// Queries are XML documents POSTed inside a form-encoded body; responses
/// are a triple-nested JSON envelope (API wrapper → embedded JSON string →
/// embedded JSON string holding the elastic payload).
pub struct SberAstSource {
    client: reqwest::Client,
    origin: String,
}

/// Outer API wrapper. `data` is itself a JSON document in a string.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    result: String,
    data: String,
}

/// Middle wrapper; `data` is again a JSON document in a string.
#[derive(Debug, Deserialize)]
struct DataEnvelope {
    data: String,
}

#[derive(Debug, Deserialize)]
struct ElasticEnvelope {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    total: TotalHits,
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct TotalHits {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: HitSource,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HitSource {
    #[serde(rename = "purchName")]
    purch_name: String,
    #[serde(rename = "BidName")]
    bid_name: String,
    #[serde(rename = "purchAmount")]
    purch_amount: f64,
    #[serde(rename = "PublicDate")]
    public_date: String,
    #[serde(rename = "EndDate")]
    end_date: String,
    #[serde(rename = "OrgName")]
    org_name: String,
    #[serde(rename = "objectHrefTerm")]
    object_href: String,
    #[serde(rename = "SourceHrefTerm")]
    source_href: String,
}

fn format_price(amount: f64) -> String {
    if amount == 0.0 {
        PRICE_NOT_SPECIFIED.to_string()
    } else {
        format!("{:.2} руб.", amount)
    }
}

impl Default for SberAstSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SberAstSource {
    pub fn new() -> Self {
        Self::with_origin(ORIGIN)
    }

    /// Build against a non-default origin. Tests point this at a mock
    /// server.
    pub fn with_origin(origin: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            origin: origin.into(),
        }
    }

    fn record_from_hit(&self, hit: Hit) -> Tender {
        let source = hit.source;
        let mut tender = Tender::default();

        // The purchase name is authoritative; some listing types only carry
        // a bid name.
        tender.title = if !source.purch_name.is_empty() {
            source.purch_name
        } else {
            source.bid_name
        };

        tender.price = format_price(source.purch_amount);
        tender.publish_date = source.public_date;
        tender.end_date = source.end_date;
        tender.customer = source.org_name;
        tender.link = if !source.object_href.is_empty() {
            source.object_href
        } else {
            source.source_href
        };

        tender
    }
}

#[async_trait]
impl TenderSource for SberAstSource {
    type Query = ElasticRequest;

    fn name(&self) -> &'static str {
        "sberbank-ast"
    }

    fn stat_tag(&self) -> &'static str {
        "SberAst"
    }

    fn origin(&self) -> &str {
        &self.origin
    }

    fn page_size(&self) -> u32 {
        PAGE_SIZE
    }

    fn max_pages(&self) -> Option<u32> {
        Some(MAX_PAGES)
    }

    fn phrases(&self, category: SearchCategory) -> &'static [&'static str] {
        match category {
            SearchCategory::Ventilation => &["вент"],
            SearchCategory::Doors => &["двер", "дверны"],
            SearchCategory::Construction => {
                &["реконструкция", "строительство", "капитальный ремонт"]
            }
            SearchCategory::Metal => &["металлоконструкц"],
        }
    }

    fn build_query(
        &self,
        phrase: &str,
        category: SearchCategory,
        filters: &SearchFilters,
    ) -> Result<ElasticRequest, HarvestError> {
        Ok(ElasticRequest::new(
            phrase,
            filters.min_price(category),
            filters.status,
            PAGE_SIZE,
        ))
    }

    async fn fetch_page(&self, query: &ElasticRequest, page: u32) -> Result<String, HarvestError> {
        let mut request = query.clone();
        request.from = (page - 1) * request.size;

        let xml = request.to_xml()?;
        let form: &[(&str, &str)] = &[
            ("xmlData", xml.as_str()),
            ("orgId", "0"),
            ("targetPageCode", "UnitedPurchaseList"),
            ("PID", "0"),
        ];
        let body =
            serde_urlencoded::to_string(form).map_err(|e| HarvestError::Request(e.to_string()))?;

        let url = format!("{}{}?name=Main", self.origin, SEARCH_PATH);
        debug!(source = self.name(), page, from = request.from, "posting search query");

        let response = self
            .client
            .post(&url)
            .header(
                CONTENT_TYPE,
                "application/x-www-form-urlencoded; charset=UTF-8",
            )
            .header(ACCEPT, "application/json, text/plain, */*")
            .header(ACCEPT_LANGUAGE, "ru-RU,ru;q=0.9,en;q=0.8")
            .header("X-Requested-With", "XMLHttpRequest")
            .body(body)
            .send()
            .await
            .map_err(|e| HarvestError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| HarvestError::Transport(e.to_string()))
    }

    /// Peel the three envelope layers; a failure at any layer is a hard
    /// parse error for the page.
    fn extract_records(&self, body: &str) -> Result<PageResult, HarvestError> {
        let api: ApiEnvelope = serde_json::from_str(body).map_err(|e| HarvestError::Decode {
            layer: "api",
            message: e.to_string(),
        })?;
        if api.result != "success" {
            return Err(HarvestError::Decode {
                layer: "api",
                message: format!("result = {}", api.result),
            });
        }

        let data: DataEnvelope =
            serde_json::from_str(&api.data).map_err(|e| HarvestError::Decode {
                layer: "data",
                message: e.to_string(),
            })?;

        let elastic: ElasticEnvelope =
            serde_json::from_str(&data.data).map_err(|e| HarvestError::Decode {
                layer: "elastic",
                message: e.to_string(),
            })?;

        let cards = elastic.hits.hits.len() as u32;
        let total_hits = Some(elastic.hits.total.value);

        let records = elastic
            .hits
            .hits
            .into_iter()
            .map(|hit| self.record_from_hit(hit))
            .filter(|tender| !tender.title.is_empty())
            .collect();

        Ok(PageResult {
            records,
            cards,
            total_hits,
        })
    }
}
