// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::domain::models::filters::{ProcurementStatus, SearchCategory, SearchFilters};
use crate::domain::models::report::PageResult;
use crate::domain::models::tender::{Tender, PRICE_NOT_SPECIFIED};
use crate::domain::search::source::{HarvestError, TenderSource};
use crate::infrastructure::sources::query::UrlQuery;

pub const ORIGIN: &str = "https://zakupki.gov.ru";
const SEARCH_PATH: &str = "/epz/order/extendedsearch/results.html";
const PAGE_SIZE: u32 = 50;
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// The HTML-rendered government portal.
///
/// Listings are server-rendered cards located by structural CSS selectors;
/// pagination rewrites the `pageNumber`/`recordsPerPage` query parameters.
/// The delivery region is not present on the listing card and is optionally
/// enriched from the detail page.
pub struct GovPortalSource {
    client: reqwest::Client,
    origin: String,
    enrich_regions: bool,
    card: Selector,
    title: Selector,
    customer: Selector,
    price: Selector,
    date_block: Selector,
    date_title: Selector,
    date_value: Selector,
    link: Selector,
    detail_section: Selector,
    section_title: Selector,
    section_info: Selector,
}

impl Default for GovPortalSource {
    fn default() -> Self {
        Self::new(false)
    }
}

impl GovPortalSource {
    pub fn new(enrich_regions: bool) -> Self {
        Self::with_origin(ORIGIN, enrich_regions)
    }

    /// Build against a non-default origin. Tests point this at a mock
    /// server.
    pub fn with_origin(origin: impl Into<String>, enrich_regions: bool) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(45))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            origin: origin.into(),
            enrich_regions,
            card: Selector::parse("div.search-registry-entry-block").expect("valid selector"),
            title: Selector::parse(".registry-entry__body-value").expect("valid selector"),
            customer: Selector::parse(".registry-entry__body-href").expect("valid selector"),
            price: Selector::parse(".price-block__value").expect("valid selector"),
            date_block: Selector::parse(".data-block .col-6").expect("valid selector"),
            date_title: Selector::parse(".data-block__title").expect("valid selector"),
            date_value: Selector::parse(".data-block__value").expect("valid selector"),
            link: Selector::parse(".registry-entry__header-mid__number a").expect("valid selector"),
            detail_section: Selector::parse(".blockInfo__section").expect("valid selector"),
            section_title: Selector::parse(".section__title").expect("valid selector"),
            section_info: Selector::parse(".section__info").expect("valid selector"),
        }
    }

    fn select_text(element: ElementRef<'_>, selector: &Selector) -> String {
        element
            .select(selector)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }

    /// Parse one listing card. A card without a title yields a record with
    /// an empty title, which the caller drops.
    fn parse_card(&self, card: ElementRef<'_>) -> Tender {
        let mut tender = Tender::default();

        tender.title = Self::select_text(card, &self.title);
        tender.customer = Self::select_text(card, &self.customer);

        let price = Self::select_text(card, &self.price);
        if !price.is_empty() {
            tender.price = price;
        } else {
            tender.price = PRICE_NOT_SPECIFIED.to_string();
        }

        for block in card.select(&self.date_block) {
            let title = Self::select_text(block, &self.date_title);
            let value = Self::select_text(block, &self.date_value);
            match title.as_str() {
                "Размещено" => tender.publish_date = value,
                "Окончание подачи заявок" => tender.end_date = value,
                _ => {}
            }
        }

        if let Some(href) = card
            .select(&self.link)
            .next()
            .and_then(|e| e.value().attr("href"))
        {
            tender.link = href.to_string();
        }

        tender
    }

    /// Pull the delivery region off a tender's detail page. Any failure is
    /// absorbed: the region simply stays unset.
    async fn fetch_region(&self, link: &str) -> Option<String> {
        let response = self.client.get(link).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let body = response.text().await.ok()?;

        let document = Html::parse_document(&body);
        for section in document.select(&self.detail_section) {
            let title = Self::select_text(section, &self.section_title);
            if title.contains("Место поставки") || title.contains("Регион") {
                let info = Self::select_text(section, &self.section_info);
                if !info.is_empty() {
                    return Some(info);
                }
            }
        }
        None
    }
}

#[async_trait]
impl TenderSource for GovPortalSource {
    type Query = UrlQuery;

    fn name(&self) -> &'static str {
        "zakupki.gov.ru"
    }

    fn stat_tag(&self) -> &'static str {
        "ZakupkiGovRu"
    }

    fn origin(&self) -> &str {
        &self.origin
    }

    fn page_size(&self) -> u32 {
        PAGE_SIZE
    }

    fn phrases(&self, category: SearchCategory) -> &'static [&'static str] {
        match category {
            SearchCategory::Ventilation => &["вентиляции"],
            SearchCategory::Doors => &["монтаж двер"],
            SearchCategory::Construction => &[
                "реконструкция здания",
                "строительство здания",
                "капитальный ремонт здания",
            ],
            SearchCategory::Metal => &["изготовление металлоконструкц"],
        }
    }

    fn build_query(
        &self,
        phrase: &str,
        _category: SearchCategory,
        filters: &SearchFilters,
    ) -> Result<UrlQuery, HarvestError> {
        let mut query = UrlQuery::new(format!("{}{}", self.origin, SEARCH_PATH))
            .param("searchString", phrase)
            .param("morphology", "on")
            .param("search-filter", "Дате размещения")
            .param("fz44", "on")
            .param("fz223", "on")
            .param("ppRf615", "on")
            .array_param("customerPlace", &filters.customer_place)
            .array_param("delKladrIds", &filters.del_kladr_ids)
            .param("gws", "Выберите тип закупки");

        // The portal's stage flags are mutually exclusive.
        match filters.status {
            ProcurementStatus::Active => query = query.param("af", "on"),
            ProcurementStatus::Completed => query = query.param("pc", "on"),
            ProcurementStatus::Any => {}
        }

        Ok(query)
    }

    async fn fetch_page(&self, query: &UrlQuery, page: u32) -> Result<String, HarvestError> {
        let url = query
            .clone()
            .set("pageNumber", page.to_string())
            .set("recordsPerPage", format!("_{}", PAGE_SIZE))
            .build();

        debug!(source = self.name(), page, url = %url, "fetching listing page");

        let response = self
            .client
            .get(&url)
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(ACCEPT_LANGUAGE, "ru-RU,ru;q=0.9,en;q=0.8")
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

    fn extract_records(&self, body: &str) -> Result<PageResult, HarvestError> {
        let document = Html::parse_document(body);

        let mut cards = 0u32;
        let mut records = Vec::new();
        for card in document.select(&self.card) {
            cards += 1;
            let tender = self.parse_card(card);
            if !tender.title.is_empty() {
                records.push(tender);
            }
        }

        Ok(PageResult {
            records,
            cards,
            total_hits: None,
        })
    }

    async fn enrich(&self, records: &mut [Tender]) {
        if !self.enrich_regions {
            return;
        }
        for record in records.iter_mut() {
            if record.link.is_empty() || record.region.is_some() {
                continue;
            }
            record.region = self.fetch_region(&record.link).await;
        }
    }
}
