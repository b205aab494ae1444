// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tendrs::domain::models::filters::SearchCategory;
use tendrs::infrastructure::harvest::orchestrator::CategoryOrchestrator;
use tendrs::infrastructure::harvest::retry::RetryPolicy;
use tendrs::infrastructure::sources::gov_portal::GovPortalSource;
use tendrs::infrastructure::sources::sber_ast::SberAstSource;

use crate::helpers::{filters_for, no_match_pattern};

fn listing_card(title: &str, price: &str, href: &str) -> String {
    format!(
        r#"<div class="search-registry-entry-block">
            <div class="registry-entry__header-mid__number"><a href="{href}">№ 1</a></div>
            <div class="registry-entry__body-value">{title}</div>
            <div class="registry-entry__body-href">Заказчик</div>
            <div class="price-block__value">{price}</div>
            <div class="data-block"><div class="row">
                <div class="col-6">
                    <div class="data-block__title">Размещено</div>
                    <div class="data-block__value">01.08.2025</div>
                </div>
            </div></div>
        </div>"#
    )
}

fn sber_envelope(hits: serde_json::Value) -> String {
    let elastic = json!({
        "hits": { "total": { "value": 1 }, "hits": hits }
    })
    .to_string();
    let data = json!({ "data": elastic }).to_string();
    json!({ "result": "success", "data": data }).to_string()
}

fn orchestrator() -> CategoryOrchestrator {
    CategoryOrchestrator::new(RetryPolicy::fast(), no_match_pattern())
}

/// Full harvest of the HTML portal against a mock server: the paging
/// cursor parameters are part of the match, and relative detail links come
/// back rewritten to the portal origin.
#[tokio::test]
async fn test_gov_portal_harvest_end_to_end() {
    let server = MockServer::start().await;
    let body = listing_card(
        "Монтаж систем вентиляции",
        "1\u{a0}500\u{a0}000,00 ₽",
        "/epz/order/notice/view.html?regNumber=0100",
    );

    Mock::given(method("GET"))
        .and(path("/epz/order/extendedsearch/results.html"))
        .and(query_param("pageNumber", "1"))
        .and(query_param("recordsPerPage", "_50"))
        .and(query_param("morphology", "on"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let source = Arc::new(GovPortalSource::with_origin(server.uri(), false));
    let filters = Arc::new(filters_for(SearchCategory::Ventilation, 1_000_000));

    let result = orchestrator()
        .harvest(&source, SearchCategory::Ventilation, &filters)
        .await;

    assert!(result.failures.is_empty());
    assert_eq!(result.tenders.len(), 1);

    let tender = &result.tenders[0];
    assert_eq!(tender.title, "Монтаж систем вентиляции");
    assert_eq!(
        tender.link,
        format!("{}/epz/order/notice/view.html?regNumber=0100", server.uri())
    );
}

/// Records below the category minimum never reach the merged set.
#[tokio::test]
async fn test_gov_portal_applies_minimum_price() {
    let server = MockServer::start().await;
    let body = format!(
        "{}{}",
        listing_card("Дорогая закупка", "2\u{a0}000\u{a0}000,00 ₽", "/a"),
        listing_card("Дешёвая закупка", "10\u{a0}000,00 ₽", "/b"),
    );

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let source = Arc::new(GovPortalSource::with_origin(server.uri(), false));
    let filters = Arc::new(filters_for(SearchCategory::Ventilation, 1_000_000));

    let result = orchestrator()
        .harvest(&source, SearchCategory::Ventilation, &filters)
        .await;

    assert_eq!(result.tenders.len(), 1);
    assert_eq!(result.tenders[0].title, "Дорогая закупка");
}

/// With enrichment enabled the source fetches the detail page and fills
/// the delivery region; enrichment failure never fails the harvest.
#[tokio::test]
async fn test_gov_portal_region_enrichment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/epz/order/extendedsearch/results.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_card(
            "Монтаж вентиляции",
            "500\u{a0}000,00 ₽",
            "/detail/1",
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/detail/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="blockInfo__section">
                <span class="section__title">Место поставки</span>
                <span class="section__info">г. Санкт-Петербург</span>
            </div>"#,
        ))
        .mount(&server)
        .await;

    let source = Arc::new(GovPortalSource::with_origin(server.uri(), true));
    let filters = Arc::new(filters_for(SearchCategory::Ventilation, 0));

    let result = orchestrator()
        .harvest(&source, SearchCategory::Ventilation, &filters)
        .await;

    assert_eq!(result.tenders.len(), 1);
    assert_eq!(
        result.tenders[0].region.as_deref(),
        Some("г. Санкт-Петербург")
    );
}

/// Full harvest of the JSON portal: the form body carries the XML search
/// document and the fixed organizational identifiers.
#[tokio::test]
async fn test_sber_ast_harvest_end_to_end() {
    let server = MockServer::start().await;
    let body = sber_envelope(json!([{
        "_source": {
            "purchName": "Поставка дверей",
            "purchAmount": 250000.5,
            "PublicDate": "01.08.2025",
            "EndDate": "20.08.2025",
            "OrgName": "АО Заказчик",
            "objectHrefTerm": "https://sberbank-ast.ru/purchase/1"
        }
    }]));

    Mock::given(method("POST"))
        .and(path("/SearchQuery.aspx"))
        .and(query_param("name", "Main"))
        .and(body_string_contains("targetPageCode=UnitedPurchaseList"))
        .and(body_string_contains("xmlData=%3Celasticrequest%3E"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let source = Arc::new(SberAstSource::with_origin(server.uri()));
    let filters = Arc::new(filters_for(SearchCategory::Doors, 0));

    let result = orchestrator()
        .harvest(&source, SearchCategory::Doors, &filters)
        .await;

    assert!(result.failures.is_empty());
    // Both door phrases return the same hit; dedup keeps one.
    assert_eq!(result.tenders.len(), 1);
    assert_eq!(result.tenders[0].title, "Поставка дверей");
    assert_eq!(result.tenders[0].price, "250000.50 руб.");
}

/// A malformed envelope is a hard parse error for the phrase, reported as
/// a failure rather than a panic or empty success.
#[tokio::test]
async fn test_sber_ast_malformed_envelope_fails_the_phrase() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let source = Arc::new(SberAstSource::with_origin(server.uri()));
    let filters = Arc::new(filters_for(SearchCategory::Metal, 0));

    let result = orchestrator()
        .harvest(&source, SearchCategory::Metal, &filters)
        .await;

    assert!(result.is_total_failure());
    assert_eq!(result.failures.len(), 1);
}
