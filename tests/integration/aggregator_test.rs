// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use tendrs::domain::models::filters::SearchCategory;
use tendrs::infrastructure::harvest::aggregator::SourceAggregator;
use tendrs::infrastructure::harvest::orchestrator::CategoryOrchestrator;
use tendrs::infrastructure::harvest::retry::RetryPolicy;
use tendrs::infrastructure::sources::gov_portal::GovPortalSource;
use tendrs::infrastructure::sources::sber_ast::SberAstSource;

use crate::helpers::{filters_for, no_match_pattern};

fn sber_envelope(hits: serde_json::Value, total: u64) -> String {
    let elastic = json!({ "hits": { "total": { "value": total }, "hits": hits } }).to_string();
    let data = json!({ "data": elastic }).to_string();
    json!({ "result": "success", "data": data }).to_string()
}

async fn aggregator_for(gov_uri: String, sber_uri: String) -> SourceAggregator {
    let gov = Arc::new(GovPortalSource::with_origin(gov_uri, false));
    let sber = Arc::new(SberAstSource::with_origin(sber_uri));
    let orchestrator = Arc::new(CategoryOrchestrator::new(
        RetryPolicy::fast(),
        no_match_pattern(),
    ));
    SourceAggregator::new(gov, sber, orchestrator)
}

/// One source failing completely must not block the other: the report
/// carries the healthy source's records plus a warning for the dead one.
#[tokio::test]
async fn test_one_source_down_still_produces_a_report() {
    let gov_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&gov_server)
        .await;

    let sber_server = MockServer::start().await;
    let body = sber_envelope(
        json!([{ "_source": { "purchName": "Поставка дверей", "purchAmount": 1000.0 } }]),
        1,
    );
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&sber_server)
        .await;

    let aggregator = aggregator_for(gov_server.uri(), sber_server.uri()).await;
    let report = aggregator
        .run(filters_for(SearchCategory::Doors, 0))
        .await;

    assert_eq!(report.stats.get("doorsFoundSberAst"), Some(&1));
    assert_eq!(report.stats.get("doorsFoundZakupkiGovRu"), Some(&0));
    assert_eq!(report.stats.get("totalFound"), Some(&1));
    assert_eq!(
        report.sber_ast.get(&SearchCategory::Doors).map(Vec::len),
        Some(1)
    );
    assert!(report
        .warnings
        .iter()
        .any(|w| w.contains("zakupki.gov.ru")));
}

/// Zero records from every source is a valid, distinguishable outcome: a
/// warning, never an error.
#[tokio::test]
async fn test_empty_everywhere_is_a_warning_not_an_error() {
    let gov_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&gov_server)
        .await;

    let sber_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(sber_envelope(json!([]), 0)),
        )
        .mount(&sber_server)
        .await;

    let aggregator = aggregator_for(gov_server.uri(), sber_server.uri()).await;
    let report = aggregator
        .run(filters_for(SearchCategory::Metal, 0))
        .await;

    assert!(report.is_empty());
    assert_eq!(report.stats.get("totalFound"), Some(&0));
    assert!(report
        .warnings
        .iter()
        .any(|w| w.contains("no tenders found")));
}

/// Per-category stat keys follow the `{category}Found{Source}` naming and
/// the per-source totals sum into `totalFound`.
#[tokio::test]
async fn test_stats_keys_per_category_and_source() {
    let gov_server = MockServer::start().await;
    let card = r#"<div class="search-registry-entry-block">
        <div class="registry-entry__body-value">Реконструкция здания школы</div>
        <div class="price-block__value">5 000 000</div>
    </div>"#;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(card))
        .mount(&gov_server)
        .await;

    let sber_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(sber_envelope(json!([]), 0)),
        )
        .mount(&sber_server)
        .await;

    let aggregator = aggregator_for(gov_server.uri(), sber_server.uri()).await;
    let report = aggregator
        .run(filters_for(SearchCategory::Construction, 0))
        .await;

    // Three gov phrases for construction all return the same page; dedup
    // collapses them to one record.
    assert_eq!(report.stats.get("buildFoundZakupkiGovRu"), Some(&1));
    assert_eq!(report.stats.get("buildFoundSberAst"), Some(&0));
    assert_eq!(report.stats.get("totalFoundZakupkiGovRu"), Some(&1));
    assert_eq!(report.stats.get("totalFoundSberAst"), Some(&0));
    assert_eq!(report.stats.get("totalFound"), Some(&1));
}
