// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::config::settings::Settings;
use crate::domain::models::filters::{ProcurementStatus, SearchCategory, SearchFilters};
use crate::infrastructure::harvest::aggregator::SourceAggregator;
use crate::presentation::errors::ApiError;
use crate::report::excel;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<SourceAggregator>,
    pub settings: Arc<Settings>,
}

/// Thin web-request-to-filters mapper. Field names follow the search form.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub search_vent: bool,
    #[serde(default)]
    pub search_doors: bool,
    #[serde(default)]
    pub search_build: bool,
    #[serde(default)]
    pub search_metal: bool,
    #[serde(default)]
    pub min_price_vent: u64,
    #[serde(default)]
    pub min_price_doors: u64,
    #[serde(default)]
    pub min_price_build: u64,
    #[serde(default)]
    pub min_price_metal: u64,
    #[serde(default)]
    pub customer_place: Vec<String>,
    #[serde(default)]
    pub del_kladr_ids: Vec<String>,
    #[serde(default)]
    pub procurement_status: ProcurementStatus,
}

impl SearchRequest {
    pub fn into_filters(self) -> SearchFilters {
        let mut categories = Vec::new();
        if self.search_vent {
            categories.push(SearchCategory::Ventilation);
        }
        if self.search_doors {
            categories.push(SearchCategory::Doors);
        }
        if self.search_build {
            categories.push(SearchCategory::Construction);
        }
        if self.search_metal {
            categories.push(SearchCategory::Metal);
        }

        SearchFilters {
            categories,
            min_price_vent: self.min_price_vent,
            min_price_doors: self.min_price_doors,
            min_price_build: self.min_price_build,
            min_price_metal: self.min_price_metal,
            customer_place: self.customer_place,
            del_kladr_ids: self.del_kladr_ids,
            status: self.procurement_status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub message: String,
    pub stats: BTreeMap<String, usize>,
    pub filename: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Run the harvest for the requested categories and render the workbook.
pub async fn search_tenders(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let filters = request.into_filters();
    if filters.categories.is_empty() {
        return Err(ApiError::InvalidInput(
            "at least one search category must be enabled".to_string(),
        ));
    }

    info!(categories = filters.categories.len(), "starting tender search");
    let report = state.aggregator.run(filters).await;

    for warning in &report.warnings {
        warn!("{}", warning);
    }

    let filename = state.settings.report.output_file.clone();
    excel::write_workbook(&report, Path::new(&filename))
        .map_err(|e| ApiError::ReportError(e.to_string()))?;

    Ok(Json(SearchResponse {
        message: "Report created successfully".to_string(),
        stats: report.stats,
        filename,
        warnings: report.warnings,
    }))
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub filename: Option<String>,
}

/// Serve a previously generated workbook.
pub async fn download_report(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filename = params
        .filename
        .unwrap_or_else(|| state.settings.report.output_file.clone());

    // The report lands in the working directory; reject path traversal.
    if filename.contains('/') || filename.contains('\\') {
        return Err(ApiError::InvalidInput("invalid filename".to_string()));
    }

    let bytes = tokio::fs::read(&filename)
        .await
        .map_err(|_| ApiError::NotFound(filename.clone()))?;

    let headers = [
        (
            header::CONTENT_TYPE,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];

    Ok((headers, bytes))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "OK", "service": "tender" }))
}
