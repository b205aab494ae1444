// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::routing::{get, post};
use axum::Router;

use crate::presentation::handlers::tender_handler::{
    self, AppState,
};

/// The tender service routes.
pub fn tender_router(state: AppState) -> Router {
    Router::new()
        .route("/tender/health", get(tender_handler::health))
        .route("/tender/search", post(tender_handler::search_tenders))
        .route("/tender/download", get(tender_handler::download_report))
        .with_state(state)
}
